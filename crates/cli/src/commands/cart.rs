//! Cart creation and line items.

use rye_cart_core::{Cart, CartItemRequest};
use tracing::info;

use crate::client::{CliError, ProxyClient};

/// Create a cart holding one product.
///
/// # Errors
///
/// Returns an error if the proxy is unreachable or rejects the request.
pub async fn create(
    client: &ProxyClient,
    product_id: String,
    quantity: Option<i64>,
) -> Result<(), CliError> {
    let request = CartItemRequest {
        product_id: Some(product_id),
        quantity,
    };
    let cart: Cart = client.post("api/create-cart", &request).await?;

    info!(cart_id = %cart.id, "Cart created");
    report(&cart);
    Ok(())
}

/// Add one product to the active cart.
///
/// # Errors
///
/// Returns an error if there is no active cart, the proxy is unreachable, or
/// Rye rejects the item.
pub async fn add(
    client: &ProxyClient,
    product_id: String,
    quantity: Option<i64>,
) -> Result<(), CliError> {
    let request = CartItemRequest {
        product_id: Some(product_id),
        quantity,
    };
    let cart: Cart = client.post("api/add-cart-items", &request).await?;

    info!(cart_id = %cart.id, "Item added");
    report(&cart);
    Ok(())
}

fn report(cart: &Cart) {
    for line in cart.lines() {
        info!(
            product_id = %line.product.id,
            quantity = line.quantity,
            "  {}",
            line.product.title
        );
    }
    info!(total = %cart.cost.total.display_value, "Cart total");
}
