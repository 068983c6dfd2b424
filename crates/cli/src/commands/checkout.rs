//! Buyer identity and submission.

use rye_cart_core::{BuyerIdentityPatch, CartCostSummary, Money, SubmitCartResult};
use serde_json::json;
use tracing::{info, warn};

use crate::client::{CliError, ProxyClient};

/// Set the buyer identity on the active cart.
///
/// # Errors
///
/// Returns an error if there is no active cart, the proxy is unreachable, or
/// Rye rejects the address.
pub async fn update_buyer(
    client: &ProxyClient,
    patch: BuyerIdentityPatch,
) -> Result<(), CliError> {
    let summary: CartCostSummary = client.post("api/update-buyer", &patch).await?;

    info!(
        cart_id = %summary.id,
        subtotal = %self::display(summary.cost.subtotal.as_ref()),
        shipping = %self::display(summary.cost.shipping.as_ref()),
        total = %self::display(summary.cost.total.as_ref()),
        "Buyer updated"
    );
    Ok(())
}

fn display(money: Option<&Money>) -> &str {
    money.map_or("n/a", |m| m.display_value.as_str())
}

/// Submit the active cart.
///
/// Rye's business errors come back with a success status; they are logged
/// but do not fail the command.
///
/// # Errors
///
/// Returns an error if there is no active cart or the proxy fails.
pub async fn submit(client: &ProxyClient) -> Result<(), CliError> {
    let result: SubmitCartResult = client.post("api/submit-cart", &json!({})).await?;

    for error in &result.errors {
        warn!(code = %error.code, "Submit error: {}", error.message);
    }

    match &result.cart {
        Some(cart) => {
            for store in &cart.stores {
                info!(
                    cart_id = %cart.id,
                    store = store.store.as_deref().unwrap_or("unknown"),
                    status = store.status.as_deref().unwrap_or("unknown"),
                    "Store submitted"
                );
                for error in store.errors.iter().flatten() {
                    warn!(code = %error.code, "Store error: {}", error.message);
                }
            }
        }
        None => info!("Submit returned no cart"),
    }
    Ok(())
}
