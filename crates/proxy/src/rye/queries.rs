//! GraphQL mutation definitions for the Rye API.
//!
//! Each mutation gets a marker type implementing [`GraphQLQuery`] and a
//! snake_case module holding its document, `Variables` and `ResponseData`,
//! the same layout `#[derive(GraphQLQuery)]` generates. The Rye schema is
//! not vendored, so the impls are written out by hand.

use graphql_client::{GraphQLQuery, QueryBody};

macro_rules! rye_mutation {
    ($marker:ident, $module:ident) => {
        impl GraphQLQuery for $marker {
            type Variables = $module::Variables;
            type ResponseData = $module::ResponseData;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                QueryBody {
                    variables,
                    query: $module::QUERY,
                    operation_name: $module::OPERATION_NAME,
                }
            }
        }
    };
}

pub struct CreateCart;
rye_mutation!(CreateCart, create_cart);

pub mod create_cart {
    use rye_cart_core::Cart;
    use serde::{Deserialize, Serialize};

    use crate::rye::MutationPayload;

    pub const OPERATION_NAME: &str = "CreateCart";
    pub const QUERY: &str = include_str!("../../graphql/rye/create_cart.graphql");

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub product_id: String,
        pub quantity: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub create_cart: Option<MutationPayload<Cart>>,
    }
}

pub struct AddCartItems;
rye_mutation!(AddCartItems, add_cart_items);

pub mod add_cart_items {
    use rye_cart_core::Cart;
    use serde::{Deserialize, Serialize};

    use crate::rye::MutationPayload;

    pub const OPERATION_NAME: &str = "AddCartItems";
    pub const QUERY: &str = include_str!("../../graphql/rye/add_cart_items.graphql");

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub product_id: String,
        pub quantity: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub add_cart_items: Option<MutationPayload<Cart>>,
    }
}

pub struct UpdateCartBuyerIdentity;
rye_mutation!(UpdateCartBuyerIdentity, update_cart_buyer_identity);

pub mod update_cart_buyer_identity {
    use rye_cart_core::{BuyerIdentity, CartCostSummary};
    use serde::{Deserialize, Serialize};

    use crate::rye::MutationPayload;

    pub const OPERATION_NAME: &str = "UpdateCartBuyerIdentity";
    pub const QUERY: &str = include_str!("../../graphql/rye/update_cart_buyer_identity.graphql");

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub buyer: BuyerIdentity,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub update_cart_buyer_identity: Option<MutationPayload<CartCostSummary>>,
    }
}

pub struct SubmitCart;
rye_mutation!(SubmitCart, submit_cart);

pub mod submit_cart {
    use rye_cart_core::SubmitCartResult;
    use serde::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "SubmitCart";
    pub const QUERY: &str = include_str!("../../graphql/rye/submit_cart.graphql");

    /// Implements `Debug` manually to redact the payment token.
    #[derive(Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub token: String,
    }

    impl std::fmt::Debug for Variables {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Variables")
                .field("cart_id", &self.cart_id)
                .field("token", &"[REDACTED]")
                .finish()
        }
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub submit_cart: Option<SubmitCartResult>,
    }
}
