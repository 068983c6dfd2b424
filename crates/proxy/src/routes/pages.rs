//! Demo page route handlers.
//!
//! Two server-rendered pages that drive the cart API from the browser. They
//! hold no state of their own; all cart state lives behind `/api`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, routing::get};
use tracing::instrument;

use crate::state::AppState;

/// A product the demo page offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoProduct {
    pub id: &'static str,
    pub title: &'static str,
}

/// Products listed on the demo home page.
pub const DEMO_PRODUCTS: [DemoProduct; 2] = [
    DemoProduct {
        id: "B07PWYB6LZ",
        title: "Egg Separator",
    },
    DemoProduct {
        id: "B08CQDF382",
        title: "CeraVe Cleanser",
    },
];

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub products: &'static [DemoProduct],
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate;

/// Display the product list.
#[instrument]
pub async fn index() -> IndexTemplate {
    IndexTemplate {
        products: &DEMO_PRODUCTS,
    }
}

/// Display the buyer and submit controls.
#[instrument]
pub async fn cart() -> CartTemplate {
    CartTemplate
}

/// Create the demo pages router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/cart", get(cart))
}
