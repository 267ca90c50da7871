pub mod carts;
pub mod common;

use crate::catalog::CatalogClient;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{CartPresenter, CartService};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub cart: Arc<CartService>,
    pub presenter: Arc<CartPresenter>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        catalog: Arc<dyn CatalogClient>,
        event_sender: Arc<EventSender>,
    ) -> Self {
        let cart = Arc::new(CartService::new(
            db_pool,
            catalog.clone(),
            event_sender,
        ));
        let presenter = Arc::new(CartPresenter::new(catalog));

        Self { cart, presenter }
    }
}
