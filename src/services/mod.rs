/// Cart services module - the aggregate and its helpers
pub mod cart_service;
pub mod currency;
pub mod presenter;
pub mod totals;

// Re-export services for convenience
pub use cart_service::{AddItemInput, CartService, CartWithItems};
pub use currency::CurrencyGuard;
pub use presenter::{CartItemView, CartPresenter, CartView, ItemDecoration};
pub use totals::CartTotals;
