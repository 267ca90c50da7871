pub mod cart;
pub mod cart_item;

// Re-export entities
pub use cart::{CartStatus, Entity as Cart, Model as CartModel};
pub use cart_item::{Entity as CartItem, ItemType, LineItemRef, Model as CartItemModel};
