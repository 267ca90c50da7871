use crate::entities::cart_item;
use rust_decimal::Decimal;

/// Derived cart totals, recomputed from the full item set after every
/// mutation. Must only be fed a freshly reloaded item collection; partial
/// sets would let the stored totals drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub items_count: i32,
    pub total_price: Decimal,
}

pub fn recompute(items: &[cart_item::Model]) -> CartTotals {
    CartTotals {
        items_count: items.len() as i32,
        total_price: items.iter().map(|item| item.line_total()).sum(),
    }
}
