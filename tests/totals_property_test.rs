//! Property tests for the totals calculator: the stored totals must always
//! equal the sum over the item set, at exact minor-unit precision.

use chrono::Utc;
use coursecart_api::{
    entities::cart_item::{self, ItemType},
    services::totals,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

fn line(price_minor_units: i64, quantity: i32) -> cart_item::Model {
    cart_item::Model {
        id: Uuid::new_v4(),
        cart_id: Uuid::new_v4(),
        item_type: ItemType::Course,
        item_id: Uuid::new_v4(),
        quantity,
        // Two decimal places, the common minor-unit precision
        unit_price: Decimal::new(price_minor_units, 2),
        currency_code: "USD".to_string(),
        title: "Property course".to_string(),
        thumbnail_url: None,
        creator_id: Uuid::new_v4(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

proptest! {
    #[test]
    fn total_is_exactly_the_sum_of_line_totals(
        lines in prop::collection::vec((0i64..10_000_000, 1i32..1_000), 0..50)
    ) {
        let items: Vec<cart_item::Model> =
            lines.iter().map(|&(price, qty)| line(price, qty)).collect();

        let result = totals::recompute(&items);

        let expected: Decimal = lines
            .iter()
            .map(|&(price, qty)| Decimal::new(price, 2) * Decimal::from(qty))
            .sum();

        prop_assert_eq!(result.total_price, expected);
        prop_assert_eq!(result.items_count, items.len() as i32);
    }

    #[test]
    fn count_ignores_quantities(
        quantities in prop::collection::vec(1i32..1_000, 1..20)
    ) {
        let items: Vec<cart_item::Model> =
            quantities.iter().map(|&qty| line(4_999, qty)).collect();

        let result = totals::recompute(&items);

        prop_assert_eq!(result.items_count, quantities.len() as i32);
    }
}
