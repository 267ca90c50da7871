use crate::{
    catalog::{BundleDecoration, CatalogClient, CourseDecoration},
    entities::{cart_item, cart_item::ItemType, cart_item::LineItemRef, CartStatus},
    services::cart_service::CartWithItems,
};
use futures::future::join_all;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

/// Read-only decoration step: joins live catalog data onto a snapshotted
/// cart for display. Never writes, and never lets a vanished catalog item
/// break the response - the stored snapshot always renders.
#[derive(Clone)]
pub struct CartPresenter {
    catalog: Arc<dyn CatalogClient>,
}

impl CartPresenter {
    pub fn new(catalog: Arc<dyn CatalogClient>) -> Self {
        Self { catalog }
    }

    pub async fn present(&self, cart: &CartWithItems) -> CartView {
        let items = join_all(cart.items.iter().map(|item| self.present_item(item))).await;

        CartView {
            id: Some(cart.cart.id),
            owner_id: cart.cart.owner_id,
            status: Some(cart.cart.status),
            currency_code: Some(cart.cart.currency_code.clone()),
            items_count: cart.cart.items_count,
            total_price: cart.cart.total_price,
            items,
        }
    }

    /// The shape returned when the owner has no active cart. Not a persisted
    /// zero-item cart - there is no such row.
    pub fn empty(owner_id: Uuid) -> CartView {
        CartView {
            id: None,
            owner_id,
            status: None,
            currency_code: None,
            items_count: 0,
            total_price: Decimal::ZERO,
            items: Vec::new(),
        }
    }

    async fn present_item(&self, item: &cart_item::Model) -> CartItemView {
        let decoration = match item.line_item() {
            LineItemRef::Course(id) => match self.catalog.course_decoration(id).await {
                Ok(decoration) => decoration.map(ItemDecoration::Course),
                Err(e) => {
                    warn!("course decoration lookup failed for {}: {}", id, e);
                    None
                }
            },
            LineItemRef::Bundle(id) => match self.catalog.bundle_decoration(id).await {
                Ok(decoration) => decoration.map(ItemDecoration::Bundle),
                Err(e) => {
                    warn!("bundle decoration lookup failed for {}: {}", id, e);
                    None
                }
            },
        };

        CartItemView {
            id: item.id,
            item_type: item.item_type,
            item_id: item.item_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
            currency_code: item.currency_code.clone(),
            title: item.title.clone(),
            thumbnail_url: item.thumbnail_url.clone(),
            creator_id: item.creator_id,
            line_total: item.line_total(),
            decoration,
        }
    }
}

/// Cart-shaped read model returned by every cart endpoint.
///
/// `id`, `status` and `currency_code` are absent in the empty-cart shape.
#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub owner_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CartStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    pub items_count: i32,
    pub total_price: Decimal,
    pub items: Vec<CartItemView>,
}

/// One line of the read model: the stored snapshot plus optional live
/// decoration. The snapshot fields are the source of truth for totals; the
/// decoration is presentation-only.
#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemView {
    pub id: Uuid,
    pub item_type: ItemType,
    pub item_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub currency_code: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub creator_id: Uuid,
    pub line_total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoration: Option<ItemDecoration>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ItemDecoration {
    Course(CourseDecoration),
    Bundle(BundleDecoration),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::memory::{CatalogCourse, InMemoryCatalog};
    use crate::catalog::{CatalogError, PriceQuote};
    use crate::entities::cart;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    mockall::mock! {
        Catalog {}

        #[async_trait::async_trait]
        impl CatalogClient for Catalog {
            async fn resolve_price(
                &self,
                item: LineItemRef,
                currency_code: &str,
            ) -> Result<PriceQuote, CatalogError>;

            async fn course_decoration(
                &self,
                course_id: Uuid,
            ) -> Result<Option<CourseDecoration>, CatalogError>;

            async fn bundle_decoration(
                &self,
                bundle_id: Uuid,
            ) -> Result<Option<BundleDecoration>, CatalogError>;
        }
    }

    fn stored_cart(items: Vec<cart_item::Model>) -> CartWithItems {
        let total: Decimal = items.iter().map(|i| i.line_total()).sum();
        let count = items.len() as i32;
        CartWithItems {
            cart: cart::Model {
                id: Uuid::new_v4(),
                owner_id: Uuid::new_v4(),
                currency_code: "USD".to_string(),
                total_price: total,
                items_count: count,
                status: CartStatus::Active,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            items,
        }
    }

    fn stored_item(course_id: Uuid) -> cart_item::Model {
        cart_item::Model {
            id: Uuid::new_v4(),
            cart_id: Uuid::new_v4(),
            item_type: ItemType::Course,
            item_id: course_id,
            quantity: 2,
            unit_price: dec!(49.99),
            currency_code: "USD".to_string(),
            title: "Snapshotted Title".to_string(),
            thumbnail_url: Some("https://cdn.example.com/old.png".to_string()),
            creator_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn overlays_live_decoration_without_touching_the_snapshot() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let course_id = Uuid::new_v4();
        catalog.insert_course(
            course_id,
            CatalogCourse {
                title: "Renamed Course".to_string(),
                thumbnail_url: None,
                creator_id: Uuid::new_v4(),
                prices: HashMap::from([("USD".to_string(), dec!(99.99))]),
                decoration: Some(CourseDecoration {
                    name: "Renamed Course".to_string(),
                    slug: "renamed-course".to_string(),
                    rating: Some(4.7),
                    instructor: "Ada Lovelace".to_string(),
                    lessons_count: 42,
                    enrollments_count: 1_337,
                }),
            },
        );

        let presenter = CartPresenter::new(catalog);
        let stored = stored_cart(vec![stored_item(course_id)]);
        let view = presenter.present(&stored).await;

        let line = &view.items[0];
        // Snapshot fields are untouched by the live overlay
        assert_eq!(line.title, "Snapshotted Title");
        assert_eq!(line.unit_price, dec!(49.99));
        assert_eq!(line.line_total, dec!(99.98));
        assert!(matches!(
            line.decoration,
            Some(ItemDecoration::Course(ref d)) if d.slug == "renamed-course"
        ));
    }

    #[tokio::test]
    async fn vanished_catalog_item_still_renders_from_snapshot() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let presenter = CartPresenter::new(catalog);

        // Course no longer exists in the catalog at all
        let stored = stored_cart(vec![stored_item(Uuid::new_v4())]);
        let view = presenter.present(&stored).await;

        let line = &view.items[0];
        assert!(line.decoration.is_none());
        assert_eq!(line.title, "Snapshotted Title");
        assert_eq!(view.items_count, 1);
    }

    #[tokio::test]
    async fn decoration_transport_failure_degrades_to_snapshot() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_course_decoration()
            .returning(|_| Err(CatalogError::Transport("catalog unreachable".to_string())));

        let presenter = CartPresenter::new(Arc::new(catalog));
        let stored = stored_cart(vec![stored_item(Uuid::new_v4())]);
        let view = presenter.present(&stored).await;

        assert!(view.items[0].decoration.is_none());
        assert_eq!(view.items[0].title, "Snapshotted Title");
    }

    #[test]
    fn empty_shape_has_zero_totals_and_no_identity() {
        let owner_id = Uuid::new_v4();
        let view = CartPresenter::empty(owner_id);

        assert_eq!(view.owner_id, owner_id);
        assert!(view.id.is_none());
        assert!(view.currency_code.is_none());
        assert_eq!(view.items_count, 0);
        assert_eq!(view.total_price, Decimal::ZERO);
        assert!(view.items.is_empty());
    }
}
