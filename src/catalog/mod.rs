//! Boundary to the catalog service that owns course/bundle identity and
//! pricing. The cart core only sees this trait; everything behind it is an
//! external collaborator.

use crate::entities::cart_item::LineItemRef;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

pub mod http;
pub mod memory;

pub use http::HttpCatalogClient;
pub use memory::InMemoryCatalog;

/// Authoritative unit price and display metadata for an item in one currency,
/// captured into the line item at add time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: Decimal,
    pub currency_code: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub creator_id: Uuid,
}

/// Live course data overlaid onto a snapshotted line for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CourseDecoration {
    pub name: String,
    pub slug: String,
    pub rating: Option<f32>,
    pub instructor: String,
    pub lessons_count: i32,
    pub enrollments_count: i64,
}

/// Live bundle data overlaid onto a snapshotted line for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BundleDecoration {
    pub name: String,
    pub slug: String,
    pub courses_count: i32,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("item not found")]
    ItemNotFound,

    #[error("no active price in {currency}")]
    PricingUnavailable { currency: String },

    #[error("catalog request failed: {0}")]
    Transport(String),
}

/// Client for the catalog collaborator.
///
/// `resolve_price` is consulted once per added line; the decoration calls are
/// presentation-only and return `Ok(None)` when the referenced item no longer
/// exists (a cart must keep rendering from its snapshot in that case).
#[async_trait]
pub trait CatalogClient: Send + Sync {
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
