use super::{BundleDecoration, CatalogClient, CatalogError, CourseDecoration, PriceQuote};
use crate::entities::cart_item::LineItemRef;
use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory catalog used in development mode and tests.
///
/// Entries can be inserted, repriced and removed at runtime, which is what
/// the snapshot-pricing and vanished-item tests exercise.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    courses: DashMap<Uuid, CatalogCourse>,
    bundles: DashMap<Uuid, CatalogBundle>,
}

#[derive(Debug, Clone)]
pub struct CatalogCourse {
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub creator_id: Uuid,
    /// Active price per currency code
    pub prices: HashMap<String, Decimal>,
    pub decoration: Option<CourseDecoration>,
}

#[derive(Debug, Clone)]
pub struct CatalogBundle {
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub creator_id: Uuid,
    pub prices: HashMap<String, Decimal>,
    pub decoration: Option<BundleDecoration>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_course(&self, id: Uuid, course: CatalogCourse) {
        self.courses.insert(id, course);
    }

    pub fn insert_bundle(&self, id: Uuid, bundle: CatalogBundle) {
        self.bundles.insert(id, bundle);
    }

    pub fn remove_course(&self, id: Uuid) {
        self.courses.remove(&id);
    }

    pub fn remove_bundle(&self, id: Uuid) {
        self.bundles.remove(&id);
    }

    pub fn set_course_price(&self, id: Uuid, currency_code: &str, price: Decimal) {
        if let Some(mut course) = self.courses.get_mut(&id) {
            course.prices.insert(currency_code.to_string(), price);
        }
    }
}

#[async_trait]
impl CatalogClient for InMemoryCatalog {
    async fn resolve_price(
        &self,
        item: LineItemRef,
        currency_code: &str,
    ) -> Result<PriceQuote, CatalogError> {
        match item {
            LineItemRef::Course(id) => {
                let course = self.courses.get(&id).ok_or(CatalogError::ItemNotFound)?;
                let price = course.prices.get(currency_code).copied().ok_or_else(|| {
                    CatalogError::PricingUnavailable {
                        currency: currency_code.to_string(),
                    }
                })?;
                Ok(PriceQuote {
                    price,
                    currency_code: currency_code.to_string(),
                    title: course.title.clone(),
                    thumbnail_url: course.thumbnail_url.clone(),
                    creator_id: course.creator_id,
                })
            }
            LineItemRef::Bundle(id) => {
                let bundle = self.bundles.get(&id).ok_or(CatalogError::ItemNotFound)?;
                let price = bundle.prices.get(currency_code).copied().ok_or_else(|| {
                    CatalogError::PricingUnavailable {
                        currency: currency_code.to_string(),
                    }
                })?;
                Ok(PriceQuote {
                    price,
                    currency_code: currency_code.to_string(),
                    title: bundle.title.clone(),
                    thumbnail_url: bundle.thumbnail_url.clone(),
                    creator_id: bundle.creator_id,
                })
            }
        }
    }

    async fn course_decoration(
        &self,
        course_id: Uuid,
    ) -> Result<Option<CourseDecoration>, CatalogError> {
        Ok(self
            .courses
            .get(&course_id)
            .and_then(|c| c.decoration.clone()))
    }

    async fn bundle_decoration(
        &self,
        bundle_id: Uuid,
    ) -> Result<Option<BundleDecoration>, CatalogError> {
        Ok(self
            .bundles
            .get(&bundle_id)
            .and_then(|b| b.decoration.clone()))
    }
}
