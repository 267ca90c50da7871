use super::{BundleDecoration, CatalogClient, CatalogError, CourseDecoration, PriceQuote};
use crate::entities::cart_item::LineItemRef;
use async_trait::async_trait;
use http::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{instrument, warn};
use uuid::Uuid;

/// HTTP client for the catalog service's internal API.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: reqwest::Client,
    base_url: String,
}

/// Error body the catalog service returns on 404s, distinguishing an unknown
/// item from an item with no active price in the requested currency.
#[derive(Debug, Deserialize)]
struct CatalogErrorBody {
    code: String,
}

impl HttpCatalogClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_decoration<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
    ) -> Result<Option<T>, CatalogError> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body = response
                    .json::<T>()
                    .await
                    .map_err(|e| CatalogError::Transport(e.to_string()))?;
                Ok(Some(body))
            }
            status => Err(CatalogError::Transport(format!(
                "catalog returned {} for {}",
                status, url
            ))),
        }
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    #[instrument(skip(self))]
    async fn resolve_price(
        &self,
        item: LineItemRef,
        currency_code: &str,
    ) -> Result<PriceQuote, CatalogError> {
        let url = format!(
            "{}/internal/catalog/price?item_type={}&item_id={}&currency={}",
            self.base_url,
            item.item_type(),
            item.item_id(),
            currency_code
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                let body = response.json::<CatalogErrorBody>().await.ok();
                match body.as_ref().map(|b| b.code.as_str()) {
                    Some("pricing_unavailable") => Err(CatalogError::PricingUnavailable {
                        currency: currency_code.to_string(),
                    }),
                    Some("item_not_found") | None => Err(CatalogError::ItemNotFound),
                    Some(code) => {
                        warn!("unrecognized catalog 404 code: {}", code);
                        Err(CatalogError::ItemNotFound)
                    }
                }
            }
            status if status.is_success() => response
                .json::<PriceQuote>()
                .await
                .map_err(|e| CatalogError::Transport(e.to_string())),
            status => Err(CatalogError::Transport(format!(
                "catalog returned {} for {}",
                status, url
            ))),
        }
    }

    async fn course_decoration(
        &self,
        course_id: Uuid,
    ) -> Result<Option<CourseDecoration>, CatalogError> {
        self.fetch_decoration(format!(
            "{}/internal/catalog/courses/{}/decoration",
            self.base_url, course_id
        ))
        .await
    }

    async fn bundle_decoration(
        &self,
        bundle_id: Uuid,
    ) -> Result<Option<BundleDecoration>, CatalogError> {
        self.fetch_decoration(format!(
            "{}/internal/catalog/bundles/{}/decoration",
            self.base_url, bundle_id
        ))
        .await
    }
}
