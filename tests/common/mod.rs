#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request},
    response::Response,
    Router,
};
use coursecart_api::{
    auth,
    catalog::{
        memory::{CatalogBundle, CatalogCourse},
        BundleDecoration, CatalogClient, CourseDecoration, InMemoryCatalog,
    },
    config::AppConfig,
    db, events,
    handlers::AppServices,
    AppState,
};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database};
use serde_json::Value;
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str =
    "integration_test_jwt_secret_that_is_definitely_long_enough_for_hs256_0123456789";

/// Test harness: in-memory SQLite with migrations applied, an in-memory
/// catalog, and the full router.
pub struct TestApp {
    pub state: Arc<AppState>,
    pub router: Router,
    pub catalog: Arc<InMemoryCatalog>,
}

impl TestApp {
    pub async fn new() -> Self {
        // A single pooled connection keeps every query on the same
        // in-memory database.
        let mut opt = ConnectOptions::new("sqlite::memory:".to_owned());
        opt.max_connections(1).sqlx_logging(false);
        let db = Database::connect(opt)
            .await
            .expect("sqlite in-memory connection");
        db::run_migrations(&db).await.expect("migrations");

        let db_arc = Arc::new(db);

        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = events::EventSender::new(event_tx);
        tokio::spawn(events::process_events(event_rx));

        let catalog = Arc::new(InMemoryCatalog::new());
        let services = AppServices::new(
            db_arc.clone(),
            catalog.clone() as Arc<dyn CatalogClient>,
            Arc::new(event_sender.clone()),
        );

        let state = Arc::new(AppState {
            db: db_arc,
            config: test_config(),
            event_sender,
            services,
            catalog: catalog.clone() as Arc<dyn CatalogClient>,
        });

        let router = Router::new()
            .nest("/api/v1", coursecart_api::api_v1_routes())
            .with_state(state.clone());

        Self {
            state,
            router,
            catalog,
        }
    }

    pub fn token_for(&self, owner_id: Uuid) -> String {
        auth::issue_token(TEST_JWT_SECRET, owner_id, Duration::from_secs(3600))
            .expect("token minting")
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router response")
    }

    pub async fn request_as(
        &self,
        owner_id: Uuid,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response {
        let token = self.token_for(owner_id);
        self.request(method, uri, body, Some(&token)).await
    }

    /// Seeds a course priced in one currency
    pub fn seed_course(&self, currency: &str, price: Decimal) -> Uuid {
        let id = Uuid::new_v4();
        self.catalog.insert_course(
            id,
            CatalogCourse {
                title: format!("Course {}", id),
                thumbnail_url: Some(format!("https://cdn.example.com/courses/{}.png", id)),
                creator_id: Uuid::new_v4(),
                prices: HashMap::from([(currency.to_string(), price)]),
                decoration: None,
            },
        );
        id
    }

    /// Seeds a course that also carries live decoration data
    pub fn seed_course_decorated(&self, currency: &str, price: Decimal, slug: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.catalog.insert_course(
            id,
            CatalogCourse {
                title: format!("Course {}", slug),
                thumbnail_url: None,
                creator_id: Uuid::new_v4(),
                prices: HashMap::from([(currency.to_string(), price)]),
                decoration: Some(CourseDecoration {
                    name: format!("Course {}", slug),
                    slug: slug.to_string(),
                    rating: Some(4.5),
                    instructor: "Grace Hopper".to_string(),
                    lessons_count: 24,
                    enrollments_count: 512,
                }),
            },
        );
        id
    }

    pub fn seed_bundle(&self, currency: &str, price: Decimal) -> Uuid {
        let id = Uuid::new_v4();
        self.catalog.insert_bundle(
            id,
            CatalogBundle {
                title: format!("Bundle {}", id),
                thumbnail_url: None,
                creator_id: Uuid::new_v4(),
                prices: HashMap::from([(currency.to_string(), price)]),
                decoration: Some(BundleDecoration {
                    name: format!("Bundle {}", id),
                    slug: format!("bundle-{}", id),
                    courses_count: 3,
                }),
            },
        );
        id
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        jwt_expiration: 3600,
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "development".to_string(),
        log_level: "info".to_string(),
        log_json: false,
        auto_migrate: false,
        cors_allowed_origins: None,
        cors_allow_any_origin: false,
        cors_allow_credentials: false,
        db_max_connections: 1,
        db_min_connections: 1,
        db_connect_timeout_secs: 30,
        db_idle_timeout_secs: 600,
        db_acquire_timeout_secs: 8,
        catalog_base_url: None,
        catalog_timeout_secs: 10,
        event_channel_capacity: 64,
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}
