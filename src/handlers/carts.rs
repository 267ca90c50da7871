use crate::handlers::common::{success_response, validate_input};
use crate::{
    auth::AuthenticatedUser,
    entities::cart_item::{ItemType, LineItemRef},
    errors::ApiError,
    services::{cart_service::AddItemInput, CartPresenter},
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for the current user's cart.
///
/// The owner is always the authenticated user; cart and owner ids never
/// appear in the URL.
pub fn cart_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_cart).delete(clear_cart))
        .route("/items", post(add_item))
        .route("/items/:item_id", put(update_item).delete(remove_item))
}

/// Get the current user's cart
#[utoipa::path(
    get,
    path = "/api/v1/cart",
    summary = "Get cart",
    description = "Returns the caller's active cart decorated with live catalog data, or the empty-cart shape when no active cart exists",
    responses(
        (status = 200, description = "Cart retrieved successfully", body = crate::services::CartView),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "cart"
)]
pub async fn get_cart(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let view = match state.services.cart.find_active_cart(user.user_id).await? {
        Some(cart) => state.services.presenter.present(&cart).await,
        None => CartPresenter::empty(user.user_id),
    };

    Ok(success_response(view))
}

/// Add an item to the cart
#[utoipa::path(
    post,
    path = "/api/v1/cart/items",
    summary = "Add item",
    description = "Adds a course or bundle to the caller's active cart, creating the cart if necessary. Price and display data are snapshotted at this moment.",
    request_body = AddItemRequest,
    responses(
        (status = 200, description = "Item added", body = crate::services::CartView),
        (status = 400, description = "Invalid quantity, malformed currency code, or currency mismatch", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item unknown to the catalog or unpriced in the requested currency", body = crate::errors::ErrorResponse),
        (status = 409, description = "Item already in the cart", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "cart"
)]
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(payload): Json<AddItemRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = AddItemInput {
        item: LineItemRef::new(payload.item_type, payload.item_id),
        currency_code: payload.currency_code,
        quantity: payload.quantity,
    };

    let cart = state.services.cart.add_item(user.user_id, input).await?;
    let view = state.services.presenter.present(&cart).await;

    Ok(success_response(view))
}

/// Change the quantity of a cart line
#[utoipa::path(
    put,
    path = "/api/v1/cart/items/{item_id}",
    summary = "Update item quantity",
    description = "Sets the quantity of an existing line. The line's snapshotted price and currency are untouched.",
    params(("item_id" = Uuid, Path, description = "Cart line id")),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Quantity updated", body = crate::services::CartView),
        (status = 400, description = "Quantity is not a positive integer", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "No active cart, or the line does not belong to it", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "cart"
)]
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<UpdateItemRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let cart = state
        .services
        .cart
        .update_item_quantity(user.user_id, item_id, payload.quantity)
        .await?;
    let view = state.services.presenter.present(&cart).await;

    Ok(success_response(view))
}

/// Remove a cart line
#[utoipa::path(
    delete,
    path = "/api/v1/cart/items/{item_id}",
    summary = "Remove item",
    description = "Deletes a line. Removing the last line deletes the cart itself and returns the empty-cart shape.",
    params(("item_id" = Uuid, Path, description = "Cart line id")),
    responses(
        (status = 200, description = "Item removed", body = crate::services::CartView),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "No active cart, or the line does not belong to it", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "cart"
)]
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(item_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let view = match state
        .services
        .cart
        .remove_item(user.user_id, item_id)
        .await?
    {
        Some(cart) => state.services.presenter.present(&cart).await,
        None => CartPresenter::empty(user.user_id),
    };

    Ok(success_response(view))
}

/// Clear the cart
#[utoipa::path(
    delete,
    path = "/api/v1/cart",
    summary = "Clear cart",
    description = "Deletes all items and the cart row. Idempotent: clearing with no active cart succeeds.",
    responses(
        (status = 200, description = "Cart cleared"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "cart"
)]
pub async fn clear_cart(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state.services.cart.clear_cart(user.user_id).await?;

    Ok(success_response(serde_json::json!({
        "message": "Cart cleared successfully"
    })))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddItemRequest {
    pub item_type: ItemType,
    pub item_id: Uuid,
    #[validate(custom = "crate::services::currency::validate_currency_code")]
    #[schema(example = "USD")]
    pub currency_code: String,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1))]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateItemRequest {
    #[validate(range(min = 1))]
    pub quantity: i32,
}
