use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CourseCart API",
        description = r#"
Shopping cart service for an e-learning marketplace.

Each user has at most one active cart holding course and bundle line items.
All lines share the cart's currency, fixed by the first item added. Prices
and display data are snapshotted when a line is added; live catalog data is
overlaid for display only and never changes what was stored.

All endpoints operate on the authenticated caller's own cart:

```
Authorization: Bearer <jwt>
```
"#,
    ),
    paths(
        crate::handlers::carts::get_cart,
        crate::handlers::carts::add_item,
        crate::handlers::carts::update_item,
        crate::handlers::carts::remove_item,
        crate::handlers::carts::clear_cart,
    ),
    components(schemas(
        crate::services::CartView,
        crate::services::CartItemView,
        crate::services::ItemDecoration,
        crate::catalog::CourseDecoration,
        crate::catalog::BundleDecoration,
        crate::entities::cart::CartStatus,
        crate::entities::cart_item::ItemType,
        crate::handlers::carts::AddItemRequest,
        crate::handlers::carts::UpdateItemRequest,
        crate::errors::ErrorResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "cart", description = "The authenticated user's shopping cart")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "Bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Swagger UI mounted at /docs, serving the generated document
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
