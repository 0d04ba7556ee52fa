use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

/// Registers the `Bearer` JWT scheme referenced by protected operations
struct BearerSecurity;

impl Modify for BearerSecurity {
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

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Construction Materials Marketplace API",
        version = "1.0.0",
        description = r#"
# Construction Materials Marketplace API

Buyers order aggregates, sand, concrete and other materials from suppliers,
and anyone can book a skip for waste collection.

## Authentication

Protected endpoints expect a JWT obtained from `/api/v1/auth/login`:

```
Authorization: Bearer <your-jwt-token>
```

## Error Handling

Errors share one body shape:

```json
{
  "error": "Bad Request",
  "message": "Cannot cancel a delivered or completed order",
  "request_id": "6f0c5d1e-...",
  "timestamp": "2024-10-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "auth", description = "Registration, login and profile"),
        (name = "companies", description = "Buyer and supplier companies"),
        (name = "materials", description = "Material catalog"),
        (name = "orders", description = "Material purchase orders"),
        (name = "skip-hire", description = "Skip container bookings"),
    ),
    paths(
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::me,

        crate::handlers::companies::create_company,
        crate::handlers::companies::list_companies,
        crate::handlers::companies::get_company,

        crate::handlers::materials::create_material,
        crate::handlers::materials::list_materials,
        crate::handlers::materials::list_categories,
        crate::handlers::materials::search_materials,
        crate::handlers::materials::get_material,
        crate::handlers::materials::update_material,
        crate::handlers::materials::delete_material,

        crate::handlers::orders::create_order,
        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::update_order,
        crate::handlers::orders::confirm_order,
        crate::handlers::orders::cancel_order,

        crate::handlers::skip_hire::create_booking,
        crate::handlers::skip_hire::list_bookings,
        crate::handlers::skip_hire::my_bookings,
        crate::handlers::skip_hire::get_booking_by_number,
        crate::handlers::skip_hire::get_booking,
        crate::handlers::skip_hire::update_booking_status,
        crate::handlers::skip_hire::cancel_booking,
    ),
    components(
        schemas(
            crate::auth::RegisterRequest,
            crate::auth::LoginRequest,
            crate::auth::AuthResponse,
            crate::auth::UserProfile,
            crate::auth::CompanySummary,
            crate::entities::user::UserType,
            crate::entities::user::UserStatus,

            crate::services::companies::CreateCompanyRequest,
            crate::services::companies::CompanyResponse,
            crate::entities::company::CompanyType,

            crate::services::materials::CreateMaterialRequest,
            crate::services::materials::UpdateMaterialRequest,
            crate::services::materials::MaterialResponse,
            crate::services::materials::SupplierSummary,
            crate::entities::material::MaterialCategory,
            crate::entities::material::MaterialUnit,

            crate::services::orders::CreateOrderRequest,
            crate::services::orders::OrderItemInput,
            crate::services::orders::UpdateOrderRequest,
            crate::services::orders::OrderResponse,
            crate::services::orders::OrderItemResponse,
            crate::entities::order::OrderType,
            crate::entities::order::OrderStatus,
            crate::entities::order::PaymentStatus,

            crate::services::skip_hire::CreateSkipHireRequest,
            crate::services::skip_hire::UpdateSkipHireStatusRequest,
            crate::services::skip_hire::SkipHireResponse,
            crate::entities::skip_hire_order::SkipWasteCategory,
            crate::entities::skip_hire_order::SkipSize,
            crate::entities::skip_hire_order::SkipHireStatus,

            crate::errors::ErrorResponse
        )
    ),
    modifiers(&BearerSecurity)
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
