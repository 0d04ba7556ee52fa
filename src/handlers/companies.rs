use axum::{
    extract::State,
    response::Response,
    Json,
};
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    handlers::common::{created_response, AppJson, AppPath},
    services::companies::{CompanyResponse, CreateCompanyRequest},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/v1/companies",
    summary = "Create company",
    request_body = CreateCompanyRequest,
    responses(
        (status = 201, description = "Company created", body = CompanyResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Administrators only", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "companies"
)]
pub async fn create_company(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCompanyRequest>,
) -> Result<Response, ServiceError> {
    let company = state.services.companies.create_company(payload).await?;
    Ok(created_response(company))
}

#[utoipa::path(
    get,
    path = "/api/v1/companies",
    summary = "List companies",
    responses(
        (status = 200, description = "Companies ordered by name", body = [CompanyResponse]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "companies"
)]
pub async fn list_companies(
    State(state): State<AppState>,
) -> Result<Json<Vec<CompanyResponse>>, ServiceError> {
    state.services.companies.list_companies().await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/v1/companies/{id}",
    summary = "Get company",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company", body = CompanyResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Company not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "companies"
)]
pub async fn get_company(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<CompanyResponse>, ServiceError> {
    state.services.companies.get_company(id).await.map(Json)
}
