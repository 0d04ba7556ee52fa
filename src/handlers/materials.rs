use axum::{
    extract::State,
    response::Response,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    entities::material::MaterialCategory,
    errors::ServiceError,
    handlers::common::{created_response, AppJson, AppPath, AppQuery},
    services::materials::{
        CreateMaterialRequest, MaterialFilter, MaterialResponse, UpdateMaterialRequest,
    },
    AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Text matched against name, description and sub-category
    pub q: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/materials",
    summary = "Create material",
    request_body = CreateMaterialRequest,
    responses(
        (status = 201, description = "Material created", body = MaterialResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Not a supplier of this company", body = crate::errors::ErrorResponse),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "materials"
)]
pub async fn create_material(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateMaterialRequest>,
) -> Result<Response, ServiceError> {
    let material = state
        .services
        .materials
        .create_material(&user, payload)
        .await?;
    Ok(created_response(material))
}

#[utoipa::path(
    get,
    path = "/api/v1/materials",
    summary = "List materials",
    description = "Active materials, newest first",
    params(MaterialFilter),
    responses(
        (status = 200, description = "Materials", body = [MaterialResponse]),
        (status = 400, description = "Invalid filter", body = crate::errors::ErrorResponse),
    ),
    tag = "materials"
)]
pub async fn list_materials(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<MaterialFilter>,
) -> Result<Json<Vec<MaterialResponse>>, ServiceError> {
    state.services.materials.list_materials(filter).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/v1/materials/categories",
    summary = "Material categories",
    responses((status = 200, description = "All categories", body = [MaterialCategory])),
    tag = "materials"
)]
pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<MaterialCategory>> {
    Json(state.services.materials.categories())
}

#[utoipa::path(
    get,
    path = "/api/v1/materials/search",
    summary = "Search materials",
    params(SearchParams),
    responses(
        (status = 200, description = "Up to 20 matching active materials", body = [MaterialResponse]),
        (status = 400, description = "Missing query", body = crate::errors::ErrorResponse),
    ),
    tag = "materials"
)]
pub async fn search_materials(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<SearchParams>,
) -> Result<Json<Vec<MaterialResponse>>, ServiceError> {
    state
        .services
        .materials
        .search_materials(params.q.as_deref().unwrap_or_default())
        .await
        .map(Json)
}

#[utoipa::path(
    get,
    path = "/api/v1/materials/{id}",
    summary = "Get material",
    params(("id" = Uuid, Path, description = "Material ID")),
    responses(
        (status = 200, description = "Material", body = MaterialResponse),
        (status = 404, description = "Material not found", body = crate::errors::ErrorResponse),
    ),
    tag = "materials"
)]
pub async fn get_material(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MaterialResponse>, ServiceError> {
    state.services.materials.get_material(id).await.map(Json)
}

#[utoipa::path(
    patch,
    path = "/api/v1/materials/{id}",
    summary = "Update material",
    params(("id" = Uuid, Path, description = "Material ID")),
    request_body = UpdateMaterialRequest,
    responses(
        (status = 200, description = "Material updated", body = MaterialResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 403, description = "Not a supplier of this company", body = crate::errors::ErrorResponse),
        (status = 404, description = "Material not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "materials"
)]
pub async fn update_material(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateMaterialRequest>,
) -> Result<Json<MaterialResponse>, ServiceError> {
    state
        .services
        .materials
        .update_material(&user, id, payload)
        .await
        .map(Json)
}

#[utoipa::path(
    delete,
    path = "/api/v1/materials/{id}",
    summary = "Deactivate material",
    description = "Soft delete; the material disappears from listings but stays reachable by id",
    params(("id" = Uuid, Path, description = "Material ID")),
    responses(
        (status = 200, description = "Material deactivated", body = MaterialResponse),
        (status = 403, description = "Not a supplier of this company", body = crate::errors::ErrorResponse),
        (status = 404, description = "Material not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "materials"
)]
pub async fn delete_material(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MaterialResponse>, ServiceError> {
    state
        .services
        .materials
        .deactivate_material(&user, id)
        .await
        .map(Json)
}
