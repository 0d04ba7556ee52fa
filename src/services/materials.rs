use crate::{
    auth::AuthUser,
    db::DbPool,
    entities::{
        company::{self, Entity as CompanyEntity},
        material::{self, Entity as MaterialEntity, MaterialCategory, MaterialUnit},
        user::{self, Entity as UserEntity},
    },
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr},
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Upper bound on search hits
pub const SEARCH_LIMIT: u64 = 20;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaterialRequest {
    #[validate(length(min = 1, max = 200, message = "Material name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub category: MaterialCategory,
    pub sub_category: Option<String>,
    #[schema(value_type = f64)]
    pub base_price: Decimal,
    pub unit: MaterialUnit,
    #[validate(length(equal = 3, message = "Currency must be 3 characters"))]
    pub currency: Option<String>,
    #[serde(default = "default_true")]
    pub in_stock: bool,
    #[schema(value_type = Option<f64>)]
    pub min_order: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub max_order: Option<Decimal>,
    #[serde(default)]
    pub is_recycled: bool,
    pub quality: Option<String>,
    #[serde(default)]
    pub certificates: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[schema(value_type = Option<Object>)]
    pub specifications: Option<serde_json::Value>,
    pub supplier_id: Uuid,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMaterialRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<MaterialCategory>,
    pub sub_category: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub base_price: Option<Decimal>,
    pub unit: Option<MaterialUnit>,
    pub in_stock: Option<bool>,
    #[schema(value_type = Option<f64>)]
    pub min_order: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub max_order: Option<Decimal>,
    pub is_recycled: Option<bool>,
    pub quality: Option<String>,
    pub certificates: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    #[schema(value_type = Option<Object>)]
    pub specifications: Option<serde_json::Value>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MaterialFilter {
    pub category: Option<MaterialCategory>,
    pub supplier_id: Option<Uuid>,
    pub is_recycled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierSummary {
    pub id: Uuid,
    pub name: String,
    pub logo: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub rating: Option<Decimal>,
    pub city: Option<String>,
}

impl From<company::Model> for SupplierSummary {
    fn from(model: company::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            logo: model.logo,
            rating: model.rating,
            city: model.city,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: MaterialCategory,
    pub sub_category: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub base_price: Decimal,
    pub unit: MaterialUnit,
    pub currency: String,
    pub in_stock: bool,
    #[serde(with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub min_order: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub max_order: Option<Decimal>,
    pub is_recycled: bool,
    pub quality: Option<String>,
    pub certificates: Vec<String>,
    pub images: Vec<String>,
    #[schema(value_type = Option<Object>)]
    pub specifications: Option<serde_json::Value>,
    pub supplier_id: Uuid,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub supplier: Option<SupplierSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn string_list(value: &serde_json::Value) -> Vec<String> {
    serde_json::from_value(value.clone()).unwrap_or_default()
}

impl MaterialResponse {
    pub fn new(model: material::Model, supplier: Option<company::Model>) -> Self {
        Self {
            certificates: string_list(&model.certificates),
            images: string_list(&model.images),
            id: model.id,
            name: model.name,
            description: model.description,
            category: model.category,
            sub_category: model.sub_category,
            base_price: model.base_price,
            unit: model.unit,
            currency: model.currency,
            in_stock: model.in_stock,
            min_order: model.min_order,
            max_order: model.max_order,
            is_recycled: model.is_recycled,
            quality: model.quality,
            specifications: model.specifications,
            supplier_id: model.supplier_id,
            active: model.active,
            supplier: supplier.map(SupplierSummary::from),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// `%needle%` with LIKE wildcards in the needle escaped by a backslash
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn check_order_bounds(
    base_price: Decimal,
    min_order: Option<Decimal>,
    max_order: Option<Decimal>,
) -> Result<(), ServiceError> {
    if base_price < Decimal::ZERO {
        return Err(ServiceError::BadRequest(
            "Base price cannot be negative".to_string(),
        ));
    }
    if min_order.is_some_and(|min| min <= Decimal::ZERO)
        || max_order.is_some_and(|max| max <= Decimal::ZERO)
    {
        return Err(ServiceError::BadRequest(
            "Order bounds must be positive".to_string(),
        ));
    }
    if let (Some(min), Some(max)) = (min_order, max_order) {
        if min > max {
            return Err(ServiceError::BadRequest(
                "Minimum order cannot exceed maximum order".to_string(),
            ));
        }
    }
    Ok(())
}

/// Catalog of materials offered by supplier companies
#[derive(Clone)]
pub struct MaterialService {
    db_pool: Arc<DbPool>,
    default_currency: String,
}

impl MaterialService {
    pub fn new(db_pool: Arc<DbPool>, default_currency: String) -> Self {
        Self {
            db_pool,
            default_currency,
        }
    }

    /// Suppliers may only manage their own company's catalog; admins manage all.
    async fn ensure_can_manage(&self, caller: &AuthUser, supplier_id: Uuid) -> Result<(), ServiceError> {
        if caller.is_admin() {
            return Ok(());
        }

        let company_id = UserEntity::find_by_id(caller.user_id)
            .select_only()
            .column(user::Column::CompanyId)
            .into_tuple::<Option<Uuid>>()
            .one(&*self.db_pool)
            .await?
            .flatten();

        if company_id == Some(supplier_id) {
            Ok(())
        } else {
            warn!(user_id = %caller.user_id, %supplier_id, "supplier tried to manage another company's material");
            Err(ServiceError::Forbidden(
                "You can only manage materials of your own company".to_string(),
            ))
        }
    }

    async fn find_material(&self, id: Uuid) -> Result<material::Model, ServiceError> {
        MaterialEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Material with ID {} not found", id)))
    }

    #[instrument(skip(self, caller, request), fields(user_id = %caller.user_id, supplier_id = %request.supplier_id))]
    pub async fn create_material(
        &self,
        caller: &AuthUser,
        request: CreateMaterialRequest,
    ) -> Result<MaterialResponse, ServiceError> {
        request.validate()?;
        check_order_bounds(request.base_price, request.min_order, request.max_order)?;

        let supplier = CompanyEntity::find_by_id(request.supplier_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Supplier with ID {} not found",
                    request.supplier_id
                ))
            })?;
        self.ensure_can_manage(caller, supplier.id).await?;

        let now = Utc::now();
        let model = material::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            description: Set(request.description),
            category: Set(request.category),
            sub_category: Set(request.sub_category),
            base_price: Set(request.base_price),
            unit: Set(request.unit),
            currency: Set(request
                .currency
                .unwrap_or_else(|| self.default_currency.clone())),
            in_stock: Set(request.in_stock),
            min_order: Set(request.min_order),
            max_order: Set(request.max_order),
            is_recycled: Set(request.is_recycled),
            quality: Set(request.quality),
            certificates: Set(serde_json::json!(request.certificates)),
            images: Set(serde_json::json!(request.images)),
            specifications: Set(request.specifications),
            supplier_id: Set(supplier.id),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db_pool)
        .await?;

        info!(material_id = %model.id, "material created");
        Ok(MaterialResponse::new(model, Some(supplier)))
    }

    /// Active materials, newest first
    pub async fn list_materials(
        &self,
        filter: MaterialFilter,
    ) -> Result<Vec<MaterialResponse>, ServiceError> {
        let mut query = MaterialEntity::find().filter(material::Column::Active.eq(true));

        if let Some(category) = filter.category {
            query = query.filter(material::Column::Category.eq(category));
        }
        if let Some(supplier_id) = filter.supplier_id {
            query = query.filter(material::Column::SupplierId.eq(supplier_id));
        }
        if let Some(is_recycled) = filter.is_recycled {
            query = query.filter(material::Column::IsRecycled.eq(is_recycled));
        }

        let rows = query
            .order_by_desc(material::Column::CreatedAt)
            .find_also_related(CompanyEntity)
            .all(&*self.db_pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(material, supplier)| MaterialResponse::new(material, supplier))
            .collect())
    }

    pub fn categories(&self) -> Vec<MaterialCategory> {
        use sea_orm::Iterable;
        MaterialCategory::iter().collect()
    }

    /// Case-insensitive substring match over name, description and sub-category
    #[instrument(skip(self))]
    pub async fn search_materials(&self, q: &str) -> Result<Vec<MaterialResponse>, ServiceError> {
        let needle = q.trim().to_lowercase();
        if needle.is_empty() {
            return Err(ServiceError::BadRequest(
                "Search query is required".to_string(),
            ));
        }
        let pattern = LikeExpr::new(like_pattern(&needle)).escape('\\');

        let matches = [
            material::Column::Name,
            material::Column::Description,
            material::Column::SubCategory,
        ]
        .into_iter()
        .fold(Condition::any(), |cond, column| {
            cond.add(
                Expr::expr(Func::lower(Expr::col((MaterialEntity, column)))).like(pattern.clone()),
            )
        });

        let rows = MaterialEntity::find()
            .filter(material::Column::Active.eq(true))
            .filter(matches)
            .order_by_desc(material::Column::CreatedAt)
            .limit(SEARCH_LIMIT)
            .find_also_related(CompanyEntity)
            .all(&*self.db_pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(material, supplier)| MaterialResponse::new(material, supplier))
            .collect())
    }

    /// Returns the material regardless of its active flag
    pub async fn get_material(&self, id: Uuid) -> Result<MaterialResponse, ServiceError> {
        let (material, supplier) = MaterialEntity::find_by_id(id)
            .find_also_related(CompanyEntity)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Material with ID {} not found", id)))?;

        Ok(MaterialResponse::new(material, supplier))
    }

    #[instrument(skip(self, caller, request), fields(user_id = %caller.user_id))]
    pub async fn update_material(
        &self,
        caller: &AuthUser,
        id: Uuid,
        request: UpdateMaterialRequest,
    ) -> Result<MaterialResponse, ServiceError> {
        request.validate()?;

        let existing = self.find_material(id).await?;
        self.ensure_can_manage(caller, existing.supplier_id).await?;

        check_order_bounds(
            request.base_price.unwrap_or(existing.base_price),
            request.min_order.or(existing.min_order),
            request.max_order.or(existing.max_order),
        )?;

        let mut active = existing.into_active_model();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(category) = request.category {
            active.category = Set(category);
        }
        if let Some(sub_category) = request.sub_category {
            active.sub_category = Set(Some(sub_category));
        }
        if let Some(base_price) = request.base_price {
            active.base_price = Set(base_price);
        }
        if let Some(unit) = request.unit {
            active.unit = Set(unit);
        }
        if let Some(in_stock) = request.in_stock {
            active.in_stock = Set(in_stock);
        }
        if let Some(min_order) = request.min_order {
            active.min_order = Set(Some(min_order));
        }
        if let Some(max_order) = request.max_order {
            active.max_order = Set(Some(max_order));
        }
        if let Some(is_recycled) = request.is_recycled {
            active.is_recycled = Set(is_recycled);
        }
        if let Some(quality) = request.quality {
            active.quality = Set(Some(quality));
        }
        if let Some(certificates) = request.certificates {
            active.certificates = Set(serde_json::json!(certificates));
        }
        if let Some(images) = request.images {
            active.images = Set(serde_json::json!(images));
        }
        if let Some(specifications) = request.specifications {
            active.specifications = Set(Some(specifications));
        }
        if let Some(flag) = request.active {
            active.active = Set(flag);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db_pool).await?;
        info!(material_id = %updated.id, "material updated");
        self.get_material(updated.id).await
    }

    /// Soft delete: the row stays so existing order items keep their reference
    #[instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn deactivate_material(
        &self,
        caller: &AuthUser,
        id: Uuid,
    ) -> Result<MaterialResponse, ServiceError> {
        let existing = self.find_material(id).await?;
        self.ensure_can_manage(caller, existing.supplier_id).await?;

        let mut active = existing.into_active_model();
        active.active = Set(false);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db_pool).await?;

        info!(material_id = %updated.id, "material deactivated");
        self.get_material(updated.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn order_bounds_must_be_ordered() {
        assert!(check_order_bounds(dec!(10), Some(dec!(1)), Some(dec!(50))).is_ok());
        assert!(matches!(
            check_order_bounds(dec!(10), Some(dec!(60)), Some(dec!(50))),
            Err(ServiceError::BadRequest(_))
        ));
        assert!(matches!(
            check_order_bounds(dec!(-1), None, None),
            Err(ServiceError::BadRequest(_))
        ));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("sand"), "%sand%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn string_lists_tolerate_unexpected_json() {
        assert_eq!(
            string_list(&serde_json::json!(["CE", "EN 12620"])),
            vec!["CE".to_string(), "EN 12620".to_string()]
        );
        assert!(string_list(&serde_json::json!({"not": "a list"})).is_empty());
    }
}
