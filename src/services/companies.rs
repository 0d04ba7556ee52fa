use crate::{
    db::DbPool,
    entities::company::{self, CompanyType, Entity as CompanyEntity},
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyRequest {
    #[validate(length(min = 1, max = 200, message = "Company name is required"))]
    pub name: String,
    pub company_type: CompanyType,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub logo: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResponse {
    pub id: Uuid,
    pub name: String,
    pub company_type: CompanyType,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub logo: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub rating: Option<Decimal>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<company::Model> for CompanyResponse {
    fn from(model: company::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            company_type: model.company_type,
            email: model.email,
            phone: model.phone,
            logo: model.logo,
            rating: model.rating,
            city: model.city,
            country: model.country,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Buyer and supplier companies
#[derive(Clone)]
pub struct CompanyService {
    db_pool: Arc<DbPool>,
}

impl CompanyService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_company(
        &self,
        request: CreateCompanyRequest,
    ) -> Result<CompanyResponse, ServiceError> {
        request.validate()?;

        let now = Utc::now();
        let model = company::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            company_type: Set(request.company_type),
            email: Set(request.email),
            phone: Set(request.phone),
            logo: Set(request.logo),
            rating: Set(None),
            city: Set(request.city),
            country: Set(request.country),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db_pool)
        .await?;

        info!(company_id = %model.id, "company created");
        Ok(model.into())
    }

    pub async fn list_companies(&self) -> Result<Vec<CompanyResponse>, ServiceError> {
        let companies = CompanyEntity::find()
            .order_by_asc(company::Column::Name)
            .all(&*self.db_pool)
            .await?;

        Ok(companies.into_iter().map(Into::into).collect())
    }

    pub async fn get_company(&self, id: Uuid) -> Result<CompanyResponse, ServiceError> {
        CompanyEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .map(Into::into)
            .ok_or_else(|| ServiceError::NotFound(format!("Company with ID {} not found", id)))
    }
}
