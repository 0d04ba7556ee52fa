use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "materials")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub category: MaterialCategory,
    pub sub_category: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub base_price: Decimal,
    pub unit: MaterialUnit,
    pub currency: String,
    pub in_stock: bool,
    #[sea_orm(column_type = "Decimal(Some((12, 3)))", nullable)]
    pub min_order: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((12, 3)))", nullable)]
    pub max_order: Option<Decimal>,
    pub is_recycled: bool,
    pub quality: Option<String>,
    /// JSON array of certificate names
    pub certificates: Json,
    /// JSON array of image URLs
    pub images: Json,
    pub specifications: Option<Json>,
    pub supplier_id: Uuid,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::SupplierId",
        to = "super::company::Column::Id",
        on_delete = "Cascade"
    )]
    Supplier,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialCategory {
    #[sea_orm(string_value = "AGGREGATES")]
    Aggregates,
    #[sea_orm(string_value = "SAND")]
    Sand,
    #[sea_orm(string_value = "GRAVEL")]
    Gravel,
    #[sea_orm(string_value = "CONCRETE")]
    Concrete,
    #[sea_orm(string_value = "SOIL")]
    Soil,
    #[sea_orm(string_value = "ASPHALT")]
    Asphalt,
    #[sea_orm(string_value = "BRICKS")]
    Bricks,
    #[sea_orm(string_value = "METAL")]
    Metal,
    #[sea_orm(string_value = "WOOD")]
    Wood,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialUnit {
    #[sea_orm(string_value = "TONNE")]
    Tonne,
    #[sea_orm(string_value = "KG")]
    Kg,
    #[sea_orm(string_value = "M3")]
    M3,
    #[sea_orm(string_value = "PIECE")]
    Piece,
    #[sea_orm(string_value = "LOAD")]
    Load,
}
