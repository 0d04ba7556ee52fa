use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "skip_hire_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub order_number: String,
    pub location: String,
    pub waste_category: SkipWasteCategory,
    pub skip_size: SkipSize,
    pub delivery_date: NaiveDate,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Decimal,
    pub currency: String,
    pub status: SkipHireStatus,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipWasteCategory {
    #[sea_orm(string_value = "MIXED")]
    Mixed,
    #[sea_orm(string_value = "GREEN_GARDEN")]
    GreenGarden,
    #[sea_orm(string_value = "CONCRETE_RUBBLE")]
    ConcreteRubble,
    #[sea_orm(string_value = "WOOD")]
    Wood,
    #[sea_orm(string_value = "METAL_SCRAP")]
    MetalScrap,
    #[sea_orm(string_value = "ELECTRONICS_WEEE")]
    ElectronicsWeee,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipSize {
    #[sea_orm(string_value = "MINI")]
    Mini,
    #[sea_orm(string_value = "MIDI")]
    Midi,
    #[sea_orm(string_value = "BUILDERS")]
    Builders,
    #[sea_orm(string_value = "LARGE")]
    Large,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipHireStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "CONFIRMED")]
    Confirmed,
    #[sea_orm(string_value = "DELIVERED")]
    Delivered,
    #[sea_orm(string_value = "COLLECTED")]
    Collected,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl SkipHireStatus {
    pub fn can_cancel(self) -> bool {
        !matches!(self, SkipHireStatus::Collected | SkipHireStatus::Completed)
    }

    /// COMPLETED and CANCELLED bookings accept no further status changes.
    pub fn is_terminal(self) -> bool {
        matches!(self, SkipHireStatus::Completed | SkipHireStatus::Cancelled)
    }
}
