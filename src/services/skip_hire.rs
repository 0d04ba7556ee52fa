use crate::{
    auth::AuthUser,
    common::{flexible_date, non_blank},
    db::{is_unique_violation, DbPool},
    entities::skip_hire_order::{
        self, Entity as SkipHireEntity, SkipHireStatus, SkipSize, SkipWasteCategory,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        lifecycle::{ensure_skip_hire_cancellable, ensure_skip_hire_transition},
        numbering::{format_order_number, sequence_for, MAX_ATTEMPTS, SKIP_HIRE_PREFIX},
        pricing::skip_price,
    },
};
use chrono::{DateTime, NaiveDate, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn validate_location(location: &str) -> Result<(), ValidationError> {
    if location.trim().chars().count() < 2 {
        let mut err = ValidationError::new("location");
        err.message = Some("Location must be at least 2 characters".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSkipHireRequest {
    #[validate(custom = "validate_location")]
    pub location: String,
    pub waste_category: SkipWasteCategory,
    pub skip_size: SkipSize,
    #[serde(deserialize_with = "flexible_date::deserialize")]
    #[schema(value_type = String, format = Date)]
    pub delivery_date: NaiveDate,
    pub contact_name: Option<String>,
    #[validate(email(message = "Invalid contact email"))]
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateSkipHireStatusRequest {
    pub status: SkipHireStatus,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SkipHireFilter {
    pub status: Option<SkipHireStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SkipHireResponse {
    pub id: Uuid,
    pub order_number: String,
    pub location: String,
    pub waste_category: SkipWasteCategory,
    pub skip_size: SkipSize,
    pub delivery_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub currency: String,
    pub status: SkipHireStatus,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub notes: Option<String>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<skip_hire_order::Model> for SkipHireResponse {
    fn from(model: skip_hire_order::Model) -> Self {
        Self {
            id: model.id,
            order_number: model.order_number,
            location: model.location,
            waste_category: model.waste_category,
            skip_size: model.skip_size,
            delivery_date: model.delivery_date,
            price: model.price,
            currency: model.currency,
            status: model.status,
            contact_name: model.contact_name,
            contact_email: model.contact_email,
            contact_phone: model.contact_phone,
            notes: model.notes,
            user_id: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn ensure_future_delivery(date: NaiveDate, today: NaiveDate) -> Result<(), ServiceError> {
    if date < today {
        return Err(ServiceError::BadRequest(
            "Delivery date cannot be in the past".to_string(),
        ));
    }
    Ok(())
}

/// Skip container bookings. Guests may book; signed-in users get the booking linked.
#[derive(Clone)]
pub struct SkipHireService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    currency: String,
}

impl SkipHireService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, currency: String) -> Self {
        Self {
            db_pool,
            event_sender,
            currency,
        }
    }

    #[instrument(skip(self, caller, request), fields(skip_size = ?request.skip_size, user_id = ?caller.map(|c| c.user_id)))]
    pub async fn create_booking(
        &self,
        caller: Option<&AuthUser>,
        request: CreateSkipHireRequest,
    ) -> Result<SkipHireResponse, ServiceError> {
        request.validate()?;
        ensure_future_delivery(request.delivery_date, Utc::now().date_naive())?;

        let db = &*self.db_pool;
        let price = skip_price(request.skip_size);

        for attempt in 0..MAX_ATTEMPTS {
            let existing = SkipHireEntity::find().count(db).await?;
            let now = Utc::now();
            let order_number =
                format_order_number(SKIP_HIRE_PREFIX, now, sequence_for(existing, attempt));

            let inserted = skip_hire_order::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_number: Set(order_number.clone()),
                location: Set(request.location.trim().to_string()),
                waste_category: Set(request.waste_category),
                skip_size: Set(request.skip_size),
                delivery_date: Set(request.delivery_date),
                price: Set(price),
                currency: Set(self.currency.clone()),
                status: Set(SkipHireStatus::Pending),
                contact_name: Set(non_blank(request.contact_name.clone())),
                contact_email: Set(non_blank(request.contact_email.clone())),
                contact_phone: Set(non_blank(request.contact_phone.clone())),
                notes: Set(non_blank(request.notes.clone())),
                user_id: Set(caller.map(|c| c.user_id)),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(db)
            .await;

            match inserted {
                Ok(model) => {
                    counter!("marketplace.skip_hire.created", 1);
                    info!(order_id = %model.id, %order_number, %price, "skip hire booked");
                    self.event_sender
                        .publish(Event::SkipHireCreated {
                            order_id: model.id,
                            order_number,
                        })
                        .await;
                    return Ok(model.into());
                }
                Err(e) if is_unique_violation(&e) => {
                    warn!(%order_number, attempt, "skip hire number taken, retrying");
                }
                Err(e) => {
                    error!(error = %e, "Failed to insert skip hire booking");
                    return Err(ServiceError::DatabaseError(e));
                }
            }
        }

        Err(ServiceError::Conflict(
            "Could not allocate a unique order number, please retry".to_string(),
        ))
    }

    /// All bookings, newest first
    pub async fn list_bookings(
        &self,
        filter: SkipHireFilter,
    ) -> Result<Vec<SkipHireResponse>, ServiceError> {
        let mut query = SkipHireEntity::find();
        if let Some(status) = filter.status {
            query = query.filter(skip_hire_order::Column::Status.eq(status));
        }

        let bookings = query
            .order_by_desc(skip_hire_order::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?;
        Ok(bookings.into_iter().map(Into::into).collect())
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<SkipHireResponse>, ServiceError> {
        let bookings = SkipHireEntity::find()
            .filter(skip_hire_order::Column::UserId.eq(user_id))
            .order_by_desc(skip_hire_order::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?;
        Ok(bookings.into_iter().map(Into::into).collect())
    }

    pub async fn get_by_number(&self, order_number: &str) -> Result<SkipHireResponse, ServiceError> {
        SkipHireEntity::find()
            .filter(skip_hire_order::Column::OrderNumber.eq(order_number))
            .one(&*self.db_pool)
            .await?
            .map(Into::into)
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_number)))
    }

    async fn find_booking(&self, id: Uuid) -> Result<skip_hire_order::Model, ServiceError> {
        SkipHireEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Skip hire order {} not found", id)))
    }

    pub async fn get_booking(&self, id: Uuid) -> Result<SkipHireResponse, ServiceError> {
        self.find_booking(id).await.map(Into::into)
    }

    #[instrument(skip(self), fields(order_id = %id, new_status = ?status))]
    pub async fn update_status(
        &self,
        id: Uuid,
        status: SkipHireStatus,
    ) -> Result<SkipHireResponse, ServiceError> {
        let existing = self.find_booking(id).await?;
        let old_status = existing.status;
        if let Err(e) = ensure_skip_hire_transition(old_status, status) {
            warn!(from = ?old_status, "rejected skip hire status change");
            return Err(e);
        }
        if old_status == status {
            return Ok(existing.into());
        }

        let mut active = existing.into_active_model();
        active.status = Set(status);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db_pool).await?;

        info!(from = ?old_status, "skip hire status changed");
        self.event_sender
            .publish(Event::SkipHireStatusChanged {
                order_id: id,
                old_status,
                new_status: status,
            })
            .await;

        Ok(updated.into())
    }

    /// Owners and admins may cancel; cancelling twice is a no-op
    #[instrument(skip(self, caller), fields(order_id = %id, user_id = %caller.user_id))]
    pub async fn cancel_booking(
        &self,
        caller: &AuthUser,
        id: Uuid,
    ) -> Result<SkipHireResponse, ServiceError> {
        let existing = self.find_booking(id).await?;

        if !caller.is_admin() && existing.user_id != Some(caller.user_id) {
            warn!("caller does not own skip hire booking");
            return Err(ServiceError::Forbidden(
                "You can only cancel your own orders".to_string(),
            ));
        }
        if let Err(e) = ensure_skip_hire_cancellable(existing.status) {
            warn!(status = ?existing.status, "skip hire booking cannot be cancelled");
            return Err(e);
        }
        if existing.status == SkipHireStatus::Cancelled {
            return Ok(existing.into());
        }

        let mut active = existing.into_active_model();
        active.status = Set(SkipHireStatus::Cancelled);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db_pool).await?;

        counter!("marketplace.skip_hire.cancelled", 1);
        info!("skip hire booking cancelled");
        self.event_sender.publish(Event::SkipHireCancelled(id)).await;

        Ok(updated.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn request(location: &str, email: Option<&str>) -> CreateSkipHireRequest {
        CreateSkipHireRequest {
            location: location.to_string(),
            waste_category: SkipWasteCategory::Mixed,
            skip_size: SkipSize::Midi,
            delivery_date: NaiveDate::from_ymd_opt(2030, 1, 15).unwrap(),
            contact_name: None,
            contact_email: email.map(str::to_string),
            contact_phone: None,
            notes: None,
        }
    }

    #[rstest]
    #[case("Brivibas iela 1, Riga", true)]
    #[case("  A ", false)]
    #[case("", false)]
    fn location_needs_two_characters(#[case] location: &str, #[case] ok: bool) {
        assert_eq!(request(location, None).validate().is_ok(), ok);
    }

    #[test]
    fn contact_email_must_be_valid_when_present() {
        assert!(request("Riga", Some("site@build.lv")).validate().is_ok());
        assert!(request("Riga", Some("not-an-email")).validate().is_err());
    }

    #[test]
    fn delivery_today_is_allowed_but_not_yesterday() {
        let today = NaiveDate::from_ymd_opt(2024, 10, 15).unwrap();
        assert!(ensure_future_delivery(today, today).is_ok());
        assert!(matches!(
            ensure_future_delivery(today.pred_opt().unwrap(), today),
            Err(ServiceError::BadRequest(_))
        ));
    }

    #[test]
    fn accepts_iso_datetime_for_delivery_date() {
        let body = serde_json::json!({
            "location": "Riga",
            "wasteCategory": "CONCRETE_RUBBLE",
            "skipSize": "BUILDERS",
            "deliveryDate": "2030-03-01T09:00:00.000Z"
        });
        let parsed: CreateSkipHireRequest = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.delivery_date, NaiveDate::from_ymd_opt(2030, 3, 1).unwrap());
        assert_eq!(parsed.skip_size, SkipSize::Builders);
    }
}
