use crate::{
    auth::{AuthUser, CompanySummary},
    common::flexible_date,
    db::{is_unique_violation, DbPool},
    entities::{
        company::{self, Entity as CompanyEntity},
        material::{self, Entity as MaterialEntity, MaterialUnit},
        order::{self, Entity as OrderEntity, OrderStatus, OrderType, PaymentStatus},
        order_item::{self, Entity as OrderItemEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        lifecycle::{ensure_order_cancellable, ensure_order_confirmable},
        numbering::{format_order_number, sequence_for, MATERIAL_ORDER_PREFIX, MAX_ATTEMPTS},
        pricing::{line_total, OrderPricing},
        CommerceSettings,
    },
};
use chrono::{DateTime, NaiveDate, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub material_id: Uuid,
    #[schema(value_type = f64)]
    pub quantity: Decimal,
    /// Defaults to the material's catalog unit
    pub unit: Option<MaterialUnit>,
    /// Optional client-side price; must match the catalog price when present
    #[schema(value_type = Option<f64>)]
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub order_type: OrderType,
    pub buyer_id: Uuid,
    #[validate(length(min = 1, message = "Delivery address is required"))]
    pub delivery_address: String,
    #[validate(length(min = 1, message = "Delivery city is required"))]
    pub delivery_city: String,
    #[validate(length(min = 1, message = "Delivery state is required"))]
    pub delivery_state: String,
    #[validate(length(min = 1, message = "Delivery postal code is required"))]
    pub delivery_postal: String,
    #[serde(default, deserialize_with = "flexible_date::option::deserialize")]
    #[schema(value_type = Option<String>, format = Date)]
    pub delivery_date: Option<NaiveDate>,
    pub delivery_window: Option<String>,
    #[serde(default)]
    #[schema(value_type = f64)]
    pub delivery_fee: Decimal,
    pub payment_status: Option<PaymentStatus>,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<OrderItemInput>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub delivery_address: Option<String>,
    pub delivery_city: Option<String>,
    pub delivery_state: Option<String>,
    pub delivery_postal: Option<String>,
    #[serde(default, deserialize_with = "flexible_date::option::deserialize")]
    #[schema(value_type = Option<String>, format = Date)]
    pub delivery_date: Option<NaiveDate>,
    pub delivery_window: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub delivery_fee: Option<Decimal>,
    pub notes: Option<String>,
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrderFilter {
    pub buyer_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub material_id: Uuid,
    pub material_name: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub quantity: Decimal,
    pub unit: MaterialUnit,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub order_type: OrderType,
    pub buyer_id: Uuid,
    pub created_by_id: Uuid,
    pub delivery_address: String,
    pub delivery_city: String,
    pub delivery_state: String,
    pub delivery_postal: String,
    pub delivery_date: Option<NaiveDate>,
    pub delivery_window: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub delivery_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total: Decimal,
    pub currency: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub items: Vec<OrderItemResponse>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub buyer: Option<CompanySummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderResponse {
    fn new(
        model: order::Model,
        items: Vec<OrderItemResponse>,
        buyer: Option<CompanySummary>,
    ) -> Self {
        Self {
            id: model.id,
            order_number: model.order_number,
            order_type: model.order_type,
            buyer_id: model.buyer_id,
            created_by_id: model.created_by_id,
            delivery_address: model.delivery_address,
            delivery_city: model.delivery_city,
            delivery_state: model.delivery_state,
            delivery_postal: model.delivery_postal,
            delivery_date: model.delivery_date,
            delivery_window: model.delivery_window,
            delivery_fee: model.delivery_fee,
            subtotal: model.subtotal,
            tax: model.tax,
            total: model.total,
            currency: model.currency,
            status: model.status,
            payment_status: model.payment_status,
            notes: model.notes,
            items,
            buyer,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// A validated order line, priced from the catalog
#[derive(Debug, Clone)]
struct PricedLine {
    material_id: Uuid,
    quantity: Decimal,
    unit: MaterialUnit,
    unit_price: Decimal,
    total: Decimal,
}

fn price_line(material: &material::Model, input: &OrderItemInput) -> Result<PricedLine, ServiceError> {
    if !material.active {
        return Err(ServiceError::BadRequest(format!(
            "Material {} is no longer available",
            material.name
        )));
    }
    if input.quantity <= Decimal::ZERO {
        return Err(ServiceError::BadRequest(format!(
            "Quantity for material {} must be greater than zero",
            material.name
        )));
    }
    if let Some(min) = material.min_order {
        if input.quantity < min {
            return Err(ServiceError::BadRequest(format!(
                "Minimum order for {} is {} {:?}",
                material.name, min, material.unit
            )));
        }
    }
    if let Some(max) = material.max_order {
        if input.quantity > max {
            return Err(ServiceError::BadRequest(format!(
                "Maximum order for {} is {} {:?}",
                material.name, max, material.unit
            )));
        }
    }
    if let Some(unit) = input.unit {
        if unit != material.unit {
            return Err(ServiceError::BadRequest(format!(
                "Unit mismatch for material {}",
                material.name
            )));
        }
    }
    if let Some(given) = input.unit_price {
        if given != material.base_price {
            return Err(ServiceError::BadRequest(format!(
                "Price mismatch for material {}: expected {}, got {}",
                material.name, material.base_price, given
            )));
        }
    }

    Ok(PricedLine {
        material_id: material.id,
        quantity: input.quantity,
        unit: material.unit,
        unit_price: material.base_price,
        total: line_total(material.base_price, input.quantity)?,
    })
}

/// Material purchase orders
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    settings: CommerceSettings,
}

impl OrderService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        settings: CommerceSettings,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            settings,
        }
    }

    /// Creates an order with its items in one transaction
    #[instrument(skip(self, caller, request), fields(user_id = %caller.user_id, buyer_id = %request.buyer_id))]
    pub async fn create_order(
        &self,
        caller: &AuthUser,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let buyer = CompanyEntity::find_by_id(request.buyer_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Company with ID {} not found", request.buyer_id))
            })?;

        let material_ids: Vec<Uuid> = request.items.iter().map(|i| i.material_id).collect();
        let materials: HashMap<Uuid, material::Model> = MaterialEntity::find()
            .filter(material::Column::Id.is_in(material_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        let lines = request
            .items
            .iter()
            .map(|input| {
                let material = materials.get(&input.material_id).ok_or_else(|| {
                    ServiceError::NotFound(format!("Material {} not found", input.material_id))
                })?;
                price_line(material, input)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let pricing = OrderPricing::compute(
            lines.iter().map(|l| l.total),
            request.delivery_fee,
            self.settings.vat_rate,
        )?;

        for attempt in 0..MAX_ATTEMPTS {
            let existing = OrderEntity::find().count(db).await?;
            let now = Utc::now();
            let order_number =
                format_order_number(MATERIAL_ORDER_PREFIX, now, sequence_for(existing, attempt));

            let txn = db.begin().await?;
            match self
                .insert_order(&txn, &order_number, caller, &request, &lines, pricing, now)
                .await
            {
                Ok(order_id) => {
                    txn.commit().await.map_err(|e| {
                        error!(error = %e, %order_id, "Failed to commit order");
                        ServiceError::DatabaseError(e)
                    })?;

                    counter!("marketplace.orders.created", 1);
                    info!(%order_id, %order_number, total = %pricing.total, "order created");
                    self.event_sender
                        .publish(Event::OrderCreated {
                            order_id,
                            order_number,
                        })
                        .await;

                    let mut view = self.get_order(order_id).await?;
                    if view.buyer.is_none() {
                        view.buyer = Some(buyer.into());
                    }
                    return Ok(view);
                }
                Err(e) if is_unique_violation(&e) => {
                    txn.rollback().await?;
                    warn!(%order_number, attempt, "order number taken, retrying");
                }
                Err(e) => {
                    error!(error = %e, "Failed to insert order");
                    return Err(ServiceError::DatabaseError(e));
                }
            }
        }

        Err(ServiceError::Conflict(
            "Could not allocate a unique order number, please retry".to_string(),
        ))
    }

    #[allow(clippy::too_many_arguments)]
    async fn insert_order(
        &self,
        txn: &DatabaseTransaction,
        order_number: &str,
        caller: &AuthUser,
        request: &CreateOrderRequest,
        lines: &[PricedLine],
        pricing: OrderPricing,
        now: DateTime<Utc>,
    ) -> Result<Uuid, DbErr> {
        let order_id = Uuid::new_v4();
        order::ActiveModel {
            id: Set(order_id),
            order_number: Set(order_number.to_string()),
            order_type: Set(request.order_type),
            buyer_id: Set(request.buyer_id),
            created_by_id: Set(caller.user_id),
            delivery_address: Set(request.delivery_address.clone()),
            delivery_city: Set(request.delivery_city.clone()),
            delivery_state: Set(request.delivery_state.clone()),
            delivery_postal: Set(request.delivery_postal.clone()),
            delivery_date: Set(request.delivery_date),
            delivery_window: Set(request.delivery_window.clone()),
            delivery_fee: Set(pricing.delivery_fee),
            subtotal: Set(pricing.subtotal),
            tax: Set(pricing.tax),
            total: Set(pricing.total),
            currency: Set(self.settings.currency.clone()),
            status: Set(OrderStatus::Pending),
            payment_status: Set(request.payment_status.unwrap_or(PaymentStatus::Pending)),
            notes: Set(request.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn)
        .await?;

        for line in lines {
            order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                material_id: Set(line.material_id),
                quantity: Set(line.quantity),
                unit: Set(line.unit),
                unit_price: Set(line.unit_price),
                total: Set(line.total),
                created_at: Set(now),
            }
            .insert(txn)
            .await?;
        }

        Ok(order_id)
    }

    /// Attaches items, material names and buyer summaries to a batch of orders
    async fn with_details(&self, orders: Vec<order::Model>) -> Result<Vec<OrderResponse>, ServiceError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }
        let db = &*self.db_pool;

        let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let items = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.is_in(order_ids))
            .order_by_asc(order_item::Column::CreatedAt)
            .all(db)
            .await?;

        let material_ids: Vec<Uuid> = items.iter().map(|i| i.material_id).collect();
        let material_names: HashMap<Uuid, String> = MaterialEntity::find()
            .filter(material::Column::Id.is_in(material_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect();

        let buyer_ids: Vec<Uuid> = orders.iter().map(|o| o.buyer_id).collect();
        let buyers: HashMap<Uuid, company::Model> = CompanyEntity::find()
            .filter(company::Column::Id.is_in(buyer_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let mut items_by_order: HashMap<Uuid, Vec<OrderItemResponse>> = HashMap::new();
        for item in items {
            items_by_order
                .entry(item.order_id)
                .or_default()
                .push(OrderItemResponse {
                    id: item.id,
                    material_id: item.material_id,
                    material_name: material_names.get(&item.material_id).cloned(),
                    quantity: item.quantity,
                    unit: item.unit,
                    unit_price: item.unit_price,
                    total: item.total,
                });
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let items = items_by_order.remove(&order.id).unwrap_or_default();
                let buyer = buyers.get(&order.buyer_id).cloned().map(CompanySummary::from);
                OrderResponse::new(order, items, buyer)
            })
            .collect())
    }

    async fn find_order(&self, id: Uuid) -> Result<order::Model, ServiceError> {
        OrderEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order with ID {} not found", id)))
    }

    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: Uuid) -> Result<OrderResponse, ServiceError> {
        let order = self.find_order(id).await?;
        self.with_details(vec![order])
            .await?
            .pop()
            .ok_or_else(|| ServiceError::NotFound(format!("Order with ID {} not found", id)))
    }

    /// Orders newest first
    #[instrument(skip(self))]
    pub async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<OrderResponse>, ServiceError> {
        let mut query = OrderEntity::find();
        if let Some(buyer_id) = filter.buyer_id {
            query = query.filter(order::Column::BuyerId.eq(buyer_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(order::Column::Status.eq(status));
        }

        let orders = query
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?;

        self.with_details(orders).await
    }

    /// Partial update of delivery details, notes and payment status
    #[instrument(skip(self, request), fields(order_id = %id))]
    pub async fn update_order(
        &self,
        id: Uuid,
        request: UpdateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        let existing = self.find_order(id).await?;

        let repriced = match request.delivery_fee {
            Some(fee) => Some(
                OrderPricing {
                    subtotal: existing.subtotal,
                    tax: existing.tax,
                    delivery_fee: existing.delivery_fee,
                    total: existing.total,
                }
                .with_delivery_fee(fee)?,
            ),
            None => None,
        };

        let mut active = existing.into_active_model();
        if let Some(address) = request.delivery_address {
            active.delivery_address = Set(address);
        }
        if let Some(city) = request.delivery_city {
            active.delivery_city = Set(city);
        }
        if let Some(state) = request.delivery_state {
            active.delivery_state = Set(state);
        }
        if let Some(postal) = request.delivery_postal {
            active.delivery_postal = Set(postal);
        }
        if let Some(date) = request.delivery_date {
            active.delivery_date = Set(Some(date));
        }
        if let Some(window) = request.delivery_window {
            active.delivery_window = Set(Some(window));
        }
        if let Some(pricing) = repriced {
            active.delivery_fee = Set(pricing.delivery_fee);
            active.total = Set(pricing.total);
        }
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }
        if let Some(payment_status) = request.payment_status {
            active.payment_status = Set(payment_status);
        }
        active.updated_at = Set(Utc::now());

        active.update(&*self.db_pool).await?;
        info!("order updated");
        self.get_order(id).await
    }

    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn confirm_order(&self, id: Uuid) -> Result<OrderResponse, ServiceError> {
        let existing = self.find_order(id).await?;
        let old_status = existing.status;
        if let Err(e) = ensure_order_confirmable(old_status) {
            warn!(status = ?old_status, "order cannot be confirmed");
            return Err(e);
        }

        let mut active = existing.into_active_model();
        active.status = Set(OrderStatus::Confirmed);
        active.updated_at = Set(Utc::now());
        active.update(&*self.db_pool).await?;

        info!("order confirmed");
        self.event_sender
            .publish(Event::OrderStatusChanged {
                order_id: id,
                old_status,
                new_status: OrderStatus::Confirmed,
            })
            .await;

        self.get_order(id).await
    }

    /// Cancelling an already cancelled order returns it unchanged
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn cancel_order(&self, id: Uuid) -> Result<OrderResponse, ServiceError> {
        let existing = self.find_order(id).await?;
        if let Err(e) = ensure_order_cancellable(existing.status) {
            warn!(status = ?existing.status, "order cannot be cancelled");
            return Err(e);
        }
        if existing.status == OrderStatus::Cancelled {
            return self.get_order(id).await;
        }

        let mut active = existing.into_active_model();
        active.status = Set(OrderStatus::Cancelled);
        active.updated_at = Set(Utc::now());
        active.update(&*self.db_pool).await?;

        counter!("marketplace.orders.cancelled", 1);
        info!("order cancelled");
        self.event_sender.publish(Event::OrderCancelled(id)).await;

        self.get_order(id).await
    }
}
