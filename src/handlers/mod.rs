pub mod auth;
pub mod common;
pub mod companies;
pub mod materials;
pub mod orders;
pub mod skip_hire;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    companies::CompanyService, materials::MaterialService, orders::OrderService,
    skip_hire::SkipHireService, CommerceSettings,
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub companies: Arc<CompanyService>,
    pub materials: Arc<MaterialService>,
    pub orders: Arc<OrderService>,
    pub skip_hire: Arc<SkipHireService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        settings: CommerceSettings,
    ) -> Self {
        let companies = Arc::new(CompanyService::new(db_pool.clone()));
        let materials = Arc::new(MaterialService::new(
            db_pool.clone(),
            settings.currency.clone(),
        ));
        let skip_hire = Arc::new(SkipHireService::new(
            db_pool.clone(),
            event_sender.clone(),
            settings.currency.clone(),
        ));
        let orders = Arc::new(OrderService::new(db_pool, event_sender, settings));

        Self {
            companies,
            materials,
            orders,
            skip_hire,
        }
    }
}
