// Marketplace services
pub mod companies;
pub mod materials;
pub mod orders;
pub mod skip_hire;

// Pure order-lifecycle rules shared by the services above
pub mod lifecycle;
pub mod numbering;
pub mod pricing;

use rust_decimal::Decimal;

use crate::config::AppConfig;

/// Tax and currency settings applied to new orders
#[derive(Debug, Clone, PartialEq)]
pub struct CommerceSettings {
    pub vat_rate: Decimal,
    pub currency: String,
}

impl Default for CommerceSettings {
    fn default() -> Self {
        Self {
            vat_rate: pricing::DEFAULT_VAT_RATE,
            currency: "EUR".to_string(),
        }
    }
}

impl From<&AppConfig> for CommerceSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            vat_rate: cfg.vat_rate_decimal(),
            currency: cfg.currency.clone(),
        }
    }
}
