//! Price computation for material orders and skip-hire bookings.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use thiserror::Error;

use crate::entities::skip_hire_order::SkipSize;
use crate::errors::ServiceError;

/// VAT applied when no rate is configured
pub const DEFAULT_VAT_RATE: Decimal = dec!(0.19);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("Quantity must be greater than zero")]
    NonPositiveQuantity,
    #[error("Unit price cannot be negative")]
    NegativeUnitPrice,
    #[error("Delivery fee cannot be negative")]
    NegativeDeliveryFee,
    #[error("VAT rate must be between 0 and 1")]
    InvalidVatRate,
}

impl From<PricingError> for ServiceError {
    fn from(err: PricingError) -> Self {
        ServiceError::BadRequest(err.to_string())
    }
}

/// Rounds a money amount to cents, halves away from zero
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn line_total(unit_price: Decimal, quantity: Decimal) -> Result<Decimal, PricingError> {
    if quantity <= Decimal::ZERO {
        return Err(PricingError::NonPositiveQuantity);
    }
    if unit_price < Decimal::ZERO {
        return Err(PricingError::NegativeUnitPrice);
    }
    Ok(round_money(unit_price * quantity))
}

/// Totals of a material order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderPricing {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

impl OrderPricing {
    /// `total = subtotal + round(subtotal * vat_rate) + delivery_fee`
    pub fn compute<I>(
        line_totals: I,
        delivery_fee: Decimal,
        vat_rate: Decimal,
    ) -> Result<Self, PricingError>
    where
        I: IntoIterator<Item = Decimal>,
    {
        if vat_rate < Decimal::ZERO || vat_rate > Decimal::ONE {
            return Err(PricingError::InvalidVatRate);
        }
        if delivery_fee < Decimal::ZERO {
            return Err(PricingError::NegativeDeliveryFee);
        }

        let subtotal: Decimal = line_totals.into_iter().sum();
        let tax = round_money(subtotal * vat_rate);

        Ok(Self {
            subtotal,
            tax,
            delivery_fee,
            total: subtotal + tax + delivery_fee,
        })
    }

    /// Re-prices with a different delivery fee; subtotal and tax are unchanged
    pub fn with_delivery_fee(self, delivery_fee: Decimal) -> Result<Self, PricingError> {
        if delivery_fee < Decimal::ZERO {
            return Err(PricingError::NegativeDeliveryFee);
        }
        Ok(Self {
            delivery_fee,
            total: self.subtotal + self.tax + delivery_fee,
            ..self
        })
    }
}

/// Flat hire price per skip size
pub fn skip_price(size: SkipSize) -> Decimal {
    match size {
        SkipSize::Mini => dec!(89),
        SkipSize::Midi => dec!(129),
        SkipSize::Builders => dec!(169),
        SkipSize::Large => dec!(199),
    }
}
