//! Status-transition guards for orders and skip-hire bookings.

use crate::entities::{order::OrderStatus, skip_hire_order::SkipHireStatus};
use crate::errors::ServiceError;

pub fn ensure_order_cancellable(status: OrderStatus) -> Result<(), ServiceError> {
    if status.can_cancel() {
        Ok(())
    } else {
        Err(ServiceError::InvalidStatus(
            "Cannot cancel a delivered or completed order".to_string(),
        ))
    }
}

pub fn ensure_order_confirmable(status: OrderStatus) -> Result<(), ServiceError> {
    if status.can_confirm() {
        Ok(())
    } else {
        Err(ServiceError::InvalidStatus(
            "Only pending orders can be confirmed".to_string(),
        ))
    }
}

pub fn ensure_skip_hire_cancellable(status: SkipHireStatus) -> Result<(), ServiceError> {
    if status.can_cancel() {
        Ok(())
    } else {
        Err(ServiceError::InvalidStatus(
            "Cannot cancel an order that is already completed or collected".to_string(),
        ))
    }
}

/// Terminal bookings only accept a no-op update to their current status
pub fn ensure_skip_hire_transition(
    from: SkipHireStatus,
    to: SkipHireStatus,
) -> Result<(), ServiceError> {
    if from.is_terminal() && from != to {
        return Err(ServiceError::InvalidStatus(
            "Cannot change status of a completed or cancelled order".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(OrderStatus::Pending, true)]
    #[case(OrderStatus::Confirmed, true)]
    #[case(OrderStatus::InProgress, true)]
    #[case(OrderStatus::Cancelled, true)]
    #[case(OrderStatus::Delivered, false)]
    #[case(OrderStatus::Completed, false)]
    fn order_cancel_guard(#[case] status: OrderStatus, #[case] allowed: bool) {
        assert_eq!(ensure_order_cancellable(status).is_ok(), allowed);
    }

    #[test]
    fn order_cancel_rejection_message() {
        let err = ensure_order_cancellable(OrderStatus::Delivered).unwrap_err();
        assert_eq!(err.to_string(), "Cannot cancel a delivered or completed order");
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[case(OrderStatus::Pending, true)]
    #[case(OrderStatus::Confirmed, false)]
    #[case(OrderStatus::Cancelled, false)]
    #[case(OrderStatus::Delivered, false)]
    fn order_confirm_guard(#[case] status: OrderStatus, #[case] allowed: bool) {
        assert_eq!(ensure_order_confirmable(status).is_ok(), allowed);
    }

    #[rstest]
    #[case(SkipHireStatus::Pending, true)]
    #[case(SkipHireStatus::Confirmed, true)]
    #[case(SkipHireStatus::Delivered, true)]
    #[case(SkipHireStatus::Collected, false)]
    #[case(SkipHireStatus::Completed, false)]
    fn skip_hire_cancel_guard(#[case] status: SkipHireStatus, #[case] allowed: bool) {
        assert_eq!(ensure_skip_hire_cancellable(status).is_ok(), allowed);
    }

    #[rstest]
    #[case(SkipHireStatus::Pending, SkipHireStatus::Delivered, true)]
    #[case(SkipHireStatus::Collected, SkipHireStatus::Completed, true)]
    #[case(SkipHireStatus::Completed, SkipHireStatus::Completed, true)]
    #[case(SkipHireStatus::Completed, SkipHireStatus::Pending, false)]
    #[case(SkipHireStatus::Cancelled, SkipHireStatus::Confirmed, false)]
    fn skip_hire_terminal_states_are_sticky(
        #[case] from: SkipHireStatus,
        #[case] to: SkipHireStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(ensure_skip_hire_transition(from, to).is_ok(), allowed);
    }
}
