//! Error taxonomy of the itinerary engine.

use super::money::Money;

/// Failures raised by the domain types.
///
/// Every mutation that returns one of these leaves the object graph exactly as
/// it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlannerError {
    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),
    #[error("End date must be after start date")]
    InvalidRange,
    #[error("Budget ceiling of {ceiling} exceeded: {current_total} already planned, {attempted} attempted")]
    BudgetExceeded {
        ceiling: Money,
        current_total: Money,
        attempted: Money,
    },
    #[error("Index {index} is out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Activity has no day index")]
    NoDayIndex,
    #[error("Name cannot be empty")]
    EmptyName,
    #[error("Name is too long ({len} characters, maximum {max})")]
    NameTooLong { len: usize, max: usize },
    #[error("Day index must be a positive integer, got {0}")]
    InvalidDayIndex(u32),
    #[error("Invalid time of day: {0:?} (expected HH:MM)")]
    InvalidTimeOfDay(String),
    #[error("Invalid month: {0}. Must be between 1 and 12")]
    InvalidMonth(u32),
}

pub type PlannerResult<T> = Result<T, PlannerError>;
