//! Chat engine errors
//!
//! - [`ChatError`] - 单个意图处理失败。除 `Store` 外都可恢复，转成一句用户可读的回复
//! - [`EngineError`] - 整个 turn 失败（存储不可用 / 超时），交给调用方决定重试或致歉

use chrono::{NaiveDate, NaiveTime, Weekday};
use shared::error::{AppError, ErrorCode};
use shared::intent::IntentError;
use std::time::Duration;
use thiserror::Error;

use crate::db::StoreError;
use crate::pricing::PricingError;

#[derive(Debug, Clone, Error)]
pub enum ChatError {
    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("item not found: {0}")]
    ItemNotFound(String),

    #[error("replacement unavailable: {0}")]
    ReplacementUnavailable(String),

    #[error("order is empty")]
    EmptyOrder,

    #[error("unsupported delivery zone: {0}")]
    UnsupportedDeliveryZone(String),

    #[error("restaurant is closed on {0}")]
    ClosedDay(Weekday),

    #[error("invalid party size: {size} (allowed 1..={max})")]
    InvalidPartySize { size: i32, max: i32 },

    #[error("reservation date {0} is in the past")]
    PastDate(NaiveDate),

    #[error("slot {date} {time} is full")]
    SlotFull { date: NaiveDate, time: NaiveTime },

    #[error("{customer_name} already holds {date} {time}")]
    DuplicateReservation {
        customer_name: String,
        date: NaiveDate,
        time: NaiveTime,
    },

    #[error("quantity of {item} would exceed {max}")]
    QuantityLimit { item: String, max: i32 },

    #[error("malformed intent: {0}")]
    MalformedIntent(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ChatError {
    /// Validation failures become replies; only collaborator failures escape
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ChatError::Store(_))
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            ChatError::UserNotFound(_) => ErrorCode::UserNotFound,
            ChatError::ItemNotFound(_) => ErrorCode::ItemNotFound,
            ChatError::ReplacementUnavailable(_) => ErrorCode::ReplacementUnavailable,
            ChatError::EmptyOrder => ErrorCode::OrderEmpty,
            ChatError::UnsupportedDeliveryZone(_) => ErrorCode::UnsupportedDeliveryZone,
            ChatError::ClosedDay(_) => ErrorCode::RestaurantClosed,
            ChatError::InvalidPartySize { .. } => ErrorCode::InvalidPartySize,
            ChatError::PastDate(_) => ErrorCode::ReservationDateInPast,
            ChatError::SlotFull { .. } => ErrorCode::SlotFull,
            ChatError::DuplicateReservation { .. } => ErrorCode::DuplicateReservation,
            ChatError::QuantityLimit { .. } => ErrorCode::ValueOutOfRange,
            ChatError::MalformedIntent(_) => ErrorCode::MalformedIntent,
            ChatError::Store(StoreError::NotFound(_)) => ErrorCode::NotFound,
            ChatError::Store(StoreError::Database(_)) => ErrorCode::DatabaseError,
            ChatError::Store(StoreError::Internal(_)) => ErrorCode::InternalError,
        }
    }

    /// Sentence shown to the customer
    pub fn user_message(&self) -> String {
        match self {
            ChatError::UserNotFound(_) => {
                "I couldn't find your customer account, please sign in and try again.".to_string()
            }
            ChatError::ItemNotFound(what) => {
                format!("I couldn't find \"{what}\" on the menu or in your order.")
            }
            ChatError::ReplacementUnavailable(what) => {
                format!("Sorry, \"{what}\" is not available, so I kept your order as it was.")
            }
            ChatError::EmptyOrder => {
                "Your order is empty. Add something before submitting.".to_string()
            }
            ChatError::UnsupportedDeliveryZone(address) => {
                format!("Sorry, we don't deliver to \"{address}\" yet.")
            }
            ChatError::ClosedDay(day) => {
                format!("Sorry, the restaurant is closed on {day}. Please pick another day.")
            }
            ChatError::InvalidPartySize { max, .. } => {
                format!("We can seat parties of 1 to {max} people.")
            }
            ChatError::PastDate(date) => {
                format!("{date} has already passed. Please choose a future date.")
            }
            ChatError::SlotFull { date, time } => format!(
                "All tables are booked on {date} at {}. Please choose another time.",
                time.format("%H:%M")
            ),
            ChatError::DuplicateReservation {
                customer_name,
                date,
                time,
            } => format!(
                "{customer_name} already has a reservation on {date} at {}.",
                time.format("%H:%M")
            ),
            ChatError::QuantityLimit { item, max } => {
                format!("You can order at most {max} x {item} in one order.")
            }
            ChatError::MalformedIntent(reason) => {
                format!("I didn't understand that request ({reason}).")
            }
            ChatError::Store(_) => "Something went wrong, please try again.".to_string(),
        }
    }
}

impl From<PricingError> for ChatError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::UnsupportedDeliveryZone(address) => {
                ChatError::UnsupportedDeliveryZone(address)
            }
        }
    }
}

impl From<IntentError> for ChatError {
    fn from(err: IntentError) -> Self {
        ChatError::MalformedIntent(err.to_string())
    }
}

/// Turn-level failure (surfaced as a generic "operation failed")
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("store failure: {0}")]
    Store(#[from] StoreError),

    #[error("turn timed out after {0:?}")]
    Timeout(Duration),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ChatError> for EngineError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Store(e) => EngineError::Store(e),
            other => EngineError::Internal(other.to_string()),
        }
    }
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Store(e) => e.into(),
            other => AppError::with_message(other.error_code(), other.user_message()),
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Store(e) => e.into(),
            EngineError::Timeout(d) => {
                AppError::timeout(format!("Operation timed out after {} ms", d.as_millis()))
            }
            EngineError::Internal(msg) => AppError::internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverability() {
        assert!(ChatError::EmptyOrder.is_recoverable());
        assert!(ChatError::ClosedDay(Weekday::Fri).is_recoverable());
        assert!(!ChatError::Store(StoreError::Database("down".into())).is_recoverable());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ChatError::EmptyOrder.error_code(), ErrorCode::OrderEmpty);
        assert_eq!(
            ChatError::ClosedDay(Weekday::Fri).error_code(),
            ErrorCode::RestaurantClosed
        );
        assert_eq!(
            ChatError::from(PricingError::UnsupportedDeliveryZone("Hebron".into())).error_code(),
            ErrorCode::UnsupportedDeliveryZone
        );
    }

    #[test]
    fn test_intent_error_is_malformed() {
        let err = ChatError::from(IntentError::MissingKeyword);
        assert_eq!(err.error_code(), ErrorCode::MalformedIntent);
        assert!(err.user_message().contains("no keyword"));
    }

    #[test]
    fn test_user_message_formats_time() {
        let err = ChatError::SlotFull {
            date: NaiveDate::from_ymd_opt(2030, 3, 14).unwrap(),
            time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
        };
        assert!(err.user_message().contains("2030-03-14 at 19:00"));
    }

    #[test]
    fn test_engine_error_into_app_error() {
        let err: AppError = EngineError::Timeout(Duration::from_millis(5000)).into();
        assert_eq!(err.code, ErrorCode::TimeoutError);

        let err: AppError = EngineError::Store(StoreError::Database("locked".into())).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
