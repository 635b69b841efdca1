//! Intent 模块 - 对话意图的类型化表示
//!
//! 外部模型给出的 [`IntentPayload`] 是松散的 JSON，本模块把它收敛为封闭的
//! [`Intent`] 枚举：关键字解析 + 必填字段校验只发生在这里，
//! 下游处理器拿到的永远是结构完整的意图。
//!
//! ```
//! use shared::intent::{Intent, IntentPayload};
//!
//! let payload = IntentPayload::keyword("Show-Summary");
//! let intent = Intent::try_from(payload).unwrap();
//! assert_eq!(intent, Intent::ShowSummary);
//! ```

mod payload;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use payload::{IngredientFilter, IntentPayload, RequestedItem, ReservationRequest};

/// Recognized intent keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Add,
    Remove,
    Replace,
    UpdateQuantity,
    ShowSummary,
    Submit,
    Cancel,
    Reserve,
    History,
    FilteredMenu,
}

impl IntentKind {
    /// Parse a model-provided keyword
    ///
    /// 大小写不敏感，`-` / 空格等同于 `_`，接受少量常见别名。
    pub fn parse(keyword: &str) -> Option<Self> {
        let key: String = keyword
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect();

        let kind = match key.as_str() {
            "add" | "add_item" | "add_items" | "add_to_cart" | "order" => Self::Add,
            "remove" | "remove_item" | "delete" | "delete_item" => Self::Remove,
            "replace" | "replace_item" | "swap" => Self::Replace,
            "update_quantity" | "set_quantity" | "change_quantity" => Self::UpdateQuantity,
            "show_summary" | "summary" | "show_cart" | "cart" => Self::ShowSummary,
            "submit" | "submit_order" | "confirm" | "checkout" => Self::Submit,
            "cancel" | "cancel_order" => Self::Cancel,
            "reserve" | "reservation" | "book_table" => Self::Reserve,
            "history" | "order_history" => Self::History,
            "filtered_menu" | "filter_menu" | "menu" => Self::FilteredMenu,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Replace => "replace",
            Self::UpdateQuantity => "update_quantity",
            Self::ShowSummary => "show_summary",
            Self::Submit => "submit",
            Self::Cancel => "cancel",
            Self::Reserve => "reserve",
            Self::History => "history",
            Self::FilteredMenu => "filtered_menu",
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated reservation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationSpec {
    /// Falls back to the user's profile name when absent
    pub customer_name: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub party_size: i32,
}

/// Closed set of chat intents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    Add {
        items: Vec<RequestedItem>,
    },
    Remove {
        target: String,
    },
    Replace {
        target: String,
        replacement: RequestedItem,
    },
    UpdateQuantity {
        target: String,
        quantity: i32,
    },
    ShowSummary,
    Submit {
        delivery_address: Option<String>,
        customer_name: Option<String>,
        phone_number: Option<String>,
    },
    Cancel,
    Reserve(ReservationSpec),
    History {
        limit: Option<u32>,
    },
    FilteredMenu(IngredientFilter),
}

impl Intent {
    pub fn kind(&self) -> IntentKind {
        match self {
            Intent::Add { .. } => IntentKind::Add,
            Intent::Remove { .. } => IntentKind::Remove,
            Intent::Replace { .. } => IntentKind::Replace,
            Intent::UpdateQuantity { .. } => IntentKind::UpdateQuantity,
            Intent::ShowSummary => IntentKind::ShowSummary,
            Intent::Submit { .. } => IntentKind::Submit,
            Intent::Cancel => IntentKind::Cancel,
            Intent::Reserve(_) => IntentKind::Reserve,
            Intent::History { .. } => IntentKind::History,
            Intent::FilteredMenu(_) => IntentKind::FilteredMenu,
        }
    }
}

/// Payload → Intent 校验失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    #[error("payload has no keyword")]
    MissingKeyword,

    #[error("unrecognized keyword: {0}")]
    UnknownKeyword(String),

    #[error("{keyword} requires field `{field}`")]
    MissingField {
        keyword: IntentKind,
        field: &'static str,
    },

    #[error("invalid value for `{field}`: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Upper bound for one cart line's quantity
pub const MAX_LINE_QUANTITY: i32 = 99;

fn check_quantity(field: &'static str, quantity: Option<i32>) -> Result<(), IntentError> {
    match quantity {
        Some(q) if q > MAX_LINE_QUANTITY => Err(IntentError::InvalidField {
            field,
            value: q.to_string(),
        }),
        _ => Ok(()),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_date(raw: &str) -> Result<NaiveDate, IntentError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| IntentError::InvalidField {
        field: "reservation.date",
        value: raw.to_string(),
    })
}

fn parse_time(raw: &str) -> Result<NaiveTime, IntentError> {
    let raw_trimmed = raw.trim();
    NaiveTime::parse_from_str(raw_trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw_trimmed, "%H:%M:%S"))
        .map_err(|_| IntentError::InvalidField {
            field: "reservation.time",
            value: raw.to_string(),
        })
}

impl TryFrom<IntentPayload> for Intent {
    type Error = IntentError;

    fn try_from(payload: IntentPayload) -> Result<Self, Self::Error> {
        let keyword = non_blank(payload.keyword).ok_or(IntentError::MissingKeyword)?;
        let kind =
            IntentKind::parse(&keyword).ok_or_else(|| IntentError::UnknownKeyword(keyword))?;

        let missing = |field| IntentError::MissingField {
            keyword: kind,
            field,
        };

        let intent = match kind {
            IntentKind::Add => {
                if payload.items.is_empty() {
                    return Err(missing("items"));
                }
                for item in &payload.items {
                    check_quantity("items.quantity", item.quantity)?;
                }
                Intent::Add {
                    items: payload.items,
                }
            }
            IntentKind::Remove => Intent::Remove {
                target: non_blank(payload.target_item_name)
                    .ok_or_else(|| missing("targetItemName"))?,
            },
            IntentKind::Replace => {
                let target =
                    non_blank(payload.target_item_name).ok_or_else(|| missing("targetItemName"))?;
                let replacement = payload
                    .replacement_item
                    .ok_or_else(|| missing("replacementItem"))?;
                check_quantity("replacementItem.quantity", replacement.quantity)?;
                Intent::Replace {
                    target,
                    replacement,
                }
            }
            IntentKind::UpdateQuantity => {
                let target =
                    non_blank(payload.target_item_name).ok_or_else(|| missing("targetItemName"))?;
                let quantity = payload
                    .new_quantity
                    .ok_or_else(|| missing("newQuantity"))?;
                check_quantity("newQuantity", Some(quantity))?;
                Intent::UpdateQuantity { target, quantity }
            }
            IntentKind::ShowSummary => Intent::ShowSummary,
            IntentKind::Submit => Intent::Submit {
                delivery_address: non_blank(payload.delivery_address),
                customer_name: non_blank(payload.customer_name),
                phone_number: non_blank(payload.phone_number),
            },
            IntentKind::Cancel => Intent::Cancel,
            IntentKind::Reserve => {
                let req = payload.reservation.ok_or_else(|| missing("reservation"))?;
                let date = req.date.as_deref().ok_or_else(|| missing("reservation.date"))?;
                let time = req.time.as_deref().ok_or_else(|| missing("reservation.time"))?;
                Intent::Reserve(ReservationSpec {
                    customer_name: non_blank(req.customer_name)
                        .or_else(|| non_blank(payload.customer_name)),
                    date: parse_date(date)?,
                    time: parse_time(time)?,
                    party_size: req
                        .party_size
                        .ok_or_else(|| missing("reservation.partySize"))?,
                })
            }
            IntentKind::History => Intent::History {
                limit: payload.limit,
            },
            IntentKind::FilteredMenu => {
                Intent::FilteredMenu(payload.ingredient_filter.unwrap_or_default())
            }
        };

        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_aliases() {
        assert_eq!(IntentKind::parse("ADD"), Some(IntentKind::Add));
        assert_eq!(IntentKind::parse(" add-to-cart "), Some(IntentKind::Add));
        assert_eq!(
            IntentKind::parse("update quantity"),
            Some(IntentKind::UpdateQuantity)
        );
        assert_eq!(IntentKind::parse("checkout"), Some(IntentKind::Submit));
        assert_eq!(IntentKind::parse("dance"), None);
    }

    #[test]
    fn test_missing_keyword() {
        let err = Intent::try_from(IntentPayload::default()).unwrap_err();
        assert_eq!(err, IntentError::MissingKeyword);

        let err = Intent::try_from(IntentPayload::keyword("   ")).unwrap_err();
        assert_eq!(err, IntentError::MissingKeyword);
    }

    #[test]
    fn test_unknown_keyword() {
        let err = Intent::try_from(IntentPayload::keyword("sing")).unwrap_err();
        assert_eq!(err, IntentError::UnknownKeyword("sing".into()));
    }

    #[test]
    fn test_add_requires_items() {
        let err = Intent::try_from(IntentPayload::keyword("add")).unwrap_err();
        assert!(matches!(
            err,
            IntentError::MissingField { field: "items", .. }
        ));

        let payload = IntentPayload {
            items: vec![RequestedItem::named("Pizza", 2)],
            ..IntentPayload::keyword("add")
        };
        let intent = Intent::try_from(payload).unwrap();
        assert_eq!(intent.kind(), IntentKind::Add);
    }

    #[test]
    fn test_update_quantity_fields() {
        let payload = IntentPayload {
            target_item_name: Some(" Tea ".into()),
            new_quantity: Some(0),
            ..IntentPayload::keyword("update_quantity")
        };
        assert_eq!(
            Intent::try_from(payload).unwrap(),
            Intent::UpdateQuantity {
                target: "Tea".into(),
                quantity: 0
            }
        );
    }

    #[test]
    fn test_quantity_upper_bound() {
        let payload = IntentPayload {
            items: vec![
                RequestedItem::named("Pizza", 2),
                RequestedItem::named("Tea", i32::MAX),
            ],
            ..IntentPayload::keyword("add")
        };
        assert_eq!(
            Intent::try_from(payload).unwrap_err(),
            IntentError::InvalidField {
                field: "items.quantity",
                value: i32::MAX.to_string()
            }
        );

        let payload = IntentPayload {
            target_item_name: Some("Tea".into()),
            new_quantity: Some(MAX_LINE_QUANTITY + 1),
            ..IntentPayload::keyword("update_quantity")
        };
        assert!(matches!(
            Intent::try_from(payload).unwrap_err(),
            IntentError::InvalidField { field: "newQuantity", .. }
        ));

        let payload = IntentPayload {
            target_item_name: Some("Pizza".into()),
            replacement_item: Some(RequestedItem::named("Tea", 1000)),
            ..IntentPayload::keyword("replace")
        };
        assert!(matches!(
            Intent::try_from(payload).unwrap_err(),
            IntentError::InvalidField { field: "replacementItem.quantity", .. }
        ));

        let payload = IntentPayload {
            items: vec![RequestedItem::named("Pizza", MAX_LINE_QUANTITY)],
            ..IntentPayload::keyword("add")
        };
        assert!(Intent::try_from(payload).is_ok());
    }

    #[test]
    fn test_reserve_parses_date_and_time() {
        let payload = IntentPayload {
            customer_name: Some("Lina".into()),
            reservation: Some(ReservationRequest {
                customer_name: None,
                date: Some("2030-03-14".into()),
                time: Some("19:30:00".into()),
                party_size: Some(4),
            }),
            ..IntentPayload::keyword("reserve")
        };
        let Intent::Reserve(spec) = Intent::try_from(payload).unwrap() else {
            panic!("expected reserve");
        };
        assert_eq!(spec.customer_name.as_deref(), Some("Lina"));
        assert_eq!(spec.date, NaiveDate::from_ymd_opt(2030, 3, 14).unwrap());
        assert_eq!(spec.time, NaiveTime::from_hms_opt(19, 30, 0).unwrap());
        assert_eq!(spec.party_size, 4);
    }

    #[test]
    fn test_reserve_rejects_bad_date() {
        let payload = IntentPayload {
            reservation: Some(ReservationRequest {
                date: Some("14/03/2030".into()),
                time: Some("19:30".into()),
                party_size: Some(2),
                ..Default::default()
            }),
            ..IntentPayload::keyword("reserve")
        };
        assert!(matches!(
            Intent::try_from(payload).unwrap_err(),
            IntentError::InvalidField {
                field: "reservation.date",
                ..
            }
        ));
    }

    #[test]
    fn test_submit_blank_address_is_none() {
        let payload = IntentPayload {
            delivery_address: Some("  ".into()),
            ..IntentPayload::keyword("submit")
        };
        assert_eq!(
            Intent::try_from(payload).unwrap(),
            Intent::Submit {
                delivery_address: None,
                customer_name: None,
                phone_number: None
            }
        );
    }
}
