//! Tool-call payload (模型输出 → 结构化意图)
//!
//! 外部语言模型每轮对话产出一个 JSON 工具调用，反序列化为 [`IntentPayload`]。
//! 字段全部可选：模型输出不可靠，缺失字段在 [`Intent`](super::Intent) 解析阶段校验。

use serde::{Deserialize, Serialize};

/// Raw tool-call payload, one per chat turn
///
/// ```json
/// {
///   "keyword": "add",
///   "items": [{ "name": "Pizza", "quantity": 2, "extras": ["extra cheese"] }]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntentPayload {
    pub keyword: Option<String>,
    pub items: Vec<RequestedItem>,
    pub target_item_name: Option<String>,
    pub replacement_item: Option<RequestedItem>,
    pub new_quantity: Option<i32>,
    pub delivery_address: Option<String>,
    pub reservation: Option<ReservationRequest>,
    pub customer_name: Option<String>,
    pub phone_number: Option<String>,
    pub ingredient_filter: Option<IngredientFilter>,
    /// History page size
    pub limit: Option<u32>,
}

impl IntentPayload {
    /// Payload with only a keyword set
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            ..Default::default()
        }
    }
}

/// An item the customer asked for, by catalog id or by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestedItem {
    #[serde(alias = "id")]
    pub menu_item_id: Option<i64>,
    pub name: Option<String>,
    /// Defaults to 1
    pub quantity: Option<i32>,
    pub size: Option<String>,
    /// Customization extras ("no onions", "extra cheese")
    pub extras: Vec<String>,
    /// Free-text note, appended after the extras
    pub notes: Option<String>,
}

impl RequestedItem {
    /// Shortcut used by tests and seed scripts
    pub fn named(name: impl Into<String>, quantity: i32) -> Self {
        Self {
            name: Some(name.into()),
            quantity: Some(quantity),
            ..Default::default()
        }
    }

    /// Human-readable label for diagnostics
    pub fn label(&self) -> String {
        match (&self.name, self.menu_item_id) {
            (Some(name), _) if !name.trim().is_empty() => name.trim().to_string(),
            (_, Some(id)) => format!("#{id}"),
            _ => "(unnamed item)".to_string(),
        }
    }
}

/// Reservation details as emitted by the model
///
/// Date/time stay strings here; the model is loose with formats
/// ("19:00" vs "19:00:00"), parsing happens in [`Intent`](super::Intent).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReservationRequest {
    pub customer_name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub party_size: Option<i32>,
}

/// Include / exclude ingredient predicate for the filtered menu
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IngredientFilter {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl IngredientFilter {
    /// Whether free text satisfies the filter (case-insensitive substring)
    pub fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        let has = |needle: &String| {
            let needle = needle.trim().to_lowercase();
            !needle.is_empty() && text.contains(&needle)
        };
        self.include
            .iter()
            .filter(|i| !i.trim().is_empty())
            .all(has)
            && !self.exclude.iter().any(has)
    }

    pub fn is_empty(&self) -> bool {
        self.include.iter().all(|i| i.trim().is_empty())
            && self.exclude.iter().all(|e| e.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case_payload() {
        let json = r#"{
            "keyword": "replace",
            "targetItemName": "Kebab",
            "replacementItem": { "id": 4, "quantity": 2 },
            "newQuantity": 3
        }"#;
        let payload: IntentPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.keyword.as_deref(), Some("replace"));
        assert_eq!(payload.target_item_name.as_deref(), Some("Kebab"));
        assert_eq!(payload.replacement_item.unwrap().menu_item_id, Some(4));
        assert_eq!(payload.new_quantity, Some(3));
        assert!(payload.items.is_empty());
    }

    #[test]
    fn test_empty_object_is_valid_payload() {
        let payload: IntentPayload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload, IntentPayload::default());
    }

    #[test]
    fn test_ingredient_filter() {
        let filter = IngredientFilter {
            include: vec!["Chicken".into()],
            exclude: vec!["garlic".into(), " ".into()],
        };
        assert!(filter.matches("Grilled chicken with rice"));
        assert!(!filter.matches("Chicken shawarma, garlic sauce"));
        assert!(!filter.matches("Falafel wrap"));
        assert!(IngredientFilter::default().matches("anything"));
        assert!(IngredientFilter::default().is_empty());
    }

    #[test]
    fn test_requested_item_label() {
        assert_eq!(RequestedItem::named(" Tea ", 1).label(), "Tea");
        let by_id = RequestedItem {
            menu_item_id: Some(9),
            ..Default::default()
        };
        assert_eq!(by_id.label(), "#9");
    }
}
