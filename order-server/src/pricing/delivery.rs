//! Delivery zone table
//!
//! 唯一的配送区域表：提交订单、费用预览、历史订单投影都走这里。
//! 地址规范化（trim + 小写）后按优先级做子串匹配，第一个命中的区域生效。

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Address sentinel meaning "no address given yet"
pub const UNSET_ADDRESS: &str = "not set";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    #[error("unsupported delivery zone: {0}")]
    UnsupportedDeliveryZone(String),
}

/// One fee bracket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryZone {
    pub name: String,
    /// Matched as substrings of the normalized address
    pub keywords: Vec<String>,
    pub fee: f64,
}

impl DeliveryZone {
    pub fn new(name: &str, keywords: &[&str], fee: f64) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            fee,
        }
    }

    fn matches(&self, normalized_address: &str) -> bool {
        self.keywords.iter().any(|k| {
            let k = k.trim().to_lowercase();
            !k.is_empty() && normalized_address.contains(&k)
        })
    }
}

/// Priority-ordered zone table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryZones {
    zones: Vec<DeliveryZone>,
}

impl Default for DeliveryZones {
    fn default() -> Self {
        Self {
            zones: vec![
                DeliveryZone::new("A", &["ramallah", "al-bireh"], 0.0),
                DeliveryZone::new("B", &["birzeit"], 7.0),
                DeliveryZone::new("C", &["nablus", "jerusalem"], 12.0),
            ],
        }
    }
}

fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

impl DeliveryZones {
    pub fn new(zones: Vec<DeliveryZone>) -> Self {
        Self { zones }
    }

    /// Parse a JSON array of `{name, keywords, fee}`
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let zones: Vec<DeliveryZone> = serde_json::from_str(json)?;
        Ok(Self::new(zones))
    }

    pub fn zones(&self) -> &[DeliveryZone] {
        &self.zones
    }

    /// Whether the address counts as "not provided"
    pub fn is_unset(address: &str) -> bool {
        let normalized = normalize_address(address);
        normalized.is_empty() || normalized == UNSET_ADDRESS
    }

    /// First zone whose keyword appears in the address
    pub fn zone_for(&self, address: &str) -> Option<&DeliveryZone> {
        let normalized = normalize_address(address);
        self.zones.iter().find(|z| z.matches(&normalized))
    }

    /// Fee for an address; blank / unset → 0, no zone → error
    pub fn delivery_fee(&self, address: &str) -> Result<f64, PricingError> {
        if Self::is_unset(address) {
            return Ok(0.0);
        }
        self.zone_for(address)
            .map(|z| z.fee)
            .ok_or_else(|| PricingError::UnsupportedDeliveryZone(address.trim().to_string()))
    }
}
