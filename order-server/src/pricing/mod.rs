//! Pricing
//!
//! - [`calculator`] - 小计 / 行合计 (Decimal 精度，实时菜单价)
//! - [`delivery`] - 配送区域与配送费

pub mod calculator;
pub mod delivery;

pub use calculator::{Quote, line_total, subtotal};
pub use delivery::{DeliveryZone, DeliveryZones, PricingError, UNSET_ADDRESS};
