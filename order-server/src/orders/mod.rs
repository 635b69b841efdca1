//! 订单模块
//!
//! - [`history`] - 历史订单投影（按当前菜单价重新计价）
//! - [`draft_sweeper`] - 过期 Draft 清理任务

pub mod draft_sweeper;
pub mod history;

pub use draft_sweeper::DraftSweeper;
pub use history::{OrderSummary, OrderSummaryLine};
