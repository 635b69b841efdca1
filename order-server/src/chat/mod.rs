//! Chat 模块 - 对话式点餐状态引擎
//!
//! # 模块结构
//!
//! - [`dispatcher`] - turn 入口：加锁、解析意图、执行、写回
//! - [`actions`] - 每个意图一个处理器
//! - [`reconciler`] - 会话购物车 ↔ Draft 订单对账、提交
//! - [`reservation`] - 订座校验与分配
//! - [`session`] - 会话购物车存储和会话锁
//! - [`merge`] - 行项目身份与合并规则
//! - [`policy`] - 营业规则

pub mod actions;
pub mod dispatcher;
pub mod error;
pub mod merge;
pub mod policy;
pub mod reconciler;
pub mod reservation;
pub mod session;
pub mod traits;

pub use dispatcher::{IntentDispatcher, SessionSnapshot, TurnMeta, TurnReply};
pub use error::{ChatError, EngineError};
pub use policy::ChatPolicy;
pub use reconciler::{FlushReport, SubmittedOrder};
pub use session::{InMemorySessionStore, SessionKey, SessionStore};
pub use traits::ChatServices;
