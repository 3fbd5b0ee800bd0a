//! 事件（Event）与事件信封
//!
//! 定义事件载荷需要实现的最小接口（`Event`），以及在发布时一次性计算类型键、
//! 并与元数据一同封装的 `EventEnvelope`。

mod event_envelope;
mod event_trait;
mod metadata;

pub use event_envelope::EventEnvelope;
pub use event_trait::Event;
// 派生宏与 trait 同名，分属不同命名空间，一次导入即可同时使用
#[cfg(feature = "macros")]
pub use eventing_macros::Event;
pub use metadata::Metadata;
