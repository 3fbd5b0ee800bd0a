//! 进程内事件发布/订阅引擎（eventing-core）
//!
//! 发布者把任意类型的事件推入通道；后台派发循环按类型键匹配动态注册的消费者，
//! 并在有界工作池上并发调用；失败时可按通道级策略重投。
//!
//! - 事件模型（`event`）：`Event` 类型键与 `EventEnvelope`
//! - 事件系统（`eventing`）：队列、消费者注册表、派发循环、工作池、
//!   本地通道 `LocalChannel` 与按规则分流的 `RoutingChannel`
//! - 统一错误（`error`）
//!
//! 典型用法：
//! 1. 为事件实现 `Event`（或 `#[derive(Event)]`），为处理逻辑实现 `Consumer`；
//! 2. 用 `ChannelConfig::builder()` 描述通道，`LocalChannel::start` 启动；
//! 3. `publish_event(...)` 发布；结束时 `shutdown().await`。
//!
pub mod error;
pub mod event;
pub mod eventing;

// 允许在本 crate 内部通过 ::eventing_core 进行自引用，
// 以便派生宏在本 crate 的单元测试中也能解析到 ::eventing_core 路径。
extern crate self as eventing_core;
