//! 事件子系统（eventing）
//!
//! 提供事件发布/订阅与派发的协议与运行时：
//! - `EventQueue`：单通道的无界 FIFO；
//! - `HandlerRegistry`：按类型键缓存匹配结果的消费者注册表；
//! - `DispatchMonitor`：排空队列、扇出到匹配消费者的长驻循环，负责重投策略；
//! - `WorkerPool`：有界并发执行池；
//! - `LocalChannel`：进程内通道门面；`RoutingChannel`：按规则分流到多个通道。
//!
pub mod channel;
pub mod config;
pub mod consumer;
pub mod local;
pub mod monitor;
pub mod queue;
pub mod registry;
pub mod routing;
pub mod subscription;
pub mod worker_pool;

pub use channel::{EventChannel, EventChannelExt, SubscribableChannel};
pub use config::{ChannelConfig, ChannelSettings, DEFAULT_POLL_DELAY, RetryPolicy};
pub use consumer::{ConsumedTypes, Consumer};
pub use local::LocalChannel;
pub use monitor::DispatchMonitor;
pub use queue::{Delivery, DeliveryTarget, EventQueue};
pub use registry::HandlerRegistry;
pub use routing::{AnyEvent, EventTypeRule, RoutingChannel, RoutingRule};
pub use subscription::{Subscription, SubscriptionId};
pub use worker_pool::{DEFAULT_MAX_WORKERS, SaturationPolicy, WorkerPool};
