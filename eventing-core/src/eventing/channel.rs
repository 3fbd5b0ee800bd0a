//! 通道协议（EventChannel / SubscribableChannel）
//!
//! 定义发布、订阅与关闭的统一抽象。本地通道、路由通道以及对接外部消息系统的适配器
//! 都实现同一协议，因此可以被路由与目录统一对待、递归组合。
//!
use crate::event::{Event, EventEnvelope};
use crate::eventing::{Consumer, Subscription};
use async_trait::async_trait;
use std::sync::Arc;

/// 事件通道：发布与关闭
#[async_trait]
pub trait EventChannel: Send + Sync {
    /// 发布事件；被接受时返回 true，因非致命原因（类型不允许、已关闭）未发布时返回 false
    fn publish(&self, event: EventEnvelope) -> bool;

    /// 终止事件处理并释放资源；之后的发布被静默丢弃
    async fn shutdown(&self);

    /// 若该通道支持订阅，返回订阅视图
    fn as_subscribable(&self) -> Option<&dyn SubscribableChannel> {
        None
    }
}

/// 可订阅的事件通道
pub trait SubscribableChannel: EventChannel {
    fn subscribe(&self, consumer: Arc<dyn Consumer>) -> Subscription;

    /// 取消订阅；订阅不属于该通道时返回 false
    fn unsubscribe(&self, subscription: &Subscription) -> bool;
}

/// 便捷发布：直接传入事件，由此计算类型键并封装信封
pub trait EventChannelExt: EventChannel {
    fn publish_event<E: Event>(&self, event: E) -> bool {
        self.publish(EventEnvelope::new(event))
    }
}

impl<C: EventChannel + ?Sized> EventChannelExt for C {}
