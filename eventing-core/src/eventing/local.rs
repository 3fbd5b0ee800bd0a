//! 本地通道（LocalChannel）
//!
//! 进程内的事件通道：组合 `EventQueue` + `DispatchMonitor` + `HandlerRegistry`，
//! 事件永远不会离开当前进程。
//!
use crate::error::EventingResult;
use crate::event::EventEnvelope;
use crate::eventing::monitor::MonitorOptions;
use crate::eventing::{
    ChannelConfig, Consumer, DispatchMonitor, EventChannel, EventQueue, RetryPolicy,
    SubscribableChannel, Subscription, SubscriptionId,
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

pub struct LocalChannel {
    name: String,
    queue: Arc<EventQueue>,
    monitor: DispatchMonitor,
    publishable_types: HashSet<String>,
    shut_down: AtomicBool,
}

impl LocalChannel {
    /// 按配置创建通道并启动其派发循环；必须在 tokio 运行时内调用
    pub fn start(config: ChannelConfig) -> EventingResult<Self> {
        let ChannelConfig {
            name,
            registry,
            poll_delay,
            retry_policy,
            max_redeliveries,
            publishable_types,
            worker_pool,
        } = config;

        let queue = Arc::new(EventQueue::new());
        let monitor = DispatchMonitor::start(
            queue.clone(),
            registry,
            MonitorOptions {
                channel: name.clone(),
                poll_delay,
                retry_policy,
                max_redeliveries,
                pool: worker_pool.unwrap_or_default(),
            },
        )?;

        Ok(Self {
            name,
            queue,
            monitor,
            publishable_types,
            shut_down: AtomicBool::new(false),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 该类型键是否允许在本通道发布
    pub fn can_publish(&self, event_type: &str) -> bool {
        self.publishable_types.is_empty() || self.publishable_types.contains(event_type)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.monitor.retry_policy()
    }

    pub fn set_retry_policy(&self, policy: RetryPolicy) {
        self.monitor.set_retry_policy(policy);
    }

    /// 队列中待派发的事件数
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.monitor.subscriber_count()
    }

    pub fn is_shutdown(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }
}

#[async_trait]
impl EventChannel for LocalChannel {
    fn publish(&self, event: EventEnvelope) -> bool {
        if self.is_shutdown() {
            debug!(
                channel = %self.name,
                event_type = %event.event_type(),
                "channel shut down; event dropped"
            );
            return false;
        }

        if !self.can_publish(event.event_type()) {
            debug!(
                channel = %self.name,
                event_type = %event.event_type(),
                "event type not publishable on this channel"
            );
            return false;
        }

        self.queue.enqueue(event)
    }

    async fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }

        self.queue.close();
        self.monitor.shutdown().await;
        info!(channel = %self.name, "channel shut down");
    }

    fn as_subscribable(&self) -> Option<&dyn SubscribableChannel> {
        Some(self)
    }
}

impl SubscribableChannel for LocalChannel {
    fn subscribe(&self, consumer: Arc<dyn Consumer>) -> Subscription {
        if self.is_shutdown() {
            debug!(
                channel = %self.name,
                consumer = %consumer.consumer_name(),
                "channel shut down; subscription ignored"
            );
            return Subscription::new(SubscriptionId::new(), consumer);
        }

        self.monitor.register(consumer)
    }

    fn unsubscribe(&self, subscription: &Subscription) -> bool {
        self.monitor.unregister(&subscription.id())
    }
}
