//! 派发循环（DispatchMonitor）
//!
//! 每个通道一个长驻任务，状态机如下：
//! - 等待：队列为空时等待唤醒（入队/关闭）或 `poll_delay` 超时兜底；
//! - 排空：循环出队直到为空，每个事件只查询一次注册表，
//!   对每个匹配的消费者在工作池上独立、异步地执行 `consume`；
//! - 关闭：取消令牌触发后完成当前这一轮排空，清空注册表并退出。
//!
//! 消费者返回错误或 panic 时在派发点捕获并记录，再按通道级 `RetryPolicy` 决定是否重投。
//!
use crate::error::{EventingError, EventingResult};
use crate::eventing::queue::Delivery;
use crate::eventing::{
    Consumer, EventQueue, HandlerRegistry, RetryPolicy, Subscription, SubscriptionId, WorkerPool,
};
use futures_util::FutureExt;
use std::any::Any;
use std::future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// 派发循环的运行参数
pub(crate) struct MonitorOptions {
    pub channel: String,
    pub poll_delay: Duration,
    pub retry_policy: RetryPolicy,
    pub max_redeliveries: Option<u32>,
    pub pool: WorkerPool,
}

struct MonitorState {
    channel: String,
    poll_delay: Duration,
    max_redeliveries: Option<u32>,
    queue: Arc<EventQueue>,
    registry: Mutex<HandlerRegistry>,
    retry_policy: RwLock<RetryPolicy>,
    pool: WorkerPool,
}

pub struct DispatchMonitor {
    state: Arc<MonitorState>,
    token: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl DispatchMonitor {
    /// 在当前 tokio 运行时上启动派发循环
    pub(crate) fn start(
        queue: Arc<EventQueue>,
        registry: HandlerRegistry,
        options: MonitorOptions,
    ) -> EventingResult<Self> {
        let runtime = Handle::try_current().map_err(|_| EventingError::NoRuntime)?;

        let state = Arc::new(MonitorState {
            channel: options.channel,
            poll_delay: options.poll_delay,
            max_redeliveries: options.max_redeliveries,
            queue,
            registry: Mutex::new(registry),
            retry_policy: RwLock::new(options.retry_policy),
            pool: options.pool,
        });
        let token = CancellationToken::new();
        let task = runtime.spawn(Self::run(state.clone(), token.clone()));

        Ok(Self {
            state,
            token,
            task: Mutex::new(Some(task)),
        })
    }

    pub fn register(&self, consumer: Arc<dyn Consumer>) -> Subscription {
        self.state.registry().register(consumer)
    }

    pub fn unregister(&self, id: &SubscriptionId) -> bool {
        self.state.registry().unregister(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.registry().len()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.state.retry_policy()
    }

    pub fn set_retry_policy(&self, policy: RetryPolicy) {
        *self
            .state
            .retry_policy
            .write()
            .unwrap_or_else(PoisonError::into_inner) = policy;
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// 通知派发循环退出并等待其结束；重复调用为空操作
    pub async fn shutdown(&self) {
        self.token.cancel();
        self.state.queue.wake();
        info!(channel = %self.state.channel, "event monitor notified for shutdown");

        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            if let Err(err) = task.await {
                error!(channel = %self.state.channel, error = %err, "event monitor task aborted");
            }
        }
    }

    async fn run(state: Arc<MonitorState>, token: CancellationToken) {
        info!(channel = %state.channel, "event monitor starting");

        while !token.is_cancelled() {
            if state.queue.is_empty() {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {}
                    _ = state.queue.notified() => {}
                    _ = Self::poll_timeout(state.poll_delay) => {}
                }
            }

            while let Some(delivery) = state.queue.dequeue() {
                if !Self::process(&state, &token, delivery).await {
                    break;
                }
            }
        }

        state.registry().clear();
        info!(channel = %state.channel, "event monitor exiting");
    }

    async fn poll_timeout(delay: Duration) {
        if delay.is_zero() {
            future::pending::<()>().await;
        } else {
            time::sleep(delay).await;
        }
    }

    /// 每个事件查询一次注册表，再把每个匹配的消费者作为独立任务提交到工作池
    ///
    /// 等待工作池空位时同时监听取消；取消后放弃尚未提交的派发并返回 false。
    async fn process(
        state: &Arc<MonitorState>,
        token: &CancellationToken,
        delivery: Delivery,
    ) -> bool {
        let matched = state
            .registry()
            .consumers_for(delivery.envelope().event_type());
        let target = delivery.target();

        debug!(
            channel = %state.channel,
            event_type = %delivery.envelope().event_type(),
            event_id = %delivery.envelope().event_id(),
            attempt = delivery.attempt(),
            consumers = matched.len(),
            "processing event"
        );

        for subscription in matched.iter().filter(|s| target.accepts(s.id())) {
            let task = Self::invoke(state.clone(), subscription.clone(), delivery.clone());

            let accepted = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!(
                        channel = %state.channel,
                        event_type = %delivery.envelope().event_type(),
                        event_id = %delivery.envelope().event_id(),
                        "monitor cancelled while waiting for a worker; dispatch dropped"
                    );
                    return false;
                }
                accepted = state.pool.execute(task) => accepted,
            };

            if !accepted {
                warn!(
                    channel = %state.channel,
                    event_type = %delivery.envelope().event_type(),
                    consumer = %subscription.consumer().consumer_name(),
                    "worker pool saturated; dispatch dropped"
                );
            }
        }
        true
    }

    async fn invoke(state: Arc<MonitorState>, subscription: Subscription, delivery: Delivery) {
        let consumer = subscription.consumer();
        let outcome = AssertUnwindSafe(consumer.consume(delivery.envelope()))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => return,
            Ok(Err(e)) => {
                let err = EventingError::ConsumerFailed {
                    consumer: consumer.consumer_name().to_string(),
                    reason: format!("{e:#}"),
                };
                warn!(
                    channel = %state.channel,
                    event_type = %delivery.envelope().event_type(),
                    event_id = %delivery.envelope().event_id(),
                    attempt = delivery.attempt(),
                    error = %err,
                    "event consumer failed"
                );
            }
            Err(panic) => {
                let err = EventingError::ConsumerPanicked {
                    consumer: consumer.consumer_name().to_string(),
                    reason: panic_message(panic.as_ref()),
                };
                error!(
                    channel = %state.channel,
                    event_type = %delivery.envelope().event_type(),
                    event_id = %delivery.envelope().event_id(),
                    attempt = delivery.attempt(),
                    error = %err,
                    "event consumer panicked"
                );
            }
        }

        state.on_failure(subscription.id(), &delivery);
    }
}

impl MonitorState {
    fn registry(&self) -> MutexGuard<'_, HandlerRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn retry_policy(&self) -> RetryPolicy {
        *self
            .retry_policy
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn on_failure(&self, failed: SubscriptionId, delivery: &Delivery) {
        let next = match self.retry_policy() {
            RetryPolicy::Disabled => return,
            RetryPolicy::FailedConsumers => delivery.retry_for(failed),
            RetryPolicy::WholeEvent => delivery.retry_all(),
        };

        if let Some(max) = self.max_redeliveries {
            if next.attempt() > max {
                error!(
                    channel = %self.channel,
                    event_type = %delivery.envelope().event_type(),
                    event_id = %delivery.envelope().event_id(),
                    max_redeliveries = max,
                    "redelivery limit reached; event dropped"
                );
                return;
            }
        }

        if self.queue.redeliver(next) {
            warn!(
                channel = %self.channel,
                event_type = %delivery.envelope().event_type(),
                event_id = %delivery.envelope().event_id(),
                attempt = delivery.attempt() + 1,
                "re-publishing event"
            );
        } else {
            debug!(channel = %self.channel, "channel closed; redelivery dropped");
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
