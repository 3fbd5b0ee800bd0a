use crate::eventing::Consumer;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// 订阅标识
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 订阅句柄：`subscribe` 的返回值，仅用于 `unsubscribe`
///
/// 持有消费者的共享引用而非副本。
#[derive(Clone)]
pub struct Subscription {
    id: SubscriptionId,
    consumer: Arc<dyn Consumer>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, consumer: Arc<dyn Consumer>) -> Self {
        Self { id, consumer }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn consumer(&self) -> &Arc<dyn Consumer> {
        &self.consumer
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("consumer", &self.consumer.consumer_name())
            .finish()
    }
}
