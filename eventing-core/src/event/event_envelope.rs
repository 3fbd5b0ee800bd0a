use chrono::{DateTime, Utc};
use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use super::event_trait::Event;
use super::metadata::Metadata;

/// 事件信封，包含事件载荷与元数据
///
/// 类型键在构造时计算一次并随事件携带，之后的订阅匹配只做字符串集合判断。
/// `Clone` 只复制引用计数：重投时放回队列的是同一份原始载荷。
#[derive(Clone)]
pub struct EventEnvelope {
    metadata: Arc<Metadata>,
    payload: Arc<dyn Any + Send + Sync>,
}

impl EventEnvelope {
    pub fn new<E: Event>(event: E) -> Self {
        Self::from_arc(Arc::new(event))
    }

    /// 复用已共享的事件载荷（不会复制事件本身）
    pub fn from_arc<E: Event>(event: Arc<E>) -> Self {
        let metadata = Metadata::builder()
            .event_type(event.event_type().into_owned())
            .payload_type(type_name::<E>().to_string())
            .build();

        Self {
            metadata: Arc::new(metadata),
            payload: event,
        }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn event_type(&self) -> &str {
        self.metadata.event_type()
    }

    pub fn event_id(&self) -> &Uuid {
        self.metadata.event_id()
    }

    pub fn payload_type(&self) -> &str {
        self.metadata.payload_type()
    }

    pub fn occurred_at(&self) -> &DateTime<Utc> {
        self.metadata.occurred_at()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.payload.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// 两个信封是否携带同一个事件对象
    pub fn same_event(&self, other: &EventEnvelope) -> bool {
        Arc::ptr_eq(&self.payload, &other.payload)
    }
}

impl fmt::Debug for EventEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEnvelope")
            .field("event_id", self.event_id())
            .field("event_type", &self.event_type())
            .field("payload_type", &self.payload_type())
            .field("occurred_at", self.occurred_at())
            .finish()
    }
}
