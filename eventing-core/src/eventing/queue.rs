//! 事件队列（EventQueue）
//!
//! 单个通道的无界 FIFO：任意发布线程并发 `enqueue`，由唯一的派发循环取出。
//! `enqueue` 从不阻塞；关闭后队列被清空，后续入队被静默丢弃。
//!
use crate::event::EventEnvelope;
use crate::eventing::SubscriptionId;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

/// 一次投递的目标范围
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryTarget {
    /// 所有类型匹配的消费者
    Matching,
    /// 仅限某个订阅（按消费者隔离的重投）
    Only(SubscriptionId),
}

impl DeliveryTarget {
    pub fn accepts(&self, id: SubscriptionId) -> bool {
        match self {
            Self::Matching => true,
            Self::Only(target) => *target == id,
        }
    }
}

/// 队列元素：事件信封 + 目标范围 + 已重投次数
#[derive(Clone, Debug)]
pub struct Delivery {
    envelope: EventEnvelope,
    target: DeliveryTarget,
    attempt: u32,
}

impl Delivery {
    pub(crate) fn first(envelope: EventEnvelope) -> Self {
        Self {
            envelope,
            target: DeliveryTarget::Matching,
            attempt: 0,
        }
    }

    /// 整个事件重新投递给所有匹配的消费者
    pub(crate) fn retry_all(&self) -> Self {
        Self {
            envelope: self.envelope.clone(),
            target: DeliveryTarget::Matching,
            attempt: self.attempt + 1,
        }
    }

    /// 仅向失败的订阅重新投递
    pub(crate) fn retry_for(&self, id: SubscriptionId) -> Self {
        Self {
            envelope: self.envelope.clone(),
            target: DeliveryTarget::Only(id),
            attempt: self.attempt + 1,
        }
    }

    pub fn envelope(&self) -> &EventEnvelope {
        &self.envelope
    }

    pub fn target(&self) -> DeliveryTarget {
        self.target
    }

    /// 已重投次数（首次投递为 0）
    pub fn attempt(&self) -> u32 {
        self.attempt
    }
}

#[derive(Debug, Default)]
pub struct EventQueue {
    items: Mutex<VecDeque<Delivery>>,
    closed: AtomicBool,
    notify: Notify,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 入队并唤醒派发循环；队列已关闭时返回 false
    pub fn enqueue(&self, envelope: EventEnvelope) -> bool {
        self.push(Delivery::first(envelope))
    }

    /// 重投：放回队尾
    pub(crate) fn redeliver(&self, delivery: Delivery) -> bool {
        self.push(delivery)
    }

    fn push(&self, delivery: Delivery) -> bool {
        {
            let mut items = self.lock();
            if self.closed.load(Ordering::Acquire) {
                return false;
            }
            items.push_back(delivery);
        }

        self.notify.notify_one();
        true
    }

    /// 非阻塞出队，空队列返回 `None`
    pub fn dequeue(&self) -> Option<Delivery> {
        self.lock().pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// 等待下一次唤醒（入队、关闭或显式 `wake`）
    pub async fn notified(&self) {
        self.notify.notified().await;
    }

    pub fn wake(&self) {
        self.notify.notify_one();
    }

    /// 关闭队列：清空待处理事件，此后入队为空操作
    pub fn close(&self) {
        {
            let mut items = self.lock();
            self.closed.store(true, Ordering::Release);
            items.clear();
        }

        self.notify.notify_one();
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Delivery>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
