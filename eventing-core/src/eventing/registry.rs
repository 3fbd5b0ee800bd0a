//! 消费者注册表（HandlerRegistry）
//!
//! 维护全量消费者集合（保持注册顺序）与按类型键缓存的匹配结果：
//! - `consumers_for` 先查缓存，未命中时完整扫描一次并写入缓存；
//! - `register` / `unregister` 直接清空整个缓存，下次查询时惰性重建。
//!
use crate::eventing::{Consumer, Subscription, SubscriptionId};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct HandlerRegistry {
    consumers: Vec<Subscription>,
    by_type: HashMap<String, Arc<[Subscription]>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_consumers(consumers: impl IntoIterator<Item = Arc<dyn Consumer>>) -> Self {
        let mut registry = Self::new();
        for c in consumers {
            registry.register(c);
        }
        registry
    }

    /// 注册消费者；同一个 `Arc` 重复注册时返回已有订阅
    pub fn register(&mut self, consumer: Arc<dyn Consumer>) -> Subscription {
        if let Some(existing) = self
            .consumers
            .iter()
            .find(|s| Arc::ptr_eq(s.consumer(), &consumer))
        {
            return existing.clone();
        }

        let subscription = Subscription::new(SubscriptionId::new(), consumer);
        self.consumers.push(subscription.clone());
        self.by_type.clear();
        subscription
    }

    pub fn unregister(&mut self, id: &SubscriptionId) -> bool {
        let Some(pos) = self.consumers.iter().position(|s| s.id() == *id) else {
            return false;
        };

        self.consumers.remove(pos);
        self.by_type.clear();
        true
    }

    /// 返回声明了该类型键的消费者（按注册顺序）
    pub fn consumers_for(&mut self, event_type: &str) -> Arc<[Subscription]> {
        if let Some(hit) = self.by_type.get(event_type) {
            return hit.clone();
        }

        let matched: Arc<[Subscription]> = self
            .consumers
            .iter()
            .filter(|s| s.consumer().consumed_types().contains(event_type))
            .cloned()
            .collect();

        self.by_type.insert(event_type.to_string(), matched.clone());
        matched
    }

    pub fn contains(&self, id: &SubscriptionId) -> bool {
        self.consumers.iter().any(|s| s.id() == *id)
    }

    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }

    /// 当前已缓存的类型键数量
    pub fn cached_types(&self) -> usize {
        self.by_type.len()
    }

    pub fn clear(&mut self) {
        self.consumers.clear();
        self.by_type.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventEnvelope;
    use crate::eventing::ConsumedTypes;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Named {
        name: &'static str,
        types: ConsumedTypes,
        scans: AtomicUsize,
    }

    impl Named {
        fn new(name: &'static str, types: ConsumedTypes) -> Arc<Self> {
            Arc::new(Self {
                name,
                types,
                scans: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Consumer for Named {
        fn consumer_name(&self) -> &str {
            self.name
        }
        fn consumed_types(&self) -> ConsumedTypes {
            self.scans.fetch_add(1, Ordering::Relaxed);
            self.types.clone()
        }
        async fn consume(&self, _event: &EventEnvelope) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn names(list: &[Subscription]) -> Vec<String> {
        list.iter()
            .map(|s| s.consumer().consumer_name().to_string())
            .collect()
    }

    #[test]
    fn matches_by_type_in_registration_order() {
        let mut registry = HandlerRegistry::new();
        registry.register(Named::new("a", ConsumedTypes::one("Normal")));
        registry.register(Named::new("b", ConsumedTypes::many(["Other"])));
        registry.register(Named::new("c", ConsumedTypes::All));
        registry.register(Named::new("d", ConsumedTypes::many(["Normal", "Other"])));

        assert_eq!(names(&registry.consumers_for("Normal")), ["a", "c", "d"]);
        assert_eq!(names(&registry.consumers_for("Other")), ["b", "c", "d"]);
        assert_eq!(names(&registry.consumers_for("Unknown")), ["c"]);
    }

    #[test]
    fn lookup_is_cached_until_subscriptions_change() {
        let a = Named::new("a", ConsumedTypes::one("Normal"));
        let mut registry = HandlerRegistry::new();
        registry.register(a.clone());

        registry.consumers_for("Normal");
        registry.consumers_for("Normal");
        assert_eq!(a.scans.load(Ordering::Relaxed), 1);
        assert_eq!(registry.cached_types(), 1);

        let b = registry.register(Named::new("b", ConsumedTypes::one("Normal")));
        assert_eq!(registry.cached_types(), 0);
        assert_eq!(names(&registry.consumers_for("Normal")), ["a", "b"]);
        assert_eq!(a.scans.load(Ordering::Relaxed), 2);

        assert!(registry.unregister(&b.id()));
        assert_eq!(registry.cached_types(), 0);
        assert_eq!(names(&registry.consumers_for("Normal")), ["a"]);
        assert!(!registry.unregister(&b.id()));
    }

    #[test]
    fn registering_the_same_consumer_twice_is_idempotent() {
        let a = Named::new("a", ConsumedTypes::one("Normal"));
        let mut registry = HandlerRegistry::new();

        let first = registry.register(a.clone());
        let second = registry.register(a.clone());

        assert_eq!(first.id(), second.id());
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&first.id()));
    }

    #[test]
    fn clear_drops_consumers_and_cache() {
        let all: Arc<dyn Consumer> = Named::new("a", ConsumedTypes::All);
        let mut registry = HandlerRegistry::with_consumers([all]);
        registry.consumers_for("x");
        registry.clear();

        assert!(registry.is_empty());
        assert_eq!(registry.cached_types(), 0);
        assert!(registry.consumers_for("x").is_empty());
    }
}
