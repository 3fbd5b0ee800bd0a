//! 路由通道（RoutingChannel）
//!
//! 按 `RoutingRule` 有选择地把事件转发到多个通道：规则命中则发布到对应通道。
//! 自身也实现 `EventChannel`，因此路由可以嵌套。订阅不会自动委托，
//! 需要直接在被包装的通道上建立。
//!
use crate::event::EventEnvelope;
use crate::eventing::EventChannel;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// 路由规则：对事件的纯谓词
pub trait RoutingRule: Send + Sync {
    fn applies_to(&self, event: &EventEnvelope) -> bool;
}

impl<F> RoutingRule for F
where
    F: Fn(&EventEnvelope) -> bool + Send + Sync,
{
    fn applies_to(&self, event: &EventEnvelope) -> bool {
        self(event)
    }
}

/// 按类型键匹配
#[derive(Clone, Debug)]
pub struct EventTypeRule {
    types: HashSet<String>,
}

impl EventTypeRule {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
        }
    }
}

impl RoutingRule for EventTypeRule {
    fn applies_to(&self, event: &EventEnvelope) -> bool {
        self.types.contains(event.event_type())
    }
}

/// 匹配所有事件
#[derive(Clone, Copy, Debug, Default)]
pub struct AnyEvent;

impl RoutingRule for AnyEvent {
    fn applies_to(&self, _event: &EventEnvelope) -> bool {
        true
    }
}

struct Route {
    rule: Box<dyn RoutingRule>,
    channel: Arc<dyn EventChannel>,
}

#[derive(Default)]
pub struct RoutingChannel {
    routes: Vec<Route>,
}

impl RoutingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_route<R>(&mut self, rule: R, channel: Arc<dyn EventChannel>)
    where
        R: RoutingRule + 'static,
    {
        self.routes.push(Route {
            rule: Box::new(rule),
            channel,
        });
    }

    pub fn with_route<R>(mut self, rule: R, channel: Arc<dyn EventChannel>) -> Self
    where
        R: RoutingRule + 'static,
    {
        self.add_route(rule, channel);
        self
    }

    pub fn routes(&self) -> usize {
        self.routes.len()
    }
}

#[async_trait]
impl EventChannel for RoutingChannel {
    /// 转发到所有命中的通道（逐一尝试，不短路），任一接受即返回 true
    fn publish(&self, event: EventEnvelope) -> bool {
        let mut published = false;

        for route in &self.routes {
            if route.rule.applies_to(&event) {
                published |= route.channel.publish(event.clone());
            }
        }

        if !published {
            debug!(event_type = %event.event_type(), "no route accepted event");
        }
        published
    }

    async fn shutdown(&self) {
        for route in &self.routes {
            route.channel.shutdown().await;
        }
    }
}
