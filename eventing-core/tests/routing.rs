use async_trait::async_trait;
use eventing_core::event::{Event, EventEnvelope};
use eventing_core::eventing::{
    AnyEvent, ChannelConfig, ConsumedTypes, Consumer, EventChannel, EventChannelExt,
    EventTypeRule, LocalChannel, RoutingChannel,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time;

#[derive(Event)]
#[event(event_type = "A")]
struct EventA;

#[derive(Event)]
#[event(event_type = "B")]
struct EventB;

#[derive(Default)]
struct Counter {
    seen: AtomicUsize,
}

impl Counter {
    fn seen(&self) -> usize {
        self.seen.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Consumer for Counter {
    fn consumer_name(&self) -> &str {
        "counter"
    }

    fn consumed_types(&self) -> ConsumedTypes {
        ConsumedTypes::All
    }

    async fn consume(&self, _event: &EventEnvelope) -> anyhow::Result<()> {
        self.seen.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// 启动一个订阅全部事件的本地通道
fn counted_channel(name: &str) -> (Arc<LocalChannel>, Arc<Counter>) {
    let counter = Arc::new(Counter::default());
    let channel = LocalChannel::start(
        ChannelConfig::builder()
            .name(name)
            .consumers(vec![counter.clone() as Arc<dyn Consumer>])
            .build(),
    )
    .unwrap();
    (Arc::new(channel), counter)
}

async fn settle(cond: impl Fn() -> bool) {
    let _ = time::timeout(Duration::from_secs(3), async {
        while !cond() {
            time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    time::sleep(Duration::from_millis(150)).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn routes_by_event_type() {
    let (local, counter) = counted_channel("a-only");
    let router = RoutingChannel::new().with_route(EventTypeRule::new(["A"]), local.clone());

    for _ in 0..5 {
        assert!(router.publish_event(EventA));
        assert!(!router.publish_event(EventB));
    }
    settle(|| counter.seen() >= 5).await;

    assert_eq!(counter.seen(), 5);
    router.shutdown().await;
    assert!(local.is_shutdown());
}

#[tokio::test(flavor = "multi_thread")]
async fn publish_reports_any_accepting_route() {
    let (first, first_seen) = counted_channel("first");
    let (second, second_seen) = counted_channel("second");
    second.shutdown().await;

    let mut router = RoutingChannel::new();
    router.add_route(AnyEvent, first.clone());
    router.add_route(AnyEvent, second.clone());
    router.add_route(|_: &EventEnvelope| false, first.clone());
    assert_eq!(router.routes(), 3);

    // 关闭的通道拒绝，但另一条路由接受
    assert!(router.publish_event(EventA));
    settle(|| first_seen.seen() >= 1).await;

    assert_eq!(first_seen.seen(), 1);
    assert_eq!(second_seen.seen(), 0);
    router.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn routers_nest() {
    let (a_channel, a_seen) = counted_channel("a");
    let (b_channel, b_seen) = counted_channel("b");

    let inner = RoutingChannel::new().with_route(
        |event: &EventEnvelope| event.event_type() == "B",
        b_channel.clone(),
    );
    let outer = RoutingChannel::new()
        .with_route(EventTypeRule::new(["A"]), a_channel.clone())
        .with_route(AnyEvent, Arc::new(inner));

    assert!(outer.publish_event(EventA));
    assert!(outer.publish_event(EventB));
    settle(|| a_seen.seen() >= 1 && b_seen.seen() >= 1).await;

    assert_eq!(a_seen.seen(), 1);
    assert_eq!(b_seen.seen(), 1);
    assert!(outer.as_subscribable().is_none());
    outer.shutdown().await;
    assert!(a_channel.is_shutdown());
    assert!(b_channel.is_shutdown());
}

#[tokio::test]
async fn empty_router_accepts_nothing() {
    let router = RoutingChannel::default();
    assert!(!router.publish_event(EventA));
    router.shutdown().await;
}
