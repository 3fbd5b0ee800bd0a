/// 本地通道示例
/// 展示派生事件类型键、按类型订阅、运行时订阅、失败消费者的隔离重投以及按规则路由
use anyhow::Result as AnyResult;
use async_trait::async_trait;
use eventing_core::event::{Event, EventEnvelope};
use eventing_core::eventing::{
    ChannelConfig, ConsumedTypes, Consumer, EventChannel, EventChannelExt, EventTypeRule,
    LocalChannel, RetryPolicy, RoutingChannel, SubscribableChannel,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ============================================================================
// 事件
// ============================================================================

#[derive(Debug, Event)]
#[event(event_type = "order.placed")]
struct OrderPlaced {
    order_id: u32,
    amount: u64,
}

#[derive(Debug, Event)]
enum Shipment {
    #[event(event_type = "shipment.dispatched")]
    Dispatched { order_id: u32 },
    Delivered { order_id: u32 },
}

// ============================================================================
// 消费者
// ============================================================================

struct Billing;

#[async_trait]
impl Consumer for Billing {
    fn consumer_name(&self) -> &str {
        "billing"
    }

    fn consumed_types(&self) -> ConsumedTypes {
        ConsumedTypes::one("order.placed")
    }

    async fn consume(&self, event: &EventEnvelope) -> AnyResult<()> {
        if let Some(order) = event.downcast_ref::<OrderPlaced>() {
            println!("billing: charge {} for order #{}", order.amount, order.order_id);
        }
        Ok(())
    }
}

/// 前两次调用失败的仓储服务
struct Warehouse {
    outages: AtomicU32,
}

#[async_trait]
impl Consumer for Warehouse {
    fn consumer_name(&self) -> &str {
        "warehouse"
    }

    fn consumed_types(&self) -> ConsumedTypes {
        ConsumedTypes::one("order.placed")
    }

    async fn consume(&self, event: &EventEnvelope) -> AnyResult<()> {
        let down = self
            .outages
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if down {
            anyhow::bail!("warehouse unavailable");
        }
        println!("warehouse: reserve stock for event {}", event.event_id());
        Ok(())
    }
}

struct Tracker;

#[async_trait]
impl Consumer for Tracker {
    fn consumer_name(&self) -> &str {
        "tracker"
    }

    fn consumed_types(&self) -> ConsumedTypes {
        ConsumedTypes::many(["shipment.dispatched", "Shipment.Delivered"])
    }

    async fn consume(&self, event: &EventEnvelope) -> AnyResult<()> {
        match event.downcast_ref::<Shipment>() {
            Some(Shipment::Dispatched { order_id }) => println!("tracker: #{order_id} on its way"),
            Some(Shipment::Delivered { order_id }) => println!("tracker: #{order_id} delivered"),
            None => {}
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 订单通道：失败只重投给失败的消费者
    let orders = Arc::new(LocalChannel::start(
        ChannelConfig::builder()
            .name("orders")
            .consumers(vec![
                Arc::new(Billing) as Arc<dyn Consumer>,
                Arc::new(Warehouse {
                    outages: AtomicU32::new(2),
                }),
            ])
            .retry_policy(RetryPolicy::FailedConsumers)
            .max_redeliveries(5)
            .build(),
    )?);

    // 物流通道：启动后再订阅
    let shipping = Arc::new(LocalChannel::start(
        ChannelConfig::builder()
            .name("shipping")
            .poll_delay(Duration::ZERO)
            .build(),
    )?);
    let subscription = shipping.subscribe(Arc::new(Tracker));
    println!("tracker subscribed as {}", subscription.id());

    let router = RoutingChannel::new()
        .with_route(EventTypeRule::new(["order.placed"]), orders.clone())
        .with_route(
            |event: &EventEnvelope| {
                event.event_type().starts_with("shipment") || event.is::<Shipment>()
            },
            shipping.clone(),
        );

    router.publish_event(OrderPlaced {
        order_id: 42,
        amount: 1999,
    });
    router.publish_event(Shipment::Dispatched { order_id: 42 });
    router.publish_event(Shipment::Delivered { order_id: 42 });

    tokio::time::sleep(Duration::from_millis(300)).await;

    router.shutdown().await;
    println!("all channels shut down");
    Ok(())
}
