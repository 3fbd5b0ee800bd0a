use eventing_core::event::Event;

#[derive(Event)]
#[event(event_type = "order.placed")]
struct OrderPlaced {
    order_id: u64,
}

fn main() {
    let event = OrderPlaced { order_id: 7 };
    assert_eq!(event.order_id, 7);
    assert_eq!(event.event_type(), "order.placed");
}
