use eventing_core::event::Event;

#[derive(Event)]
enum Shipment {
    #[event(event_type = "shipment.dispatched")]
    Dispatched { order_id: u64 },
    Delivered(u64),
    Lost,
}

fn main() {
    assert_eq!(
        Shipment::Dispatched { order_id: 1 }.event_type(),
        "shipment.dispatched"
    );
    assert_eq!(Shipment::Delivered(1).event_type(), "Shipment.Delivered");
    assert_eq!(Shipment::Lost.event_type(), "Shipment.Lost");
}
