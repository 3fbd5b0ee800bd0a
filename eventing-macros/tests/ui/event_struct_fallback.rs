use eventing_core::event::Event;

#[derive(Event)]
struct Heartbeat;

#[derive(Event)]
struct Reading(f64);

fn main() {
    assert!(Heartbeat.event_type().ends_with("Heartbeat"));
    assert!(Reading(1.5).event_type().ends_with("Reading"));
}
