use eventing_core::event::Event;

#[derive(Event)]
#[event(event_type = "account")]
enum AccountEvent {
    Opened { owner: String },
    #[event(event_type = "account.closed")]
    Closed,
}

fn main() {
    let opened = AccountEvent::Opened {
        owner: "ada".into(),
    };
    assert_eq!(opened.event_type(), "account");
    assert_eq!(AccountEvent::Closed.event_type(), "account.closed");
}
