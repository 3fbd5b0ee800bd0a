use eventing_core::error::EventingError;

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum DirectoryError {
    #[error("eventing: {0}")]
    Eventing(#[from] EventingError),

    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    #[error("channel already registered: name={name}")]
    AlreadyRegistered { name: String },

    #[error("channel does not accept subscriptions: name={name}")]
    NotSubscribable { name: String },
}
