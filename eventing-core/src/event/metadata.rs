use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 元数据
#[derive(Builder, Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    #[builder(default = Uuid::new_v4())]
    event_id: Uuid,
    event_type: String,
    payload_type: String,
    #[builder(default = Utc::now())]
    occurred_at: DateTime<Utc>,
}

impl Metadata {
    pub fn event_id(&self) -> &Uuid {
        &self.event_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn payload_type(&self) -> &str {
        &self.payload_type
    }

    pub fn occurred_at(&self) -> &DateTime<Utc> {
        &self.occurred_at
    }
}
