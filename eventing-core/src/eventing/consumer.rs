//! 事件消费者（Consumer）
//!
//! 定义消费某类/多类/全部事件的处理逻辑与元信息（名称、订阅类型）。
//!
use crate::event::EventEnvelope;
use async_trait::async_trait;

/// 消费者声明的类型键集合
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsumedTypes {
    One(String),
    Many(Vec<String>),
    All,
}

impl ConsumedTypes {
    pub fn one(event_type: impl Into<String>) -> Self {
        Self::One(event_type.into())
    }

    pub fn many<I, S>(event_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Many(event_types.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, event_type: &str) -> bool {
        match self {
            Self::One(t) => t == event_type,
            Self::Many(ts) => ts.iter().any(|t| t == event_type),
            Self::All => true,
        }
    }
}

/// 事件消费者：处理其声明类型的事件
#[async_trait]
pub trait Consumer: Send + Sync {
    /// 消费者名称（用于日志与失败记录）
    fn consumer_name(&self) -> &str;
    /// 返回该消费者关心的事件类型
    fn consumed_types(&self) -> ConsumedTypes;
    /// 处理事件；返回错误时由派发循环按通道的重试策略处理
    async fn consume(&self, event: &EventEnvelope) -> anyhow::Result<()>;
}
