//! 事件子系统统一错误定义
//!
//! 派发期的错误（消费者失败、panic）只在派发点记录并按重试策略处理，
//! 不会回传给发布者；这里的类型主要服务于构造期错误与失败记录。
//!
use thiserror::Error;

/// 统一错误类型
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EventingError {
    // --- 运行时 ---
    #[error("no tokio runtime available: channels must be started inside a runtime")]
    NoRuntime,

    // --- 消费者 ---
    #[error("consumer failed: consumer={consumer}, reason={reason}")]
    ConsumerFailed { consumer: String, reason: String },
    #[error("consumer panicked: consumer={consumer}, reason={reason}")]
    ConsumerPanicked { consumer: String, reason: String },

    // --- 配置 ---
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
}

impl EventingError {
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// 统一 Result 类型别名
pub type EventingResult<T> = Result<T, EventingError>;
