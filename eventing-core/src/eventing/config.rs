//! 通道配置
//!
//! - `ChannelConfig`：不可变配置，由 `bon::Builder` 构建后交给 `LocalChannel::start` 一次性消费；
//! - `ChannelSettings`：可从 JSON 反序列化的标量配置子集，再与消费者列表组合为 `ChannelConfig`；
//! - `RetryPolicy`：通道级的失败重投策略。
//!
use crate::error::{EventingError, EventingResult};
use crate::eventing::worker_pool::DEFAULT_MAX_WORKERS;
use crate::eventing::{Consumer, HandlerRegistry, SaturationPolicy, WorkerPool};
use bon::Builder;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

// 导入由 bon::Builder 生成的 typestate 模块与状态转换别名
use self::channel_config_builder::{IsUnset, SetRegistry, State as BuilderState};

/// 派发循环空闲时的兜底轮询间隔
pub const DEFAULT_POLL_DELAY: Duration = Duration::from_millis(100);

/// 消费者失败后的重投策略（通道级，可在运行时切换）
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryPolicy {
    /// 只记录失败，不重投
    #[default]
    Disabled,
    /// 仅向失败的消费者重投该事件
    FailedConsumers,
    /// 把原始事件放回队尾，重新投递给所有匹配的消费者（包括已成功的）
    WholeEvent,
}

impl RetryPolicy {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

/// 本地通道配置
#[derive(Builder)]
pub struct ChannelConfig {
    /// 通道名称（用于日志）
    #[builder(into, default = String::from("local"))]
    pub(crate) name: String,
    #[builder(setters(vis = "pub(crate)"), default)]
    pub(crate) registry: HandlerRegistry,
    /// 队列为空时的最长等待；为零表示只依赖唤醒
    #[builder(default = DEFAULT_POLL_DELAY)]
    pub(crate) poll_delay: Duration,
    #[builder(default)]
    pub(crate) retry_policy: RetryPolicy,
    /// 单个事件的最大重投次数；缺省不限
    pub(crate) max_redeliveries: Option<u32>,
    /// 允许发布的类型键；为空表示全部允许
    #[builder(default)]
    pub(crate) publishable_types: HashSet<String>,
    /// 共享工作池；缺省为通道私有的有界池
    pub(crate) worker_pool: Option<WorkerPool>,
}

// 自定义 Builder 方法：接收消费者列表，内部转换为 HandlerRegistry 并设置到 registry 字段。
// 受 typestate 限制，仅当 `registry` 尚未设置时可调用。
impl<S: BuilderState> ChannelConfigBuilder<S> {
    pub fn consumers(
        self,
        consumers: Vec<Arc<dyn Consumer>>,
    ) -> ChannelConfigBuilder<SetRegistry<S>>
    where
        <S as BuilderState>::Registry: IsUnset,
    {
        self.registry(HandlerRegistry::with_consumers(consumers))
    }
}

impl ChannelConfig {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn poll_delay(&self) -> Duration {
        self.poll_delay
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    pub fn max_redeliveries(&self) -> Option<u32> {
        self.max_redeliveries
    }

    pub fn publishable_types(&self) -> &HashSet<String> {
        &self.publishable_types
    }

    pub fn consumer_count(&self) -> usize {
        self.registry.len()
    }
}

/// 可序列化的通道配置
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSettings {
    pub poll_delay_ms: u64,
    pub retry_policy: RetryPolicy,
    pub max_redeliveries: Option<u32>,
    pub publishable_types: HashSet<String>,
    pub max_workers: usize,
    pub saturation: SaturationPolicy,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            poll_delay_ms: DEFAULT_POLL_DELAY.as_millis() as u64,
            retry_policy: RetryPolicy::default(),
            max_redeliveries: None,
            publishable_types: HashSet::new(),
            max_workers: DEFAULT_MAX_WORKERS,
            saturation: SaturationPolicy::default(),
        }
    }
}

impl ChannelSettings {
    pub fn from_json(raw: &str) -> EventingResult<Self> {
        let settings: Self = serde_json::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> EventingResult<()> {
        if self.max_workers == 0 {
            return Err(EventingError::invalid_config("max_workers must be at least 1"));
        }
        if self.publishable_types.iter().any(|t| t.trim().is_empty()) {
            return Err(EventingError::invalid_config(
                "publishable_types must not contain blank type keys",
            ));
        }
        Ok(())
    }

    pub fn into_config(
        self,
        name: impl Into<String>,
        consumers: Vec<Arc<dyn Consumer>>,
    ) -> ChannelConfig {
        ChannelConfig::builder()
            .name(name)
            .consumers(consumers)
            .poll_delay(Duration::from_millis(self.poll_delay_ms))
            .retry_policy(self.retry_policy)
            .maybe_max_redeliveries(self.max_redeliveries)
            .publishable_types(self.publishable_types)
            .worker_pool(WorkerPool::new(self.max_workers, self.saturation))
            .build()
    }
}
