use crate::error::DirectoryError;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use eventing_core::event::EventEnvelope;
use eventing_core::eventing::{
    ChannelConfig, Consumer, EventChannel, LocalChannel, Subscription,
};
use std::sync::Arc;
use tracing::{debug, info};

/// 命名通道目录
/// - 以名称登记通道（本地、路由或外部适配器均可）
/// - 未知名称视为配置错误，以 `DirectoryError::UnknownChannel` 返回
/// - 不是全局单例：由应用创建并按需传递
#[derive(Default)]
pub struct ChannelDirectory {
    channels: DashMap<String, Arc<dyn EventChannel>>,
}

impl ChannelDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记通道；名称已存在时返回错误，原通道保持不变
    pub fn add_channel(
        &self,
        name: impl Into<String>,
        channel: Arc<dyn EventChannel>,
    ) -> Result<(), DirectoryError> {
        match self.channels.entry(name.into()) {
            Entry::Occupied(entry) => Err(DirectoryError::AlreadyRegistered {
                name: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                debug!(channel = %entry.key(), "channel registered");
                entry.insert(channel);
                Ok(())
            }
        }
    }

    /// 按配置启动本地通道，并以配置中的名称登记
    pub fn start_channel(
        &self,
        config: ChannelConfig,
    ) -> Result<Arc<LocalChannel>, DirectoryError> {
        match self.channels.entry(config.name().to_string()) {
            Entry::Occupied(entry) => Err(DirectoryError::AlreadyRegistered {
                name: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                let channel = Arc::new(LocalChannel::start(config)?);
                debug!(channel = %entry.key(), "local channel started");
                entry.insert(channel.clone());
                Ok(channel)
            }
        }
    }

    pub fn get_channel(&self, name: &str) -> Result<Arc<dyn EventChannel>, DirectoryError> {
        self.channels
            .get(name)
            .map(|c| c.value().clone())
            .ok_or_else(|| DirectoryError::UnknownChannel(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    /// 发布到指定通道
    pub fn publish_to(&self, name: &str, event: EventEnvelope) -> Result<bool, DirectoryError> {
        Ok(self.get_channel(name)?.publish(event))
    }

    /// 发布到所有通道；任一通道接受即返回 true
    pub fn publish(&self, event: EventEnvelope) -> bool {
        self.snapshot()
            .into_iter()
            .fold(false, |published, (_, channel)| {
                channel.publish(event.clone()) | published
            })
    }

    /// 在指定通道上订阅
    pub fn subscribe(
        &self,
        name: &str,
        consumer: Arc<dyn Consumer>,
    ) -> Result<Subscription, DirectoryError> {
        let channel = self.get_channel(name)?;
        let subscribable = channel
            .as_subscribable()
            .ok_or_else(|| DirectoryError::NotSubscribable {
                name: name.to_string(),
            })?;
        Ok(subscribable.subscribe(consumer))
    }

    /// 在所有可订阅的通道上订阅同一消费者
    pub fn subscribe_all(&self, consumer: Arc<dyn Consumer>) -> Vec<(String, Subscription)> {
        self.snapshot()
            .into_iter()
            .filter_map(|(name, channel)| {
                let subscription = channel.as_subscribable()?.subscribe(consumer.clone());
                Some((name, subscription))
            })
            .collect()
    }

    pub fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// 关闭并移除所有通道
    pub async fn shutdown(&self) {
        let names = self.channel_names();
        for name in names {
            // 移出后再等待，不跨 await 持有分片锁
            let Some((name, channel)) = self.channels.remove(&name) else {
                continue;
            };
            channel.shutdown().await;
            info!(channel = %name, "channel removed from directory");
        }
    }

    // 复制出当前的通道列表，调用通道方法时不持有 DashMap 的锁
    fn snapshot(&self) -> Vec<(String, Arc<dyn EventChannel>)> {
        self.channels
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }
}
