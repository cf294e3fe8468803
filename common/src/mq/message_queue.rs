//! 消息队列 - 基于 Redis Stream 的发布端
//!
//! 引擎只在事务提交后发布意图消息（order.created / order.paid 等），
//! 消费端独立部署，不在本服务范围内。

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::AppError;
use crate::redis::RedisUtil;

/// 消息结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message<T = serde_json::Value> {
    pub id: Option<String>,
    pub topic: String,
    pub payload: T,
    pub timestamp: i64,
}

impl<T> Message<T> {
    pub fn new(topic: impl Into<String>, payload: T) -> Self {
        Message {
            id: None,
            topic: topic.into(),
            payload,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

#[derive(Clone)]
pub struct MessageQueue {
    redis: Arc<RedisUtil>,
}

impl MessageQueue {
    pub fn new(redis: Arc<RedisUtil>) -> Self {
        MessageQueue { redis }
    }

    /// 发布消息到 stream（名称格式：mq:{topic}）
    pub async fn publish<T: Serialize>(&self, topic: &str, payload: &T) -> Result<(), AppError> {
        let msg = Message::new(topic, serde_json::to_value(payload)?);
        let body = serde_json::to_string(&msg)?;
        let stream = format!("mq:{}", topic);
        self.redis.xadd(&stream, &[("message", &body)]).await?;
        log::debug!("published to '{}': {}", topic, body);
        Ok(())
    }

    /// 发布但不让失败影响主流程（副作用意图，尽力而为）
    pub async fn publish_best_effort<T: Serialize>(&self, topic: &str, payload: &T) {
        if let Err(e) = self.publish(topic, payload).await {
            log::warn!("publish '{}' failed: {}", topic, e);
        }
    }
}
