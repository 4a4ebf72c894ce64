//! 이벤트 발행 타입 및 trait 정의.

use std::time::Duration;

use account_core::{EventType, LifecycleEvent, RabbitMqConfig};
use async_trait::async_trait;

/// 발행 작업용 Result 타입.
pub type PublishResult<T> = Result<T, PublishError>;

/// 이벤트 발행 에러.
///
/// 어떤 변형이든 호출자에게 반환되지만, 계정 변경 요청의 결과를 바꾸지는 않습니다.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("채널 열기 실패: {0}")]
    ChannelOpen(#[source] lapin::Error),

    #[error("큐 선언 실패: {0}")]
    QueueDeclare(#[source] lapin::Error),

    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("메시지 발행 실패: {0}")]
    Publish(#[source] lapin::Error),

    #[error("발행 시간 초과: {0:?}")]
    Timeout(Duration),

    #[error("브로커 사용 불가: {0}")]
    Unavailable(String),
}

/// 이벤트 발행기 trait.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// 이벤트를 지정한 큐로 한 번 발행합니다.
    ///
    /// 재시도나 확인(ack) 대기는 하지 않습니다.
    async fn publish(&self, queue: &str, event: &LifecycleEvent) -> PublishResult<()>;

    /// 브로커 연결이 살아있는지 확인합니다.
    fn is_connected(&self) -> bool;

    /// 발행기 이름을 반환합니다.
    fn name(&self) -> &str;
}

/// 이벤트 종류별 대상 큐 이름.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueNames {
    pub user_created: String,
    pub user_updated: String,
}

impl QueueNames {
    pub fn new(user_created: impl Into<String>, user_updated: impl Into<String>) -> Self {
        Self {
            user_created: user_created.into(),
            user_updated: user_updated.into(),
        }
    }

    pub fn from_config(config: &RabbitMqConfig) -> Self {
        Self::new(&config.user_create_queue, &config.user_update_queue)
    }

    /// 이벤트 종류에 해당하는 큐 이름.
    pub fn for_event(&self, event_type: EventType) -> &str {
        match event_type {
            EventType::UserCreated => &self.user_created,
            EventType::UserUpdated => &self.user_updated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_routing() {
        let queues = QueueNames::new("users.create", "users.update");

        assert_eq!(queues.for_event(EventType::UserCreated), "users.create");
        assert_eq!(queues.for_event(EventType::UserUpdated), "users.update");
    }
}
