//! 요청 경로와 분리된 이벤트 발행.
//!
//! 계정 변경이 이미 성공한 뒤에 호출되므로, 발행 실패는 API 응답에 영향을 주지 않습니다.
//! 감독 정책은 로그 후 폐기이며 재시도나 outbox는 없습니다.

use std::sync::Arc;
use std::time::Duration;

use account_core::{LifecycleEvent, RabbitMqConfig};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::types::{EventPublisher, PublishError, PublishResult, QueueNames};

/// 생명주기 이벤트 디스패처.
#[derive(Clone)]
pub struct EventDispatcher {
    publisher: Arc<dyn EventPublisher>,
    queues: QueueNames,
    timeout: Option<Duration>,
}

impl EventDispatcher {
    /// 새 디스패처를 생성합니다. 기본적으로 발행 시간 제한은 없습니다.
    pub fn new(publisher: Arc<dyn EventPublisher>, queues: QueueNames) -> Self {
        Self {
            publisher,
            queues,
            timeout: None,
        }
    }

    /// RabbitMQ 설정의 큐 이름과 발행 시간 제한을 사용합니다.
    pub fn from_config(publisher: Arc<dyn EventPublisher>, config: &RabbitMqConfig) -> Self {
        Self::new(publisher, QueueNames::from_config(config))
            .with_timeout(config.publish_timeout_secs.map(Duration::from_secs))
    }

    /// 분리된 발행 작업의 상한 시간을 설정합니다.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// 현재 발행기.
    pub fn publisher(&self) -> &Arc<dyn EventPublisher> {
        &self.publisher
    }

    /// 큐 이름 설정.
    pub fn queues(&self) -> &QueueNames {
        &self.queues
    }

    /// 이벤트를 별도 태스크에서 발행합니다.
    ///
    /// 반환된 핸들은 보통 버려집니다. 실패는 태스크 안에서 경고 로그로 남깁니다.
    pub fn dispatch(&self, event: LifecycleEvent) -> JoinHandle<PublishResult<()>> {
        let publisher = Arc::clone(&self.publisher);
        let queue = self.queues.for_event(event.event_type).to_string();
        let timeout = self.timeout;

        tokio::spawn(async move {
            let outcome = match timeout {
                Some(limit) => tokio::time::timeout(limit, publisher.publish(&queue, &event))
                    .await
                    .unwrap_or(Err(PublishError::Timeout(limit))),
                None => publisher.publish(&queue, &event).await,
            };

            match &outcome {
                Ok(()) => debug!(
                    publisher = publisher.name(),
                    queue = %queue,
                    event_type = %event.event_type,
                    user_id = event.payload.id,
                    "Lifecycle event published"
                ),
                Err(e) => warn!(
                    publisher = publisher.name(),
                    queue = %queue,
                    event_type = %event.event_type,
                    user_id = event.payload.id,
                    error = %e,
                    "Lifecycle event dropped after failed publish"
                ),
            }

            outcome
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingPublisher;
    use account_core::{EventType, UserRecord};
    use async_trait::async_trait;
    use chrono::Utc;

    fn sample_record() -> UserRecord {
        let now = Utc::now();
        UserRecord {
            id: 11,
            username: "dave".to_string(),
            email: "dave@example.com".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_dispatch_routes_to_event_queue() {
        let (publisher, mut published) = RecordingPublisher::new();
        let dispatcher = EventDispatcher::new(
            Arc::new(publisher),
            QueueNames::new("q.created", "q.updated"),
        );

        dispatcher
            .dispatch(LifecycleEvent::user_updated(sample_record()))
            .await
            .unwrap()
            .unwrap();

        let recorded = published.recv().await.unwrap();
        assert_eq!(recorded.queue, "q.updated");
        assert_eq!(recorded.event.event_type, EventType::UserUpdated);
        assert_eq!(recorded.event.payload.id, 11);
    }

    #[tokio::test]
    async fn test_failure_is_contained_in_task() {
        let (publisher, mut published) = RecordingPublisher::failing("broker down");
        let dispatcher = EventDispatcher::new(
            Arc::new(publisher),
            QueueNames::new("q.created", "q.updated"),
        );

        let result = dispatcher
            .dispatch(LifecycleEvent::user_created(sample_record()))
            .await
            .unwrap();

        assert!(matches!(result, Err(PublishError::Unavailable(_))));
        // 시도 자체는 기록됨
        assert_eq!(published.recv().await.unwrap().queue, "q.created");
    }

    struct StalledPublisher;

    #[async_trait]
    impl EventPublisher for StalledPublisher {
        async fn publish(&self, _queue: &str, _event: &LifecycleEvent) -> PublishResult<()> {
            std::future::pending::<()>().await;
            Ok(())
        }

        fn is_connected(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "stalled"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_bounds_stalled_publish() {
        let dispatcher = EventDispatcher::new(
            Arc::new(StalledPublisher),
            QueueNames::new("q.created", "q.updated"),
        )
        .with_timeout(Some(Duration::from_secs(5)));

        let result = dispatcher
            .dispatch(LifecycleEvent::user_created(sample_record()))
            .await
            .unwrap();

        assert!(matches!(result, Err(PublishError::Timeout(d)) if d == Duration::from_secs(5)));
    }
}
