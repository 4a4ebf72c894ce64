//! 테스트용 발행기.
//!
//! 발행 시도를 채널로 전달하여 테스트에서 기다릴 수 있게 합니다.
//! `failing`으로 만든 발행기는 시도를 기록한 뒤 항상 실패합니다.

use account_core::LifecycleEvent;
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::types::{EventPublisher, PublishError, PublishResult};

/// 기록된 발행 시도.
#[derive(Debug, Clone)]
pub struct PublishedEvent {
    pub queue: String,
    pub event: LifecycleEvent,
}

/// 발행 시도를 기록하는 발행기.
pub struct RecordingPublisher {
    sender: mpsc::UnboundedSender<PublishedEvent>,
    failure: Option<String>,
}

impl RecordingPublisher {
    /// 항상 성공하는 발행기와 기록 수신기.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PublishedEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender,
                failure: None,
            },
            receiver,
        )
    }

    /// 항상 실패하는 발행기와 기록 수신기 (브로커 장애 재현).
    pub fn failing(reason: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<PublishedEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender,
                failure: Some(reason.into()),
            },
            receiver,
        )
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, queue: &str, event: &LifecycleEvent) -> PublishResult<()> {
        // 수신기가 없어도 발행 결과에는 영향 없음
        let _ = self.sender.send(PublishedEvent {
            queue: queue.to_string(),
            event: event.clone(),
        });

        match &self.failure {
            Some(reason) => Err(PublishError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    fn is_connected(&self) -> bool {
        self.failure.is_none()
    }

    fn name(&self) -> &str {
        "recording"
    }
}
