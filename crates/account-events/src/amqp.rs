//! RabbitMQ(AMQP 0-9-1) 이벤트 발행기.
//!
//! 브로커 연결은 프로세스 전체에서 하나를 공유하고, 발행마다 전용 채널을 엽니다.
//! 채널은 동시 사용에 안전하지 않으므로 발행 간에 공유하지 않습니다.

use std::sync::Arc;

use account_core::{LifecycleEvent, RabbitMqConfig};
use async_trait::async_trait;
use lapin::{
    options::{BasicPublishOptions, QueueDeclareOptions},
    types::{FieldTable, ShortString},
    BasicProperties, Channel, Connection, ConnectionProperties, ConnectionStatus,
};
use tracing::{debug, info};

use crate::types::{EventPublisher, PublishError, PublishResult};

/// persistent delivery mode.
const DELIVERY_MODE_PERSISTENT: u8 = 2;

/// 브로커에 연결합니다.
///
/// 시작 시 한 번 호출하며, 실패하면 서비스 시작을 중단해야 합니다.
pub async fn connect_broker(config: &RabbitMqConfig) -> Result<Connection, lapin::Error> {
    let connection = Connection::connect(&config.uri(), ConnectionProperties::default()).await?;
    info!(
        host = %config.host,
        port = config.port,
        "RabbitMQ 연결 성공"
    );
    Ok(connection)
}

/// 이벤트 메시지 속성.
///
/// persistent 전달, JSON content type, 이벤트 종류 태그, 초 단위 타임스탬프를 설정합니다.
pub fn publish_properties(event: &LifecycleEvent) -> BasicProperties {
    BasicProperties::default()
        .with_delivery_mode(DELIVERY_MODE_PERSISTENT)
        .with_content_type(ShortString::from(event.content_type()))
        .with_kind(ShortString::from(event.event_type.as_str()))
        .with_timestamp(event.timestamp.timestamp().max(0) as u64)
}

/// 연결이 끊긴 상태면 채널을 열지 않고 `Unavailable`로 실패합니다.
fn ensure_connected(status: &ConnectionStatus) -> PublishResult<()> {
    if status.connected() {
        Ok(())
    } else {
        Err(PublishError::Unavailable(format!(
            "connection state {:?}",
            status.state()
        )))
    }
}

/// lapin 기반 이벤트 발행기.
#[derive(Clone)]
pub struct AmqpPublisher {
    connection: Arc<Connection>,
}

impl AmqpPublisher {
    /// 공유 연결로 발행기를 생성합니다.
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    /// 브로커 연결을 닫습니다 (종료 시).
    pub async fn close(&self) -> Result<(), lapin::Error> {
        self.connection.close(200, "shutdown").await
    }
}

#[async_trait]
impl EventPublisher for AmqpPublisher {
    async fn publish(&self, queue: &str, event: &LifecycleEvent) -> PublishResult<()> {
        ensure_connected(self.connection.status())?;

        let channel = self
            .connection
            .create_channel()
            .await
            .map_err(PublishError::ChannelOpen)?;

        let outcome = publish_on_channel(&channel, queue, event).await;

        // 결과와 관계없이 채널은 한 번의 시도 후 닫음
        if let Err(e) = channel.close(200, "OK").await {
            debug!(error = %e, queue, "채널 닫기 실패");
        }

        outcome
    }

    fn is_connected(&self) -> bool {
        self.connection.status().connected()
    }

    fn name(&self) -> &str {
        "rabbitmq"
    }
}

async fn publish_on_channel(
    channel: &Channel,
    queue: &str,
    event: &LifecycleEvent,
) -> PublishResult<()> {
    let declared = channel
        .queue_declare(
            queue,
            QueueDeclareOptions {
                durable: true,
                exclusive: false,
                auto_delete: false,
                ..QueueDeclareOptions::default()
            },
            FieldTable::default(),
        )
        .await
        .map_err(PublishError::QueueDeclare)?;

    let body = event.body()?;

    // 프로토콜 수준 쓰기가 끝나면 반환, 브로커 confirm은 기다리지 않음
    let _confirm = channel
        .basic_publish(
            "",
            declared.name().as_str(),
            BasicPublishOptions::default(),
            &body,
            publish_properties(event),
        )
        .await
        .map_err(PublishError::Publish)?;

    debug!(
        queue = declared.name().as_str(),
        event_type = %event.event_type,
        bytes = body.len(),
        "이벤트 발행 완료"
    );

    Ok(())
}
