//! # Account Events
//!
//! 계정 생명주기 이벤트 발행.
//!
//! 저장소 변경이 성공한 뒤 `user.created` / `user.updated` 이벤트를
//! RabbitMQ의 durable 큐로 전달합니다. 전달 보장은 at-least-once이며
//! 소비자는 멱등하게 처리한다고 가정합니다.
//!
//! # 구성 요소
//!
//! - [`EventPublisher`]: 단일 발행 시도를 수행하는 trait
//! - [`AmqpPublisher`]: lapin 기반 구현 (발행마다 채널을 열고 닫음)
//! - [`EventDispatcher`]: 요청 경로와 분리된 태스크로 발행하고 실패는 로그 후 폐기

pub mod amqp;
pub mod dispatcher;
#[cfg(any(test, feature = "test-utils"))]
pub mod recording;
pub mod types;

pub use amqp::{connect_broker, publish_properties, AmqpPublisher};
pub use dispatcher::EventDispatcher;
#[cfg(any(test, feature = "test-utils"))]
pub use recording::{PublishedEvent, RecordingPublisher};
pub use types::{EventPublisher, PublishError, PublishResult, QueueNames};
