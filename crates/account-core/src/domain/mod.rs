//! 도메인 모델.

mod event;
mod user;

pub use event::{EventType, LifecycleEvent, EVENT_CONTENT_TYPE};
pub use user::{UserIdentity, UserRecord};
