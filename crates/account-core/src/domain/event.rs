//! 계정 생명주기 이벤트.
//!
//! 저장소 변경이 성공한 직후 동기적으로 생성되고,
//! 이벤트 발행기를 통해 비동기로 브로커에 전달됩니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserRecord;

/// 이벤트 메시지의 content type.
pub const EVENT_CONTENT_TYPE: &str = "application/json";

/// 생명주기 이벤트 종류.
///
/// 문자열 값은 메시지의 `type` 속성으로 그대로 사용됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// 사용자 생성
    #[serde(rename = "user.created")]
    UserCreated,
    /// 사용자 정보 수정
    #[serde(rename = "user.updated")]
    UserUpdated,
}

impl EventType {
    /// 메시지 타입 태그 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserCreated => "user.created",
            Self::UserUpdated => "user.updated",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 생명주기 이벤트.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    /// 이벤트 종류
    pub event_type: EventType,
    /// 직렬화 대상 사용자 레코드 (비밀번호 제외)
    pub payload: UserRecord,
    /// 이벤트 생성 시각
    pub timestamp: DateTime<Utc>,
}

impl LifecycleEvent {
    /// 새 이벤트를 생성합니다.
    pub fn new(event_type: EventType, payload: UserRecord) -> Self {
        Self {
            event_type,
            payload,
            timestamp: Utc::now(),
        }
    }

    /// `user.created` 이벤트.
    pub fn user_created(payload: UserRecord) -> Self {
        Self::new(EventType::UserCreated, payload)
    }

    /// `user.updated` 이벤트.
    pub fn user_updated(payload: UserRecord) -> Self {
        Self::new(EventType::UserUpdated, payload)
    }

    /// 메시지 content type.
    pub fn content_type(&self) -> &'static str {
        EVENT_CONTENT_TYPE
    }

    /// 메시지 본문 (UTF-8 JSON 사용자 레코드).
    pub fn body(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> UserRecord {
        let now = Utc::now();
        UserRecord {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_event_type_tags() {
        assert_eq!(EventType::UserCreated.as_str(), "user.created");
        assert_eq!(EventType::UserUpdated.to_string(), "user.updated");
        assert_eq!(
            serde_json::to_string(&EventType::UserUpdated).unwrap(),
            r#""user.updated""#
        );
    }

    #[test]
    fn test_body_is_bare_user_record() {
        let event = LifecycleEvent::user_created(sample_record());
        let body: serde_json::Value = serde_json::from_slice(&event.body().unwrap()).unwrap();

        assert_eq!(body["username"], "alice");
        assert_eq!(body["email"], "alice@example.com");
        // 이벤트 메타데이터는 메시지 속성으로만 전달됨
        assert!(body.get("event_type").is_none());
        assert!(body.get("password").is_none());
        assert_eq!(event.content_type(), "application/json");
    }
}
