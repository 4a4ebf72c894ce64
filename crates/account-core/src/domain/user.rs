//! 사용자 도메인 타입.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 외부로 노출되는 사용자 레코드.
///
/// API 응답과 생명주기 이벤트 페이로드에 그대로 직렬화됩니다.
/// 비밀번호 해시는 이 타입에 포함되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// 사용자 ID
    pub id: i64,
    /// 사용자 이름 (고유)
    pub username: String,
    /// 이메일 (고유)
    pub email: String,
    /// 생성 시각
    pub created_at: DateTime<Utc>,
    /// 마지막 수정 시각
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// 토큰 발급에 필요한 최소 식별 정보를 반환합니다.
    pub fn identity(&self) -> UserIdentity {
        UserIdentity::new(self.id, self.username.clone())
    }
}

/// 토큰 발급 대상 사용자 식별 정보.
///
/// 갱신(refresh) 흐름에서는 저장소를 다시 조회하지 않고
/// 토큰 클레임만으로 이 값을 재구성합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// 사용자 ID
    pub user_id: i64,
    /// 사용자 이름
    pub username: String,
}

impl UserIdentity {
    /// 새 식별 정보를 생성합니다.
    pub fn new(user_id: i64, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}
