//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! Arc로 래핑되어 Axum의 State extractor를 통해 핸들러에 주입됩니다.

use std::sync::Arc;

use account_events::EventDispatcher;
use tracing::warn;

use crate::auth::AuthFlow;
use crate::repository::UserStore;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 사용자 저장소
    pub store: Arc<dyn UserStore>,

    /// 토큰 발급/검증 흐름 (서명 키와 만료 정책 고정)
    pub auth: Arc<AuthFlow>,

    /// 생명주기 이벤트 디스패처
    pub events: EventDispatcher,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>, auth: AuthFlow, events: EventDispatcher) -> Self {
        Self {
            store,
            auth: Arc::new(auth),
            events,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }

    /// 저장소 연결 상태 확인.
    pub async fn is_store_healthy(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "저장소 헬스 체크 실패");
                false
            }
        }
    }

    /// 브로커 연결 상태 확인.
    pub fn is_broker_connected(&self) -> bool {
        self.events.publisher().is_connected()
    }
}

/// 테스트용 AppState 생성.
///
/// 메모리 저장소와 기록용 발행기를 사용합니다. 발행 시도는 반환된 수신기로 확인합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> (
    AppState,
    tokio::sync::mpsc::UnboundedReceiver<account_events::PublishedEvent>,
) {
    use crate::auth::{ExpiryPolicy, SigningSecret};
    use crate::repository::MemoryUserStore;
    use account_events::{QueueNames, RecordingPublisher};

    let (publisher, published) = RecordingPublisher::new();
    let events = EventDispatcher::new(
        Arc::new(publisher),
        QueueNames::new("user.created", "user.updated"),
    );
    let auth = AuthFlow::new(
        &SigningSecret::new(TEST_JWT_SECRET),
        ExpiryPolicy::new(3600, 3600 * 7),
    );

    (
        AppState::new(Arc::new(MemoryUserStore::new()), auth, events),
        published,
    )
}

/// 테스트용 JWT 서명 키.
#[cfg(any(test, feature = "test-utils"))]
pub const TEST_JWT_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";
