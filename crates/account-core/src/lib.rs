//! # Account Core
//!
//! 계정 서비스의 핵심 도메인 모델 및 공통 인프라를 제공합니다.
//!
//! 이 크레이트는 서비스 전반에서 사용되는 기본 타입을 제공합니다:
//! - 사용자 레코드 및 토큰 발급용 사용자 식별 정보
//! - 계정 생명주기 이벤트 (`user.created`, `user.updated`)
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use logging::*;
