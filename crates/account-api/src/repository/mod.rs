//! 사용자 저장소.
//!
//! 라우트 핸들러는 [`UserStore`] trait만 사용합니다.
//! 운영 환경은 [`PgUserStore`], 테스트는 [`MemoryUserStore`]를 사용합니다.

pub mod memory;
pub mod users;

pub use memory::MemoryUserStore;
pub use users::{NewUser, PgUserStore, StoreError, StoredUser, UserChanges, UserStore};
