//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 설정은 프로세스 시작 시 한 번 로드되며 이후에는 읽기 전용으로 공유됩니다.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::Path;

/// 환경 변수 오버라이드 접두사 (예: `ACCOUNT__JWT__SECRET`).
pub const ENV_PREFIX: &str = "ACCOUNT";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// RabbitMQ 설정
    pub rabbitmq: RabbitMqConfig,
    /// JWT 설정
    pub jwt: JwtConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// `host:port` 형식의 바인딩 주소.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 데이터베이스 설정.
#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    /// PostgreSQL sslmode (disable, prefer, require, ...)
    pub sslmode: String,
    /// 최대 연결 수
    pub max_connections: u32,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("database", &self.database)
            .field("sslmode", &self.sslmode)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// RabbitMQ 설정.
#[derive(Clone, Deserialize)]
pub struct RabbitMqConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// `user.created` 이벤트를 받을 큐 이름
    pub user_create_queue: String,
    /// `user.updated` 이벤트를 받을 큐 이름
    pub user_update_queue: String,
    /// 분리된 발행 작업의 상한 시간 (초). 미설정 시 제한 없음
    #[serde(default)]
    pub publish_timeout_secs: Option<u64>,
}

impl RabbitMqConfig {
    /// AMQP 접속 URI (기본 vhost `/`).
    pub fn uri(&self) -> String {
        format!(
            "amqp://{}:{}@{}:{}/%2f",
            self.username, self.password, self.host, self.port
        )
    }
}

impl std::fmt::Debug for RabbitMqConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RabbitMqConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("user_create_queue", &self.user_create_queue)
            .field("user_update_queue", &self.user_update_queue)
            .field("publish_timeout_secs", &self.publish_timeout_secs)
            .finish()
    }
}

/// 토큰 만료 기간 상한 (100년, 초 단위).
///
/// 쿠키 Max-Age 배율(`24 * 7`)과 만료 시각 계산이 범위를 넘지 않도록 제한합니다.
pub const MAX_EXPIRATION_SECS: i64 = 100 * 365 * 24 * 60 * 60;

/// JWT 설정.
///
/// 만료 값의 단위는 초입니다. 쿠키 Max-Age는 이 값을 기준으로 별도 배율이 적용됩니다.
#[derive(Clone, Deserialize)]
pub struct JwtConfig {
    /// 서명 비밀 키
    pub secret: SecretString,
    /// Access Token 유효 기간
    pub access_expiration: i64,
    /// Refresh Token 유효 기간. 미설정 시 access의 7배
    #[serde(default)]
    pub refresh_expiration: Option<i64>,
}

impl JwtConfig {
    /// Refresh Token 유효 기간.
    pub fn refresh_expiration(&self) -> i64 {
        self.refresh_expiration
            .unwrap_or_else(|| self.access_expiration.saturating_mul(7))
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("access_expiration", &self.access_expiration)
            .field("refresh_expiration", &self.refresh_expiration())
            .finish()
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "account_api=info,account_events=info,tower_http=debug".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = Self::defaults()?
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }

    /// TOML 문자열에서 설정을 로드합니다 (환경 변수 미적용).
    pub fn from_toml_str(source: &str) -> Result<Self, config::ConfigError> {
        let config: Self = Self::defaults()?
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError>
    {
        config::Config::builder()
            .set_default("server.host", "localhost")?
            .set_default("server.port", 8080)?
            .set_default("database.host", "localhost")?
            .set_default("database.port", 5432)?
            .set_default("database.username", "postgres")?
            .set_default("database.password", "")?
            .set_default("database.database", "users")?
            .set_default("database.sslmode", "disable")?
            .set_default("database.max_connections", 10)?
            .set_default("rabbitmq.host", "localhost")?
            .set_default("rabbitmq.port", 5672)?
            .set_default("rabbitmq.username", "guest")?
            .set_default("rabbitmq.password", "guest")?
            .set_default("rabbitmq.user_create_queue", "user.created")?
            .set_default("rabbitmq.user_update_queue", "user.updated")?
            .set_default("jwt.secret", "")?
            .set_default("jwt.access_expiration", 3600)
    }

    /// 로드된 설정의 불변 조건을 확인합니다.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.jwt.secret.expose_secret().is_empty() {
            return Err(config::ConfigError::Message(
                "jwt.secret must be set".to_string(),
            ));
        }
        let expirations = 1..=MAX_EXPIRATION_SECS;
        if !expirations.contains(&self.jwt.access_expiration)
            || !expirations.contains(&self.jwt.refresh_expiration())
        {
            return Err(config::ConfigError::Message(format!(
                "jwt expirations must be between 1 and {MAX_EXPIRATION_SECS} seconds"
            )));
        }
        if self.rabbitmq.user_create_queue.is_empty() || self.rabbitmq.user_update_queue.is_empty()
        {
            return Err(config::ConfigError::Message(
                "rabbitmq queue names must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
