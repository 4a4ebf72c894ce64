//! Account API 서버 진입점.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use account_api::{
    auth::AuthFlow, create_api_router, openapi::swagger_ui_router, AppState, PgUserStore,
};
use account_core::{init_logging, AppConfig, DatabaseConfig, LogConfig};
use account_events::{connect_broker, AmqpPublisher, EventDispatcher};
use anyhow::Context;
use axum::{http::StatusCode, Router};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// CORS 레이어 생성.
///
/// `CORS_ORIGINS`(쉼표 구분)가 설정되어 있으면 해당 origin만 허용하고,
/// 없으면 개발 모드로 간주하여 모든 origin을 허용합니다.
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
}

/// 전체 라우터 조합.
fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(create_api_router().with_state(state))
        .merge(swagger_ui_router())
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 (30초) - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(cors_layer())
}

/// PostgreSQL 연결 풀 생성.
async fn connect_database(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.username)
        .password(&config.password)
        .database(&config.database)
        .ssl_mode(PgSslMode::from_str(&config.sslmode).context("잘못된 database.sslmode")?);

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .context("PostgreSQL 연결 실패")?;

    info!(host = %config.host, database = %config.database, "PostgreSQL 연결 성공");
    Ok(pool)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let config_path =
        std::env::var("ACCOUNT_CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());
    let config = AppConfig::load(&config_path)
        .with_context(|| format!("설정 로드 실패: {config_path}"))?;

    init_logging(LogConfig::from_settings(&config.logging))
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {e}"))?;

    info!("Starting Account API server...");
    info!(jwt = ?config.jwt, rabbitmq = ?config.rabbitmq, "Configuration loaded");

    // 저장소
    let pool = connect_database(&config.database).await?;
    let store = PgUserStore::new(pool);
    store.ensure_schema().await.context("스키마 생성 실패")?;

    // 브로커 (연결 실패 시 시작 중단)
    let connection = Arc::new(
        connect_broker(&config.rabbitmq)
            .await
            .context("RabbitMQ 연결 실패")?,
    );
    let publisher = AmqpPublisher::new(Arc::clone(&connection));
    let events = EventDispatcher::from_config(Arc::new(publisher.clone()), &config.rabbitmq);

    let state = Arc::new(AppState::new(
        Arc::new(store),
        AuthFlow::from_config(&config.jwt),
        events,
    ));
    info!(version = %state.version, "Application state initialized");

    let app = create_router(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("주소 바인딩 실패: {addr}"))?;

    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);

    let shutdown_token = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown_token.clone()));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_token.clone().cancelled_owned())
        .await?;

    info!("Server shutdown initiated, cleaning up...");

    if let Err(e) = publisher.close().await {
        warn!(error = %e, "RabbitMQ 연결 종료 실패");
    }

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    shutdown_token.cancel();
}
