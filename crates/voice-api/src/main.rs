//! 음성 인식 서비스 API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 헬스 체크, 로그인/토큰 갱신, 사용자 조회 엔드포인트를 제공합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use voice_api::metrics::setup_metrics_recorder;
use voice_api::middleware::{metrics_layer, RateLimitConfig, RateLimiter};
use voice_api::openapi::openapi_router;
use voice_api::routes::create_api_router;
use voice_api::state::AppState;
use voice_api::users::{InMemoryUserStore, StoredUser};
use voice_core::{init_logging_from_env, AuthConfig, Role};

/// 서버 설정 구조체.
struct ServerConfig {
    /// 바인딩할 호스트 주소
    host: String,
    /// 바인딩할 포트
    port: u16,
    /// 동시 비밀번호 해싱 작업 수
    hash_concurrency: usize,
    /// 인증 라우트의 IP별 분당 요청 수 (0이면 비활성화)
    auth_rate_limit_rpm: u32,
    /// 프록시 헤더로 클라이언트 IP를 판단할지 여부
    trust_forwarded_for: bool,
}

impl ServerConfig {
    /// 환경 변수에서 설정 로드.
    fn from_env() -> Self {
        let host = std::env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("API_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);
        let hash_concurrency = std::env::var("HASH_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(2)
            });
        let auth_rate_limit_rpm = std::env::var("AUTH_RATE_LIMIT_RPM")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        let trust_forwarded_for = std::env::var("TRUST_FORWARDED_FOR")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Self {
            host,
            port,
            hash_concurrency,
            auth_rate_limit_rpm,
            trust_forwarded_for,
        }
    }

    /// 소켓 주소 반환.
    ///
    /// # Errors
    /// `host:port` 형식이 유효하지 않으면 `AddrParseError`를 반환합니다.
    fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// 인증 라우트 요청 제한기.
    fn auth_rate_limiter(&self) -> Option<RateLimiter> {
        if self.auth_rate_limit_rpm == 0 {
            warn!("Auth rate limiting DISABLED (AUTH_RATE_LIMIT_RPM=0)");
            return None;
        }

        info!(
            requests_per_minute = self.auth_rate_limit_rpm,
            trust_forwarded_for = self.trust_forwarded_for,
            "Auth rate limiting configured"
        );

        Some(RateLimiter::new(
            RateLimitConfig::new(self.auth_rate_limit_rpm)
                .with_trust_forwarded_for(self.trust_forwarded_for),
        ))
    }
}

/// 초기 관리자 계정 생성.
///
/// `BOOTSTRAP_ADMIN_USERNAME`과 `BOOTSTRAP_ADMIN_PASSWORD`가 모두 설정된
/// 경우에만 생성합니다.
async fn bootstrap_admin(
    state: &AppState,
    store: &InMemoryUserStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let (Ok(username), Ok(password)) = (
        std::env::var("BOOTSTRAP_ADMIN_USERNAME"),
        std::env::var("BOOTSTRAP_ADMIN_PASSWORD"),
    ) else {
        warn!("BOOTSTRAP_ADMIN_USERNAME/PASSWORD not set, user store is empty");
        return Ok(());
    };

    if username.is_empty() || password.is_empty() {
        warn!("Bootstrap admin credentials are empty, skipping");
        return Ok(());
    }

    let hash = state.hashing.hash(password).await?;
    store.insert(StoredUser::new(username.clone(), hash, Role::Admin)).await;
    info!(%username, "Bootstrap admin user created");

    Ok(())
}

/// CORS 레이어 생성.
///
/// CORS_ORIGINS 환경변수가 설정되어 있으면 해당 origin만 허용합니다.
/// 설정되지 않으면 개발 모드로 간주하여 모든 origin을 허용합니다.
fn cors_layer() -> CorsLayer {
    let configured = std::env::var("CORS_ORIGINS")
        .ok()
        .filter(|origins| !origins.is_empty());

    let (allow_origin, allow_credentials) = match configured {
        Some(origins) => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                (AllowOrigin::any(), false)
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                (AllowOrigin::list(origins), true)
            }
        }
        None => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            (AllowOrigin::any(), false)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        // any origin과 credentials는 함께 쓸 수 없음
        .allow_credentials(allow_credentials)
        .max_age(Duration::from_secs(3600))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 전체 라우터 생성.
fn create_router(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    auth_rate_limiter: Option<RateLimiter>,
) -> Router {
    // 메트릭 라우터 (별도 상태)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    Router::new()
        .merge(metrics_router)
        .merge(create_api_router(auth_rate_limiter).with_state(state))
        .merge(openapi_router())
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 (30초) - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(cors_layer())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    init_logging_from_env()?;

    info!("Starting Voice API server...");

    let metrics_handle = setup_metrics_recorder()?;
    info!("Prometheus metrics recorder initialized");

    let config = ServerConfig::from_env();
    let addr = config.socket_addr().map_err(|e| {
        error!(
            host = %config.host,
            port = config.port,
            error = %e,
            "소켓 주소 설정이 유효하지 않습니다. API_HOST, API_PORT 환경변수를 확인하세요."
        );
        e
    })?;

    let auth_config = AuthConfig::from_env().map_err(|e| {
        error!(error = %e, "인증 설정을 로드하지 못했습니다");
        e
    })?;
    info!(
        algorithm = ?auth_config.algorithm,
        access_ttl_minutes = auth_config.access_ttl_minutes,
        refresh_ttl_days = auth_config.refresh_ttl_days,
        "Auth configuration loaded"
    );

    let store = Arc::new(InMemoryUserStore::new());
    let state = AppState::new(&auth_config, store.clone(), config.hash_concurrency)?;
    bootstrap_admin(&state, &store).await?;

    info!(
        version = %state.version,
        hash_concurrency = state.hashing.max_concurrent(),
        users = store.len().await,
        "Application state initialized"
    );

    let auth_rate_limiter = config.auth_rate_limiter();
    let cleanup_handle = auth_rate_limiter
        .as_ref()
        .map(|limiter| limiter.spawn_cleanup_task());

    let app = create_router(Arc::new(state), metrics_handle, auth_rate_limiter);

    info!(%addr, "API server listening");
    info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if let Some(handle) = cleanup_handle {
        handle.abort();
    }

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 반환합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
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
}
