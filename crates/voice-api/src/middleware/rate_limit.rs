//! Rate limiting middleware.
//!
//! Token Bucket 알고리즘 기반 IP별 rate limiting을 제공합니다.
//! 로그인/토큰 갱신처럼 비밀번호 대입 공격 대상이 되는 라우트에 적용합니다.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::error::ApiErrorResponse;
use crate::metrics::record_rate_limited;

/// Rate Limiter 설정.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// 분당 최대 요청 수
    pub requests_per_minute: u32,
    /// 버스트 허용량 (순간적으로 허용되는 추가 요청)
    pub burst_size: u32,
    /// 버킷 정리 간격
    pub cleanup_interval: Duration,
    /// `X-Forwarded-For`/`X-Real-IP` 헤더를 신뢰할지 여부.
    ///
    /// 리버스 프록시 뒤에서만 켜야 합니다. 켜져 있지 않으면 클라이언트가
    /// 헤더를 바꿔 가며 제한을 우회할 수 있습니다.
    pub trust_forwarded_for: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
            burst_size: 10,
            cleanup_interval: Duration::from_secs(300),
            trust_forwarded_for: false,
        }
    }
}

impl RateLimitConfig {
    /// 새 설정 생성.
    pub fn new(requests_per_minute: u32) -> Self {
        Self {
            requests_per_minute,
            burst_size: requests_per_minute / 10, // 10% 버스트
            ..Default::default()
        }
    }

    /// 엄격한 설정 (버스트 없음).
    pub fn strict(requests_per_minute: u32) -> Self {
        Self {
            requests_per_minute,
            burst_size: 0,
            ..Default::default()
        }
    }

    /// 프록시 헤더 신뢰 여부 설정.
    pub fn with_trust_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }
}

/// Token Bucket 구조체.
#[derive(Debug)]
struct TokenBucket {
    /// 현재 토큰 수
    tokens: f64,
    /// 마지막 리필 시간
    last_refill: Instant,
    /// 최대 토큰 수 (버킷 용량)
    max_tokens: f64,
    /// 초당 리필되는 토큰 수
    refill_rate: f64,
}

impl TokenBucket {
    fn new(config: &RateLimitConfig) -> Self {
        let refill_rate = config.requests_per_minute as f64 / 60.0;
        // 분당 1회 미만 설정이어도 첫 요청은 허용
        let max_tokens = (refill_rate + config.burst_size as f64).max(1.0);

        Self {
            tokens: max_tokens,
            last_refill: Instant::now(),
            max_tokens,
            refill_rate,
        }
    }

    /// 토큰 소비 시도.
    fn try_acquire(&mut self) -> bool {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();

        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.max_tokens);
        self.last_refill = now;
    }

    /// 다음 토큰까지 대기 시간 (초, 최소 1).
    fn retry_after_secs(&self) -> u64 {
        if self.refill_rate <= 0.0 {
            return 60;
        }
        let secs = ((1.0 - self.tokens) / self.refill_rate).ceil();
        (secs as u64).max(1)
    }
}

/// Rate Limit 확인 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    /// 요청 허용됨
    Allowed,
    /// Rate limit 초과
    Limited {
        /// 재시도까지 대기 시간 (초)
        retry_after: u64,
    },
}

/// IP별 Rate Limiter.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Arc<Mutex<HashMap<IpAddr, TokenBucket>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// 요청 허용 여부 확인.
    pub async fn check(&self, ip: IpAddr) -> RateLimitResult {
        let mut buckets = self.buckets.lock().await;

        let bucket = buckets
            .entry(ip)
            .or_insert_with(|| TokenBucket::new(&self.config));

        if bucket.try_acquire() {
            RateLimitResult::Allowed
        } else {
            RateLimitResult::Limited {
                retry_after: bucket.retry_after_secs(),
            }
        }
    }

    /// 오래된 버킷 정리.
    pub async fn cleanup(&self) {
        let mut buckets = self.buckets.lock().await;
        let Some(threshold) = Instant::now().checked_sub(self.config.cleanup_interval) else {
            return;
        };

        buckets.retain(|_, bucket| bucket.last_refill > threshold);
    }

    /// 현재 추적 중인 IP 수 반환.
    pub async fn tracked_ips(&self) -> usize {
        self.buckets.lock().await.len()
    }

    /// 주기적으로 오래된 버킷을 정리하는 태스크 시작.
    pub fn spawn_cleanup_task(&self) -> tokio::task::JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(limiter.config.cleanup_interval);
            loop {
                interval.tick().await;
                limiter.cleanup().await;
                let tracked_ips = limiter.tracked_ips().await;
                tracing::trace!(tracked_ips, "Rate limit buckets cleaned up");
            }
        })
    }
}

/// Rate Limiting 미들웨어 함수.
///
/// 제한 초과 시 `429 Too Many Requests`와 `Retry-After` 헤더를 반환합니다.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let ip = extract_client_ip(&request, limiter.config.trust_forwarded_for);

    match limiter.check(ip).await {
        RateLimitResult::Allowed => next.run(request).await,
        RateLimitResult::Limited { retry_after } => {
            record_rate_limited(request.uri().path());

            tracing::warn!(
                client_ip = %ip,
                path = %request.uri().path(),
                retry_after,
                "Rate limit exceeded"
            );

            let body = ApiErrorResponse::new(
                "RATE_LIMITED",
                "요청이 너무 많습니다. 잠시 후 다시 시도하세요",
            );
            let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after));

            response
        }
    }
}

/// 요청에서 클라이언트 IP 추출.
///
/// 프록시 헤더 신뢰가 켜져 있으면 `X-Forwarded-For`의 첫 주소, `X-Real-IP` 순으로
/// 확인하고, 그 외에는 연결 주소를 사용합니다.
fn extract_client_ip(request: &Request, trust_forwarded_for: bool) -> IpAddr {
    if trust_forwarded_for {
        let forwarded = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|ip| ip.trim().parse().ok());
        if let Some(ip) = forwarded {
            return ip;
        }

        let real_ip = request
            .headers()
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|ip| ip.trim().parse().ok());
        if let Some(ip) = real_ip {
            return ip;
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        // 연결 정보가 없는 경우 (테스트 등)
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware, routing::post, Router};
    use tower::ServiceExt;

    fn config(requests_per_minute: u32, burst_size: u32) -> RateLimitConfig {
        RateLimitConfig {
            requests_per_minute,
            burst_size,
            cleanup_interval: Duration::from_secs(60),
            trust_forwarded_for: false,
        }
    }

    #[tokio::test]
    async fn test_rate_limiter_limits_burst() {
        let limiter = RateLimiter::new(config(60, 5));
        let ip: IpAddr = "192.168.1.1".parse().unwrap();

        // 1 (초당) + 5 (버스트) = 6
        for i in 0..6 {
            assert_eq!(
                limiter.check(ip).await,
                RateLimitResult::Allowed,
                "Request {} should be allowed",
                i
            );
        }

        match limiter.check(ip).await {
            RateLimitResult::Limited { retry_after } => assert!(retry_after >= 1),
            RateLimitResult::Allowed => panic!("Request should be limited"),
        }
    }

    #[tokio::test]
    async fn test_rate_limiter_different_ips() {
        let limiter = RateLimiter::new(config(60, 0));
        let ip1: IpAddr = "192.168.1.1".parse().unwrap();
        let ip2: IpAddr = "192.168.1.2".parse().unwrap();

        assert_eq!(limiter.check(ip1).await, RateLimitResult::Allowed);
        assert!(matches!(
            limiter.check(ip1).await,
            RateLimitResult::Limited { .. }
        ));

        // IP2는 별도 버킷
        assert_eq!(limiter.check(ip2).await, RateLimitResult::Allowed);
    }

    #[tokio::test]
    async fn test_rate_limiter_cleanup() {
        let limiter = RateLimiter::new(RateLimitConfig {
            cleanup_interval: Duration::from_millis(10),
            ..config(60, 0)
        });
        let ip: IpAddr = "192.168.1.1".parse().unwrap();

        let _ = limiter.check(ip).await;
        assert_eq!(limiter.tracked_ips().await, 1);

        tokio::time::sleep(Duration::from_millis(20)).await;

        limiter.cleanup().await;
        assert_eq!(limiter.tracked_ips().await, 0);
    }

    #[tokio::test]
    async fn test_cleanup_task_evicts_idle_buckets() {
        let limiter = RateLimiter::new(RateLimitConfig {
            cleanup_interval: Duration::from_millis(10),
            ..config(60, 0)
        });
        let ip: IpAddr = "192.168.1.1".parse().unwrap();

        let _ = limiter.check(ip).await;
        assert_eq!(limiter.tracked_ips().await, 1);

        let handle = limiter.spawn_cleanup_task();
        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.abort();

        assert_eq!(limiter.tracked_ips().await, 0);
    }

    #[tokio::test]
    async fn test_token_bucket_refill() {
        // 초당 100회
        let limiter = RateLimiter::new(config(6000, 0));
        let ip: IpAddr = "192.168.1.1".parse().unwrap();

        for _ in 0..100 {
            let _ = limiter.check(ip).await;
        }
        assert!(matches!(
            limiter.check(ip).await,
            RateLimitResult::Limited { .. }
        ));

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(limiter.check(ip).await, RateLimitResult::Allowed);
    }

    #[test]
    fn test_rate_limit_config_constructors() {
        let config = RateLimitConfig::new(600);
        assert_eq!(config.requests_per_minute, 600);
        assert_eq!(config.burst_size, 60);
        assert!(!config.trust_forwarded_for);

        let config = RateLimitConfig::strict(100).with_trust_forwarded_for(true);
        assert_eq!(config.burst_size, 0);
        assert!(config.trust_forwarded_for);
    }

    fn app(limiter: RateLimiter) -> Router {
        Router::new()
            .route("/login", post(|| async { "OK" }))
            .layer(middleware::from_fn_with_state(limiter, rate_limit_middleware))
    }

    fn login_request(forwarded_for: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().method("POST").uri("/login");
        if let Some(ip) = forwarded_for {
            builder = builder.header("x-forwarded-for", ip);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_middleware_returns_429_with_retry_after() {
        let app = app(RateLimiter::new(config(60, 0)));

        let response = app.clone().oneshot(login_request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(login_request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().get(RETRY_AFTER).is_some());

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "RATE_LIMITED");
    }

    #[tokio::test]
    async fn test_forwarded_for_ignored_unless_trusted() {
        let app = app(RateLimiter::new(config(60, 0)));

        let response = app
            .clone()
            .oneshot(login_request(Some("10.0.0.1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // 헤더를 바꿔도 같은 연결 주소로 취급
        let response = app.oneshot(login_request(Some("10.0.0.2"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_forwarded_for_trusted_behind_proxy() {
        let app = app(RateLimiter::new(
            config(60, 0).with_trust_forwarded_for(true),
        ));

        let response = app
            .clone()
            .oneshot(login_request(Some("10.0.0.1, 172.16.0.1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(login_request(Some("10.0.0.2"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
