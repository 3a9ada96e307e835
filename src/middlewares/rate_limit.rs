/*!
 * 速率限制中间件
 *
 * 此中间件用于限制开始作答和提交作答的频率。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::{web, App};
 * use crate::middlewares::rate_limit::RateLimit;
 *
 * App::new()
 *     .service(
 *         web::scope("/api/v1/attempts")
 *             .wrap(RequireJWT)
 *             .route(
 *                 "/{attempt_id}/submit",
 *                 web::post().to(submit_attempt).wrap(RateLimit::attempts()),
 *             )
 *     )
 * ```
 *
 * ## 限制规则
 *
 * - 已认证请求使用用户 ID 作为限制键，否则使用客户端 IP
 * - 计数窗口从第一次请求开始，窗口结束后重新计数
 * - 超过限制返回 429 Too Many Requests
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::config::AppConfig;
use crate::models::users::entities::CurrentUser;
use crate::models::{ApiResponse, ErrorCode};

/// 一个限流窗口内的计数
#[derive(Debug, Clone, Copy)]
struct RateWindow {
    count: u32,
    started: Instant,
}

/// 全局速率限制缓存
/// 键: 路由前缀:用户或IP，值: 当前窗口
static RATE_LIMIT_CACHE: Lazy<Cache<String, RateWindow>> = Lazy::new(|| {
    let window_secs = AppConfig::get().rate_limit.window_secs.max(1);
    Cache::builder()
        .time_to_live(Duration::from_secs(window_secs))
        .max_capacity(100_000)
        .build()
});

/// 速率限制配置
#[derive(Clone)]
pub struct RateLimit {
    /// 时间窗口内允许的最大请求数
    max_requests: u32,
    /// 时间窗口（秒）
    window_secs: u64,
    /// 限制键前缀（用于区分不同端点）
    key_prefix: String,
}

impl RateLimit {
    /// 创建新的速率限制器
    ///
    /// # 参数
    /// - `max_requests`: 时间窗口内允许的最大请求数
    /// - `window_secs`: 时间窗口（秒）
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
            key_prefix: String::new(),
        }
    }

    /// 设置限制键前缀
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.key_prefix = prefix.to_string();
        self
    }

    /// 开始作答与提交作答限制，取自配置 `rate_limit`
    pub fn attempts() -> Self {
        let config = &AppConfig::get().rate_limit;
        Self::new(config.attempt_requests, config.window_secs).with_prefix("attempts")
    }
}

impl RateWindow {
    fn fresh(now: Instant) -> Self {
        Self {
            count: 0,
            started: now,
        }
    }

    /// 窗口过期后从零开始计数
    fn current(self, now: Instant, window: Duration) -> Self {
        if now.duration_since(self.started) >= window {
            Self::fresh(now)
        } else {
            self
        }
    }

    /// 距离窗口结束的秒数
    fn retry_after(&self, now: Instant, window: Duration) -> u64 {
        window
            .saturating_sub(now.duration_since(self.started))
            .as_secs()
            .max(1)
    }
}

/// 从请求中提取客户端 IP
///
/// 安全注意事项：
/// - 如果服务部署在反向代理后面，需要在反向代理中配置正确的 X-Forwarded-For / X-Real-IP 头
/// - 此实现会验证 IP 格式，防止伪造的无效头导致问题
/// - 在不可信网络中直接暴露服务时，攻击者可能伪造转发头来绕过限制
fn extract_client_ip(req: &ServiceRequest) -> String {
    // 尝试从连接信息获取真实 IP（最可信）
    let connection_ip = req
        .connection_info()
        .realip_remote_addr()
        .map(|s| s.to_string());

    // 如果连接信息有有效 IP，优先使用
    if let Some(ref ip) = connection_ip
        && is_valid_ip(ip)
    {
        return ip.clone();
    }

    // 从 X-Forwarded-For 头获取（用于反向代理场景）
    // 只取第一个 IP（最接近客户端的）
    if let Some(forwarded) = req.headers().get("X-Forwarded-For")
        && let Ok(value) = forwarded.to_str()
        && let Some(ip) = value.split(',').next()
    {
        let ip = ip.trim();
        if is_valid_ip(ip) {
            return ip.to_string();
        }
    }

    // 从 X-Real-IP 头获取
    if let Some(real_ip) = req.headers().get("X-Real-IP")
        && let Ok(ip) = real_ip.to_str()
    {
        let ip = ip.trim();
        if is_valid_ip(ip) {
            return ip.to_string();
        }
    }

    // 如果都没有有效 IP，使用连接信息的默认值
    connection_ip.unwrap_or_else(|| "unknown".to_string())
}

/// 验证 IP 地址格式是否有效
fn is_valid_ip(ip: &str) -> bool {
    use std::net::IpAddr;
    ip.parse::<IpAddr>().is_ok()
}

/// 从请求中提取用户 ID（如果已认证）
fn extract_user_id(req: &ServiceRequest) -> Option<i64> {
    req.extensions().get::<CurrentUser>().map(|user| user.id)
}

/// 创建速率限制错误响应
fn create_rate_limit_response(retry_after: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .insert_header(("Retry-After", retry_after.to_string()))
        .insert_header(("X-RateLimit-Remaining", "0"))
        .json(ApiResponse::<()>::error_empty(
            ErrorCode::RateLimitExceeded,
            "请求过于频繁，请稍后再试",
        ))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            max_requests: self.max_requests,
            window_secs: self.window_secs,
            key_prefix: self.key_prefix.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    max_requests: u32,
    window_secs: u64,
    key_prefix: String,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let max_requests = self.max_requests;
        let window_secs = self.window_secs;
        let key_prefix = self.key_prefix.clone();

        Box::pin(async move {
            // 构建限制键
            let identifier = extract_user_id(&req)
                .map(|id| format!("user:{}", id))
                .unwrap_or_else(|| format!("ip:{}", extract_client_ip(&req)));

            let cache_key = if key_prefix.is_empty() {
                identifier
            } else {
                format!("{}:{}", key_prefix, identifier)
            };

            // 获取当前窗口
            let now = Instant::now();
            let window = Duration::from_secs(window_secs);
            let current = RATE_LIMIT_CACHE
                .get(&cache_key)
                .await
                .map(|w| w.current(now, window))
                .unwrap_or_else(|| RateWindow::fresh(now));

            // 检查是否超过限制
            if current.count >= max_requests {
                warn!(
                    "Rate limit exceeded for key: {} (count: {}/{})",
                    cache_key, current.count, max_requests
                );
                let retry_after = current.retry_after(now, window);
                return Ok(req
                    .into_response(create_rate_limit_response(retry_after).map_into_right_body()));
            }

            // 增加计数
            let updated = RateWindow {
                count: current.count + 1,
                ..current
            };
            RATE_LIMIT_CACHE.insert(cache_key.clone(), updated).await;

            let info = RateLimitInfo {
                remaining: max_requests.saturating_sub(updated.count),
                limit: max_requests,
                reset: updated.retry_after(now, window),
            };

            // 继续处理请求，并添加速率限制头
            let mut res = srv.call(req).await?;
            info.apply(res.headers_mut());
            Ok(res.map_into_left_body())
        })
    }
}

/// 速率限制信息
#[derive(Clone)]
pub struct RateLimitInfo {
    pub remaining: u32,
    pub limit: u32,
    pub reset: u64,
}

impl RateLimitInfo {
    fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in [
            ("x-ratelimit-limit", u64::from(self.limit)),
            ("x-ratelimit-remaining", u64::from(self.remaining)),
            ("x-ratelimit-reset", self.reset),
        ] {
            headers.insert(HeaderName::from_static(name), HeaderValue::from(value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, web};
    use actix_web::test as actix_test;

    #[test]
    fn test_attempts_preset_uses_config() {
        let limit = RateLimit::attempts();
        let config = &AppConfig::get().rate_limit;
        assert_eq!(limit.max_requests, config.attempt_requests);
        assert_eq!(limit.window_secs, config.window_secs);
        assert_eq!(limit.key_prefix, "attempts");
    }

    #[test]
    fn test_window_resets_after_expiry() {
        let start = Instant::now();
        let window = Duration::from_secs(60);
        let used = RateWindow {
            count: 5,
            started: start,
        };

        assert_eq!(used.current(start + Duration::from_secs(30), window).count, 5);
        assert_eq!(used.current(start + Duration::from_secs(60), window).count, 0);
        assert_eq!(used.retry_after(start + Duration::from_secs(45), window), 15);
    }

    #[actix_web::test]
    async fn test_requests_over_limit_are_rejected() {
        let app = actix_test::init_service(
            App::new().service(
                web::scope("/limited")
                    .wrap(RateLimit::new(2, 60).with_prefix("test_over_limit"))
                    .route("", web::post().to(|| async { HttpResponse::Ok().finish() })),
            ),
        )
        .await;

        for _ in 0..2 {
            let req = actix_test::TestRequest::post().uri("/limited").to_request();
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            assert!(resp.headers().contains_key("x-ratelimit-remaining"));
        }

        let req = actix_test::TestRequest::post().uri("/limited").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(resp.headers().contains_key("Retry-After"));
    }
}
