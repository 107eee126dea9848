//! 认证相关端点：注册、登录、当前用户

use actix_governor::{Governor, GovernorConfigBuilder, KeyExtractor, SimpleKeyExtractionError};
use actix_web::dev::ServiceRequest;
use actix_web::{HttpResponse, Responder, Result as ActixResult, web};
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tracing::debug;

use crate::api::jwt::get_jwt_service;
use crate::config::get_config;
use crate::errors::SlotbookError;
use crate::services::{AuthUser, RegisterRequest, UserService};
use crate::storage::User;

use super::helpers::{api_result, created_response, error_from_slotbook};
use super::types::{AuthPayload, LoginBody, RegisterBody, UserView};

/// 基于连接 IP 的限流 key 提取器
///
/// 只用 TCP peer address，不信任 X-Forwarded-For。
#[derive(Clone, Copy)]
pub struct LoginKeyExtractor;

impl KeyExtractor for LoginKeyExtractor {
    type Key = String;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        req.connection_info()
            .peer_addr()
            .map(str::to_string)
            .ok_or_else(|| SimpleKeyExtractionError::new("Unable to extract peer IP"))
    }
}

/// 创建登录限流器，参数来自 `[auth]` 配置
///
/// 超限返回 HTTP 429 Too Many Requests
pub fn login_rate_limiter() -> Governor<LoginKeyExtractor, NoOpMiddleware> {
    let config = get_config();
    let seconds = config.auth.login_seconds_per_request.max(1);
    let burst = config.auth.login_burst_size.max(1);

    let governor_config = GovernorConfigBuilder::default()
        .seconds_per_request(seconds)
        .burst_size(burst)
        .key_extractor(LoginKeyExtractor)
        .finish()
        .expect("rate limit period and burst are clamped to at least 1");

    debug!(
        "Login rate limiter created: 1 req / {}s, burst {}",
        seconds, burst
    );
    Governor::new(&governor_config)
}

/// 为用户签发 token 并组装响应体
fn issue_token(user: &User) -> Result<AuthPayload, SlotbookError> {
    let jwt = get_jwt_service();
    let token = jwt.generate_access_token(AuthUser::from(user))?;
    Ok(AuthPayload {
        token,
        expires_in: jwt.access_token_minutes() * 60,
        user: UserView::from(user),
    })
}

/// POST /api/auth/register
pub async fn register(
    users: web::Data<Arc<UserService>>,
    body: web::Json<RegisterBody>,
) -> ActixResult<impl Responder> {
    let body = body.into_inner();
    let result = users
        .register(RegisterRequest {
            name: body.name,
            email: body.email,
            password: body.password,
            role: body.role,
        })
        .and_then(|user| issue_token(&user));

    Ok(match result {
        Ok(payload) => created_response(payload),
        Err(e) => error_from_slotbook(&e),
    })
}

/// POST /api/auth/login
pub async fn login(
    users: web::Data<Arc<UserService>>,
    body: web::Json<LoginBody>,
) -> ActixResult<impl Responder> {
    let result = users
        .authenticate(&body.email, &body.password)
        .and_then(|user| issue_token(&user));
    Ok(api_result(result))
}

/// GET /api/auth/me
pub async fn me(
    caller: AuthUser,
    users: web::Data<Arc<UserService>>,
) -> ActixResult<HttpResponse> {
    Ok(api_result(
        users.get_profile(caller.id).map(|u| UserView::from(&u)),
    ))
}
