//! API 路由配置
//!
//! `/api` 下的路由按功能模块拆分。公开路由不挂认证中间件，
//! 其余 scope 统一由 `BearerAuth` 保护。

use actix_web::dev::HttpServiceFactory;
use actix_web::web;

use crate::api::constants::API_PREFIX;
use crate::api::middleware::BearerAuth;

use super::appointments::{
    book_appointment, cancel_appointment, export_appointments, get_appointment,
    list_appointments, update_appointment_status,
};
use super::auth::{login, login_rate_limiter, me, register};
use super::organizations::{
    get_my_settings, get_organization, get_slots, get_status, list_locked_days,
    list_organizations, lock_day, unlock_day, update_my_settings,
};
use super::profile::{get_profile, update_profile};

/// 认证路由 `/auth`
///
/// 包含：
/// - POST /auth/register - 注册
/// - POST /auth/login - 登录（带限流）
/// - GET /auth/me - 当前用户（需认证）
pub fn auth_routes() -> actix_web::Scope {
    web::scope("/auth")
        .route("/register", web::post().to(register))
        .route(
            "/login",
            web::post().to(login).wrap(login_rate_limiter()),
        )
        .route("/me", web::get().to(me).wrap(BearerAuth))
}

/// 个人资料路由 `/profile`
///
/// 整个 scope 挂了 `BearerAuth`，所以返回 `impl HttpServiceFactory`
pub fn profile_routes() -> impl HttpServiceFactory {
    web::scope("/profile")
        .wrap(BearerAuth)
        .route("", web::get().to(get_profile))
        .route("", web::put().to(update_profile))
}

/// 组织路由 `/organizations`
///
/// `/me/...` 必须在 `/{id}` 之前注册
pub fn organization_routes() -> actix_web::Scope {
    web::scope("/organizations")
        .service(
            web::scope("/me")
                .wrap(BearerAuth)
                .route("/settings", web::get().to(get_my_settings))
                .route("/settings", web::put().to(update_my_settings))
                .route("/locked-days", web::get().to(list_locked_days))
                .route("/locked-days", web::post().to(lock_day))
                .route("/locked-days/{date}", web::delete().to(unlock_day)),
        )
        .route("", web::get().to(list_organizations))
        .route("/{id}", web::get().to(get_organization))
        .route("/{id}/slots", web::get().to(get_slots))
        .route("/{id}/status", web::get().to(get_status))
}

/// 预约路由 `/appointments`
///
/// `/export` 必须在 `/{id}` 之前注册
pub fn appointment_routes() -> impl HttpServiceFactory {
    web::scope("/appointments")
        .wrap(BearerAuth)
        .route("", web::get().to(list_appointments))
        .route("", web::post().to(book_appointment))
        .route("/export", web::get().to(export_appointments))
        .route("/{id}", web::get().to(get_appointment))
        .route("/{id}", web::delete().to(cancel_appointment))
        .route("/{id}/status", web::patch().to(update_appointment_status))
}

/// 全部业务路由 `/api`
pub fn api_routes() -> actix_web::Scope {
    web::scope(API_PREFIX)
        .service(auth_routes())
        .service(profile_routes())
        .service(organization_routes())
        .service(appointment_routes())
}
