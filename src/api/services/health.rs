use actix_web::{HttpResponse, Responder, web};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, trace};

use crate::api::constants::JSON_CONTENT_TYPE;
use crate::cache::SlotCache;
use crate::storage::MemoryStore;

use super::error_code::ErrorCode;
use super::types::{ApiResponse, HealthCacheCheck, HealthChecks, HealthResponse, HealthStorageCheck};

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

impl AppStartTime {
    pub fn now() -> Self {
        Self {
            start_datetime: chrono::Utc::now(),
        }
    }
}

/// Health Service
///
/// 直接读取 store 与 cache 的计数，不经过业务 service。
pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        store: web::Data<Arc<MemoryStore>>,
        cache: web::Data<Arc<dyn SlotCache>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        let storage = HealthStorageCheck {
            status: "healthy".to_string(),
            users: store.user_count(),
            appointments: store.appointment_count(),
        };

        let cache = HealthCacheCheck {
            status: "healthy".to_string(),
            cache_type: cache.name().to_string(),
            entries: cache.entry_count(),
        };

        let now = chrono::Utc::now();
        let uptime_seconds = (now - app_start_time.start_datetime).num_seconds().max(0) as u32;

        let health_data = HealthResponse {
            status: "healthy".to_string(),
            timestamp: now.to_rfc3339(),
            uptime: uptime_seconds,
            checks: HealthChecks { storage, cache },
            response_time_ms: start_time.elapsed().as_millis() as u32,
        };

        info!(
            "Health check completed in {:?}, uptime: {}s",
            start_time.elapsed(),
            uptime_seconds
        );

        HttpResponse::Ok()
            .append_header(("Content-Type", JSON_CONTENT_TYPE))
            .json(ApiResponse {
                code: ErrorCode::Success as i32,
                message: "OK".to_string(),
                data: Some(health_data),
                errors: Vec::new(),
            })
    }

    // 简单的就绪检查，只返回 200 状态码
    pub async fn readiness_check() -> impl Responder {
        trace!("Received readiness check request");

        HttpResponse::Ok()
            .append_header(("Content-Type", "text/plain"))
            .body("OK")
    }

    // 活跃性检查
    pub async fn liveness_check() -> impl Responder {
        trace!("Received liveness check request");

        HttpResponse::NoContent().finish()
    }
}

/// Health 路由配置
pub fn health_routes() -> actix_web::Scope {
    web::scope(crate::api::constants::HEALTH_PREFIX)
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/ready", web::get().to(HealthService::readiness_check))
        .route("/ready", web::head().to(HealthService::readiness_check))
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
}
