use std::sync::Arc;

use actix_web::web;
use tracing::{debug, info};

use crate::api::services::{
    AppStartTime, api_routes, health_routes, json_config, path_config, query_config,
};
use crate::cache::{SlotCache, SlotCacheFactory};
use crate::config::StaticConfig;
use crate::services::{AppointmentService, ScheduleService, UserService};
use crate::storage::{MemoryStore, StorageFactory};

/// 服务器运行所需的共享组件
///
/// 每个 worker 的 `App` 通过 [`StartupContext::configure`] 注册同一组实例。
#[derive(Clone)]
pub struct StartupContext {
    pub store: Arc<MemoryStore>,
    pub cache: Arc<dyn SlotCache>,
    pub user_service: Arc<UserService>,
    pub schedule_service: Arc<ScheduleService>,
    pub appointment_service: Arc<AppointmentService>,
    pub app_start_time: AppStartTime,
}

impl StartupContext {
    /// 基于给定 store 组装 service
    pub fn with_store(config: &StaticConfig, store: Arc<MemoryStore>) -> Self {
        let cache = SlotCacheFactory::create(&config.cache);
        let user_service = Arc::new(UserService::new(store.clone(), config.booking.clone()));
        let schedule_service = Arc::new(ScheduleService::new(
            store.clone(),
            cache.clone(),
            config.booking.clone(),
        ));
        let appointment_service = Arc::new(AppointmentService::new(
            store.clone(),
            schedule_service.clone(),
            config.booking.clone(),
        ));

        Self {
            store,
            cache,
            user_service,
            schedule_service,
            appointment_service,
            app_start_time: AppStartTime::now(),
        }
    }

    /// 注册 app_data、提取器配置与全部路由
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.store.clone()))
            .app_data(web::Data::new(self.cache.clone()))
            .app_data(web::Data::new(self.user_service.clone()))
            .app_data(web::Data::new(self.schedule_service.clone()))
            .app_data(web::Data::new(self.appointment_service.clone()))
            .app_data(web::Data::new(self.app_start_time.clone()))
            .app_data(json_config())
            .app_data(query_config())
            .app_data(path_config())
            .service(health_routes())
            .service(api_routes());
    }
}

/// 准备服务器启动的上下文
pub fn prepare_server_startup(config: &StaticConfig) -> StartupContext {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let context = StartupContext::with_store(config, StorageFactory::create());

    info!(
        "Pre-startup completed in {} ms (slot cache: {}, slot duration default: {} min)",
        start_time.elapsed().as_millis(),
        context.cache.name(),
        config.booking.default_slot_duration
    );
    context
}
