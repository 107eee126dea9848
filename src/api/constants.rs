//! API 模块常量定义

/// 所有业务接口的前缀
pub const API_PREFIX: &str = "/api";

/// 健康检查前缀
pub const HEALTH_PREFIX: &str = "/health";

/// 请求 ID 响应头
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// JSON 响应的 Content-Type
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
