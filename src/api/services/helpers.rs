//! API 帮助函数

use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{error, warn};

use crate::api::constants::JSON_CONTENT_TYPE;
use crate::errors::{FieldError, SlotbookError};
use crate::services::AuthUser;
use crate::storage::Role;

use super::error_code::ErrorCode;
use super::types::ApiResponse;

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
    errors: Vec<FieldError>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", JSON_CONTENT_TYPE))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
            errors,
        })
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data), Vec::new())
}

/// 构建 201 Created 响应
pub fn created_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(
        StatusCode::CREATED,
        ErrorCode::Success,
        "Created",
        Some(data),
        Vec::new(),
    )
}

/// 构建错误响应
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None, Vec::new())
}

/// 从 SlotbookError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
pub fn error_from_slotbook(err: &SlotbookError) -> HttpResponse {
    let status = err.http_status();
    if status.is_server_error() {
        error!("Request failed: {}", err);
    } else {
        warn!("Request rejected: {}", err);
    }
    json_response::<()>(
        status,
        ErrorCode::from(err),
        err.message(),
        None,
        err.field_errors().to_vec(),
    )
}

/// 统一 Result → HttpResponse 转换
///
/// 成功时返回 200 OK + JSON 数据，失败时自动映射 SlotbookError。
pub fn api_result<T, E>(result: Result<T, E>) -> HttpResponse
where
    T: Serialize,
    E: Into<SlotbookError>,
{
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_from_slotbook(&e.into()),
    }
}

/// 要求调用者具有指定角色，否则 403
pub fn require_role(caller: AuthUser, role: Role) -> Result<(), SlotbookError> {
    if caller.role == role {
        Ok(())
    } else {
        Err(SlotbookError::forbidden(format!(
            "This endpoint is only available to {} accounts",
            role
        )))
    }
}

/// 解析 `YYYY-MM-DD` 格式的日期参数
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, SlotbookError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        SlotbookError::invalid_field(
            field,
            format!("Invalid date '{}', expected YYYY-MM-DD", value),
        )
    })
}

/// 必填的日期参数
pub fn require_date(field: &str, value: Option<&str>) -> Result<NaiveDate, SlotbookError> {
    match value {
        Some(v) => parse_date(field, v),
        None => Err(SlotbookError::invalid_field(
            field,
            format!("Query parameter '{}' is required", field),
        )),
    }
}

/// 可选的日期参数
pub fn optional_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, SlotbookError> {
    value.map(|v| parse_date(field, v)).transpose()
}

/// JSON 请求体解析失败时返回统一信封而不是纯文本
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        warn!("Malformed JSON body: {}", message);
        let response = json_response::<()>(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            format!("Invalid request body: {}", message),
            None,
            Vec::new(),
        );
        InternalError::from_response(err, response).into()
    })
}

/// 查询参数解析失败时同样返回统一信封
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        let response = json_response::<()>(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            format!("Invalid query string: {}", message),
            None,
            Vec::new(),
        );
        InternalError::from_response(err, response).into()
    })
}

/// 路径参数解析失败（如非法 UUID）按 404 处理
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        let response = error_response(StatusCode::NOT_FOUND, ErrorCode::NotFound, "Not Found");
        InternalError::from_response(err, response).into()
    })
}
