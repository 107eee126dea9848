use std::fmt;

use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};

/// 字段级校验错误，随 400 响应一起返回
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum SlotbookError {
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    PasswordHash(String),
    Token(String),
    Serialization(String),
    Config(String),
    Internal(String),
}

impl SlotbookError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            SlotbookError::Validation { .. } => "E001",
            SlotbookError::Unauthorized(_) => "E002",
            SlotbookError::Forbidden(_) => "E003",
            SlotbookError::NotFound(_) => "E004",
            SlotbookError::Conflict(_) => "E005",
            SlotbookError::PasswordHash(_) => "E006",
            SlotbookError::Token(_) => "E007",
            SlotbookError::Serialization(_) => "E008",
            SlotbookError::Config(_) => "E009",
            SlotbookError::Internal(_) => "E010",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            SlotbookError::Validation { .. } => "Validation Error",
            SlotbookError::Unauthorized(_) => "Unauthorized",
            SlotbookError::Forbidden(_) => "Forbidden",
            SlotbookError::NotFound(_) => "Resource Not Found",
            SlotbookError::Conflict(_) => "Conflict",
            SlotbookError::PasswordHash(_) => "Password Hash Error",
            SlotbookError::Token(_) => "Token Error",
            SlotbookError::Serialization(_) => "Serialization Error",
            SlotbookError::Config(_) => "Configuration Error",
            SlotbookError::Internal(_) => "Internal Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            SlotbookError::Validation { message, .. } => message,
            SlotbookError::Unauthorized(msg)
            | SlotbookError::Forbidden(msg)
            | SlotbookError::NotFound(msg)
            | SlotbookError::Conflict(msg)
            | SlotbookError::PasswordHash(msg)
            | SlotbookError::Token(msg)
            | SlotbookError::Serialization(msg)
            | SlotbookError::Config(msg)
            | SlotbookError::Internal(msg) => msg,
        }
    }

    /// 字段错误（仅 Validation 变体携带）
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            SlotbookError::Validation { fields, .. } => fields,
            _ => &[],
        }
    }

    /// HTTP 状态码映射
    ///
    /// 内部错误（哈希、签发 token、序列化、配置）统一映射为 500。
    pub fn http_status(&self) -> StatusCode {
        match self {
            SlotbookError::Validation { .. } => StatusCode::BAD_REQUEST,
            SlotbookError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            SlotbookError::Forbidden(_) => StatusCode::FORBIDDEN,
            SlotbookError::NotFound(_) => StatusCode::NOT_FOUND,
            SlotbookError::Conflict(_) => StatusCode::CONFLICT,
            SlotbookError::PasswordHash(_)
            | SlotbookError::Token(_)
            | SlotbookError::Serialization(_)
            | SlotbookError::Config(_)
            | SlotbookError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于启动失败时的终端提示）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for SlotbookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for SlotbookError {}

// 便捷的构造函数
impl SlotbookError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        SlotbookError::Validation {
            message: msg.into(),
            fields: Vec::new(),
        }
    }

    pub fn validation_fields<T: Into<String>>(msg: T, fields: Vec<FieldError>) -> Self {
        SlotbookError::Validation {
            message: msg.into(),
            fields,
        }
    }

    /// 单字段校验错误，message 同时作为整体消息
    pub fn invalid_field(field: &str, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        SlotbookError::Validation {
            message: msg.clone(),
            fields: vec![FieldError::new(field, msg)],
        }
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        SlotbookError::Unauthorized(msg.into())
    }

    pub fn forbidden<T: Into<String>>(msg: T) -> Self {
        SlotbookError::Forbidden(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        SlotbookError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        SlotbookError::Conflict(msg.into())
    }

    pub fn password_hash<T: Into<String>>(msg: T) -> Self {
        SlotbookError::PasswordHash(msg.into())
    }

    pub fn token<T: Into<String>>(msg: T) -> Self {
        SlotbookError::Token(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        SlotbookError::Serialization(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        SlotbookError::Config(msg.into())
    }

    pub fn internal<T: Into<String>>(msg: T) -> Self {
        SlotbookError::Internal(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<serde_json::Error> for SlotbookError {
    fn from(err: serde_json::Error) -> Self {
        SlotbookError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for SlotbookError {
    fn from(err: csv::Error) -> Self {
        SlotbookError::Serialization(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for SlotbookError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        SlotbookError::Token(err.to_string())
    }
}

impl From<crate::utils::password::PasswordError> for SlotbookError {
    fn from(err: crate::utils::password::PasswordError) -> Self {
        SlotbookError::PasswordHash(err.to_string())
    }
}

impl From<config::ConfigError> for SlotbookError {
    fn from(err: config::ConfigError) -> Self {
        SlotbookError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SlotbookError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            SlotbookError::validation("bad").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SlotbookError::unauthorized("no").http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            SlotbookError::not_found("gone").http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            SlotbookError::conflict("taken").http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            SlotbookError::password_hash("boom").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invalid_field_carries_field_error() {
        let err = SlotbookError::invalid_field("email", "Email is required");
        assert_eq!(err.message(), "Email is required");
        assert_eq!(
            err.field_errors(),
            &[FieldError::new("email", "Email is required")]
        );
    }

    #[test]
    fn test_non_validation_has_no_field_errors() {
        assert!(SlotbookError::internal("x").field_errors().is_empty());
    }

    #[test]
    fn test_display_uses_simple_format() {
        let err = SlotbookError::not_found("Appointment not found");
        assert_eq!(err.to_string(), "Resource Not Found: Appointment not found");
    }
}
