//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};
use ts_rs::TS;

use crate::errors::SlotbookError;

use super::types::TS_EXPORT_PATH;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字，ts-rs 自动生成 TypeScript 类型。
/// 按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: 认证错误
/// - 4000-4099: 导出错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[ts(rename = "ErrorCode")]
#[ts(repr(enum))]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    ValidationFailed = 1002,
    Forbidden = 1003,
    NotFound = 1004,
    InternalServerError = 1005,
    Conflict = 1009,
    ServiceUnavailable = 1030,

    // 认证错误 2000-2099
    TokenInvalid = 2002,

    // 导出错误 4000-4099
    ExportFailed = 4001,
}

impl From<&SlotbookError> for ErrorCode {
    fn from(err: &SlotbookError) -> Self {
        match err {
            SlotbookError::Validation { .. } => ErrorCode::ValidationFailed,
            SlotbookError::Unauthorized(_) => ErrorCode::Unauthorized,
            SlotbookError::Forbidden(_) => ErrorCode::Forbidden,
            SlotbookError::NotFound(_) => ErrorCode::NotFound,
            SlotbookError::Conflict(_) => ErrorCode::Conflict,
            SlotbookError::Token(_) => ErrorCode::TokenInvalid,
            SlotbookError::Serialization(_) => ErrorCode::ExportFailed,
            SlotbookError::PasswordHash(_)
            | SlotbookError::Config(_)
            | SlotbookError::Internal(_) => ErrorCode::InternalServerError,
        }
    }
}
