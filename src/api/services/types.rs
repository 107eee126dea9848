//! API 类型定义
//!
//! 请求/响应 DTO。带 `TS` 的类型会导出到前端的 TypeScript 定义文件。

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::errors::FieldError;
use crate::scheduling::{DayStatus, OrganizationSettings};
use crate::storage::{AppointmentStatus, Role, SlotTime, User};

/// 输出目录常量
pub const TS_EXPORT_PATH: &str = "../web/src/services/types.generated.ts";

/// 统一响应信封
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

// ============ Auth ============

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct RegisterBody {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// 对外展示的用户信息（不含密码哈希）
#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub token: String,
    /// 秒
    #[ts(type = "number")]
    pub expires_in: u64,
    pub user: UserView,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct UpdateProfileBody {
    #[ts(optional)]
    pub name: Option<String>,
    #[ts(optional)]
    pub email: Option<String>,
    #[ts(optional)]
    pub password: Option<String>,
}

// ============ Organizations ============

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct OrganizationSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for OrganizationSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct OrganizationDetail {
    pub organization: OrganizationSummary,
    pub settings: OrganizationSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SlotsQuery {
    pub date: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct StatusQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct StatusRangeView {
    #[ts(type = "string")]
    pub from: NaiveDate,
    #[ts(type = "string")]
    pub to: NaiveDate,
    pub days: Vec<DayStatus>,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct LockDayBody {
    pub date: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct LockedDaysView {
    #[ts(type = "Array<string>")]
    pub dates: Vec<NaiveDate>,
}

// ============ Appointments ============

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentBody {
    pub organization_id: Uuid,
    pub date: String,
    pub time_slot: SlotTime,
    #[ts(optional)]
    pub notes: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct AppointmentListQuery {
    pub status: Option<AppointmentStatus>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct UpdateStatusBody {
    pub status: AppointmentStatus,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct ExportQuery {
    pub format: Option<String>,
}

// ============ Health ============

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct HealthStorageCheck {
    pub status: String,
    #[ts(type = "number")]
    pub users: usize,
    #[ts(type = "number")]
    pub appointments: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct HealthCacheCheck {
    pub status: String,
    pub cache_type: String,
    #[ts(type = "number")]
    pub entries: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct HealthChecks {
    pub storage: HealthStorageCheck,
    pub cache: HealthCacheCheck,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    /// 运行秒数
    pub uptime: u32,
    pub checks: HealthChecks,
    pub response_time_ms: u32,
}
