use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter};
use ts_rs::TS;
use uuid::Uuid;

use crate::api::services::types::TS_EXPORT_PATH;
use crate::scheduling::ClockTime;

/// 用户角色
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, EnumIter, AsRefStr,
)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    /// 服务提供方，配置营业时间
    Organization,
    /// 客户，预约时段
    Individual,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl std::str::FromStr for Role {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "organization" => Ok(Self::Organization),
            "individual" => Ok(Self::Individual),
            _ => Err(format!(
                "Invalid role: '{}'. Valid: organization, individual",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// 已规范化（小写）
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// 预约状态
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, EnumIter, AsRefStr,
)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl AppointmentStatus {
    /// 是否占用时段
    pub fn occupies_slot(self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// 允许的状态流转：pending → confirmed，pending/confirmed → cancelled
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending, Self::Cancelled)
                | (Self::Confirmed, Self::Cancelled)
        )
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// 预约占用的时间段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct SlotTime {
    #[ts(type = "string")]
    pub start: ClockTime,
    #[ts(type = "string")]
    pub end: ClockTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub individual_id: Uuid,
    pub date: NaiveDate,
    pub time_slot: SlotTime,
    pub status: AppointmentStatus,
    pub notes: String,
    /// 组织内的流水号，从 1 开始
    #[ts(type = "number")]
    pub number: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// 用户是否为该预约的任一参与方
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.organization_id == user_id || self.individual_id == user_id
    }
}
