//! 组织营业时间配置

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use ts_rs::TS;

use crate::api::services::types::TS_EXPORT_PATH;
use crate::config::BookingConfig;
use crate::errors::{FieldError, Result, SlotbookError};

use super::time::{ClockTime, DayOfWeek};

pub const MIN_SLOT_DURATION: u32 = 5;
pub const MAX_SLOT_DURATION: u32 = 8 * 60;
pub const MAX_BREAK_BETWEEN_SLOTS: u32 = 4 * 60;

/// 某个星期几的营业时间
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct BusinessHours {
    pub day: DayOfWeek,
    #[ts(type = "string")]
    pub start: ClockTime,
    #[ts(type = "string")]
    pub end: ClockTime,
    pub is_open: bool,
}

/// 组织的预约设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSettings {
    pub business_hours: Vec<BusinessHours>,
    /// 单个时段长度（分钟）
    pub slot_duration: u32,
    /// 相邻时段之间的间隔（分钟）
    #[serde(default)]
    pub break_between_slots: u32,
    #[serde(default = "Utc::now")]
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl OrganizationSettings {
    /// 按配置生成新组织的默认设置
    pub fn from_defaults(config: &BookingConfig) -> Self {
        let business_hours = DayOfWeek::iter()
            .map(|day| BusinessHours {
                day,
                start: config.default_open_time,
                end: config.default_close_time,
                is_open: !day.is_weekend() || config.default_open_weekends,
            })
            .collect();

        Self {
            business_hours,
            slot_duration: config.default_slot_duration,
            break_between_slots: config.default_break_between_slots,
            updated_at: Utc::now(),
        }
    }

    pub fn hours_for(&self, day: DayOfWeek) -> Option<&BusinessHours> {
        self.business_hours.iter().find(|h| h.day == day)
    }

    /// 校验设置，收集所有字段错误后一次性返回
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.business_hours.len() != 7 {
            errors.push(FieldError::new(
                "businessHours",
                "Business hours must contain exactly 7 entries",
            ));
        }

        let mut seen = HashSet::new();
        for (idx, hours) in self.business_hours.iter().enumerate() {
            if !seen.insert(hours.day) {
                errors.push(FieldError::new(
                    format!("businessHours[{}].day", idx),
                    format!("Duplicate entry for {}", hours.day),
                ));
            }
            if hours.is_open && hours.start >= hours.end {
                errors.push(FieldError::new(
                    format!("businessHours[{}].end", idx),
                    "Closing time must be after opening time",
                ));
            }
        }

        if !(MIN_SLOT_DURATION..=MAX_SLOT_DURATION).contains(&self.slot_duration) {
            errors.push(FieldError::new(
                "slotDuration",
                format!(
                    "Slot duration must be between {} and {} minutes",
                    MIN_SLOT_DURATION, MAX_SLOT_DURATION
                ),
            ));
        }

        if self.break_between_slots > MAX_BREAK_BETWEEN_SLOTS {
            errors.push(FieldError::new(
                "breakBetweenSlots",
                format!(
                    "Break between slots must be at most {} minutes",
                    MAX_BREAK_BETWEEN_SLOTS
                ),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SlotbookError::validation_fields(
                "Invalid organization settings",
                errors,
            ))
        }
    }
}
