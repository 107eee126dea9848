//! 按日期汇总时段状态

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::api::services::types::TS_EXPORT_PATH;
use crate::errors::{FieldError, Result, SlotbookError};

use super::slots::TimeSlot;

/// 单日汇总
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct DayStatus {
    #[ts(type = "string")]
    pub date: NaiveDate,
    pub total_slots: usize,
    pub available_slots: usize,
    pub is_locked: bool,
}

/// 汇总一天已修正过可用性的时段
pub fn aggregate_day(date: NaiveDate, slots: &[TimeSlot], is_locked: bool) -> DayStatus {
    DayStatus {
        date,
        total_slots: slots.len(),
        available_slots: slots.iter().filter(|s| s.is_available).count(),
        is_locked,
    }
}

/// 展开 `[from, to]` 闭区间内的日期，跨度不得超过 `max_days`
pub fn date_range(from: NaiveDate, to: NaiveDate, max_days: u32) -> Result<Vec<NaiveDate>> {
    if from > to {
        return Err(SlotbookError::validation_fields(
            "Invalid date range",
            vec![FieldError::new("to", "End date must not be before start date")],
        ));
    }

    let span = (to - from).num_days() + 1;
    if span > i64::from(max_days) {
        return Err(SlotbookError::validation_fields(
            "Invalid date range",
            vec![FieldError::new(
                "to",
                format!("Date range must not exceed {} days", max_days),
            )],
        ));
    }

    Ok(from.iter_days().take(span as usize).collect())
}
