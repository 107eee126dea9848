//! 时段生成

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::api::services::types::TS_EXPORT_PATH;

use super::settings::OrganizationSettings;
use super::time::{ClockTime, DayOfWeek};

/// 一个可预约的时间段 `[start, end)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub id: String,
    #[ts(type = "string")]
    pub start: ClockTime,
    #[ts(type = "string")]
    pub end: ClockTime,
    pub is_available: bool,
}

/// 时段 id：`{date}_{start}`，同一天内唯一且稳定
pub fn slot_id(date: NaiveDate, start: ClockTime) -> String {
    format!("{}_{}", date.format("%Y-%m-%d"), start)
}

/// 按营业时间生成某天的全部时段
///
/// 当天不营业（或缺少当天配置）时返回空列表。从开门时间开始，每次产出
/// 长度为 `slot_duration` 的时段，再前进 `slot_duration + break_between_slots`，
/// 直到下一个时段会超过关门时间。
pub fn generate_slots(date: NaiveDate, settings: &OrganizationSettings) -> Vec<TimeSlot> {
    let day = DayOfWeek::from(date.weekday());
    let Some(hours) = settings.hours_for(day) else {
        return Vec::new();
    };
    if !hours.is_open || settings.slot_duration == 0 {
        return Vec::new();
    }

    let duration = settings.slot_duration;
    let step = duration + settings.break_between_slots;
    let close = hours.end.minutes();

    let mut slots = Vec::new();
    let mut cursor = hours.start.minutes();
    while cursor + duration <= close {
        // close ≤ 24:00，所以两端都一定能构造成功
        let (Some(start), Some(end)) = (
            ClockTime::from_minutes(cursor),
            ClockTime::from_minutes(cursor + duration),
        ) else {
            break;
        };
        slots.push(TimeSlot {
            id: slot_id(date, start),
            start,
            end,
            is_available: true,
        });
        cursor += step;
    }

    slots
}
