//! 可用性修正：把已预约时段和锁定日合并进生成的时段

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::slots::TimeSlot;
use super::time::ClockTime;

/// 已预约索引中的一条记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedSlot {
    pub appointment_id: Uuid,
    pub start: ClockTime,
    pub end: ClockTime,
}

impl BookedSlot {
    pub fn matches(&self, start: ClockTime, end: ClockTime) -> bool {
        self.start == start && self.end == end
    }
}

/// 根据已预约记录和锁定标记修正时段的可用性
///
/// 锁定日的所有时段都不可用；否则只有 `(start, end)` 与某条预约记录完全
/// 相同的时段被标记为不可用，其余时段保持原样。
pub fn reconcile(mut slots: Vec<TimeSlot>, booked: &[BookedSlot], locked: bool) -> Vec<TimeSlot> {
    for slot in slots.iter_mut() {
        if locked || booked.iter().any(|b| b.matches(slot.start, slot.end)) {
            slot.is_available = false;
        }
    }
    slots
}
