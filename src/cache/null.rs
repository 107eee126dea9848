use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::cache::SlotCache;
use crate::scheduling::TimeSlot;

/// 关闭缓存时使用：每次读取都重新生成
#[derive(Default)]
pub struct NullSlotCache;

impl SlotCache for NullSlotCache {
    fn get(
        &self,
        _organization_id: Uuid,
        _date: NaiveDate,
        _revision: u64,
    ) -> Option<Arc<Vec<TimeSlot>>> {
        None
    }

    fn insert(
        &self,
        _organization_id: Uuid,
        _date: NaiveDate,
        _revision: u64,
        _slots: Arc<Vec<TimeSlot>>,
    ) {
    }

    fn invalidate_organization(&self, _organization_id: Uuid) {}

    fn invalidate_all(&self) {}

    fn name(&self) -> &'static str {
        "null"
    }
}
