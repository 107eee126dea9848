use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::scheduling::TimeSlot;

/// 已生成（尚未修正可用性）的时段缓存
///
/// 缓存值只依赖组织设置，不依赖预约状态，所以预约/取消不需要失效缓存。
/// 每个条目都带着生成时所用设置的 `revision`，读取时版本不一致视为未命中，
/// 这样设置更新期间并发写回的旧时段不会被后续读取拿到。
pub trait SlotCache: Send + Sync {
    fn get(
        &self,
        organization_id: Uuid,
        date: NaiveDate,
        revision: u64,
    ) -> Option<Arc<Vec<TimeSlot>>>;

    fn insert(
        &self,
        organization_id: Uuid,
        date: NaiveDate,
        revision: u64,
        slots: Arc<Vec<TimeSlot>>,
    );

    /// 丢弃该组织的全部缓存
    fn invalidate_organization(&self, organization_id: Uuid);

    fn invalidate_all(&self);

    /// 缓存实现名称（用于日志与健康检查）
    fn name(&self) -> &'static str;

    fn entry_count(&self) -> u64 {
        0
    }
}
