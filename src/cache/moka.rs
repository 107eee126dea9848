use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use moka::sync::Cache;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::cache::SlotCache;
use crate::config::CacheConfig;
use crate::scheduling::TimeSlot;

type DayKey = (Uuid, NaiveDate);

#[derive(Clone)]
struct CachedDay {
    revision: u64,
    slots: Arc<Vec<TimeSlot>>,
}

/// 基于 moka 的时段缓存
///
/// 按组织失效走 moka 的失效闭包：注册之前写入的条目立刻对 `get` 不可见，
/// 真正的清理交给 moka 后台维护，容量只受 `max_capacity` 约束。
pub struct MokaSlotCache {
    inner: Cache<DayKey, CachedDay>,
}

impl MokaSlotCache {
    pub fn new(config: &CacheConfig) -> Self {
        let inner = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.ttl_secs))
            .support_invalidation_closures()
            .build();

        debug!(
            "MokaSlotCache initialized with max capacity: {}, TTL: {}s",
            config.max_capacity, config.ttl_secs
        );
        Self { inner }
    }
}

impl SlotCache for MokaSlotCache {
    fn get(
        &self,
        organization_id: Uuid,
        date: NaiveDate,
        revision: u64,
    ) -> Option<Arc<Vec<TimeSlot>>> {
        let hit = self
            .inner
            .get(&(organization_id, date))
            .filter(|day| day.revision == revision)
            .map(|day| day.slots);
        trace!(
            "Slot cache {} for {} on {} (rev {})",
            if hit.is_some() { "hit" } else { "miss" },
            organization_id,
            date,
            revision
        );
        hit
    }

    fn insert(
        &self,
        organization_id: Uuid,
        date: NaiveDate,
        revision: u64,
        slots: Arc<Vec<TimeSlot>>,
    ) {
        self.inner
            .insert((organization_id, date), CachedDay { revision, slots });
    }

    fn invalidate_organization(&self, organization_id: Uuid) {
        match self
            .inner
            .invalidate_entries_if(move |(org, _), _| *org == organization_id)
        {
            Ok(_) => debug!("Invalidated cached days for organization {}", organization_id),
            Err(e) => {
                // 失效闭包注册失败时退化为整体清空
                warn!(
                    "Failed to register invalidation for organization {}: {}, clearing cache",
                    organization_id, e
                );
                self.inner.invalidate_all();
            }
        }
    }

    fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    fn name(&self) -> &'static str {
        "moka"
    }

    fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }
}
