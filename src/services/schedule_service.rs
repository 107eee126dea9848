//! Schedule service
//!
//! Owns organization settings, slot generation (through the slot cache),
//! availability reconciliation, status aggregation and locked days.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;
use uuid::Uuid;

use crate::api::services::types::TS_EXPORT_PATH;
use crate::cache::SlotCache;
use crate::config::BookingConfig;
use crate::errors::{Result, SlotbookError};
use crate::scheduling::{
    ClockTime, DayStatus, OrganizationSettings, TimeSlot, aggregate_day, date_range,
    generate_slots, reconcile,
};
use crate::storage::{MemoryStore, Role};

/// 某天的时段视图
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct DaySlots {
    #[ts(type = "string")]
    pub date: NaiveDate,
    pub is_locked: bool,
    pub slots: Vec<TimeSlot>,
}

pub struct ScheduleService {
    store: Arc<MemoryStore>,
    cache: Arc<dyn SlotCache>,
    booking: BookingConfig,
}

impl ScheduleService {
    pub fn new(store: Arc<MemoryStore>, cache: Arc<dyn SlotCache>, booking: BookingConfig) -> Self {
        Self {
            store,
            cache,
            booking,
        }
    }

    fn ensure_organization(&self, organization_id: Uuid) -> Result<()> {
        match self.store.get_user(organization_id) {
            Some(user) if user.role == Role::Organization => Ok(()),
            _ => Err(SlotbookError::not_found("Organization not found")),
        }
    }

    /// 组织设置；老数据缺失时回落到默认设置
    pub fn get_settings(&self, organization_id: Uuid) -> Result<OrganizationSettings> {
        self.current_settings(organization_id).map(|(settings, _)| settings)
    }

    /// 设置及其版本号；默认设置的版本号为 0
    fn current_settings(&self, organization_id: Uuid) -> Result<(OrganizationSettings, u64)> {
        self.ensure_organization(organization_id)?;
        Ok(self
            .store
            .settings_with_revision(organization_id)
            .unwrap_or_else(|| (OrganizationSettings::from_defaults(&self.booking), 0)))
    }

    /// 更新设置并丢弃该组织的全部时段缓存
    pub fn update_settings(
        &self,
        organization_id: Uuid,
        mut settings: OrganizationSettings,
    ) -> Result<OrganizationSettings> {
        self.ensure_organization(organization_id)?;
        settings.validate()?;
        settings.business_hours.sort_by_key(|h| h.day);
        settings.updated_at = Utc::now();

        let revision = self.store.put_settings(organization_id, settings.clone());
        self.cache.invalidate_organization(organization_id);

        info!(
            "Organization {} updated settings (rev {}): {} min slots, {} min break",
            organization_id, revision, settings.slot_duration, settings.break_between_slots
        );
        Ok(settings)
    }

    /// 生成（或从缓存读取）某天的原始时段
    ///
    /// 缓存按 `revision` 读写：旧设置生成的时段即使在更新后才写回缓存，
    /// 也不会被新版本的读取命中。
    fn generated_slots(
        &self,
        organization_id: Uuid,
        (settings, revision): &(OrganizationSettings, u64),
        date: NaiveDate,
    ) -> Arc<Vec<TimeSlot>> {
        if let Some(slots) = self.cache.get(organization_id, date, *revision) {
            return slots;
        }

        let slots = Arc::new(generate_slots(date, settings));
        debug!(
            "Generated {} slot(s) for organization {} on {}",
            slots.len(),
            organization_id,
            date
        );
        self.cache
            .insert(organization_id, date, *revision, slots.clone());
        slots
    }

    fn reconciled(
        &self,
        organization_id: Uuid,
        settings: &(OrganizationSettings, u64),
        date: NaiveDate,
    ) -> (Vec<TimeSlot>, bool) {
        let generated = self.generated_slots(organization_id, settings, date);
        let locked = self.store.is_locked(organization_id, date);
        let booked = self.store.booked_slots(organization_id, date);
        (reconcile(generated.as_ref().clone(), &booked, locked), locked)
    }

    /// 某天的时段及其可用性
    pub fn slots_for_date(&self, organization_id: Uuid, date: NaiveDate) -> Result<DaySlots> {
        let settings = self.current_settings(organization_id)?;
        let (slots, is_locked) = self.reconciled(organization_id, &settings, date);
        Ok(DaySlots {
            date,
            is_locked,
            slots,
        })
    }

    /// 查找某天是否提供 `[start, end)` 这个时段（不考虑可用性）
    pub fn offered_slot(
        &self,
        organization_id: Uuid,
        date: NaiveDate,
        start: ClockTime,
        end: ClockTime,
    ) -> Result<Option<TimeSlot>> {
        let settings = self.current_settings(organization_id)?;
        Ok(self
            .generated_slots(organization_id, &settings, date)
            .iter()
            .find(|s| s.start == start && s.end == end)
            .cloned())
    }

    /// `[from, to]` 内每天的时段汇总
    pub fn status_range(
        &self,
        organization_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DayStatus>> {
        let settings = self.current_settings(organization_id)?;
        let days = date_range(from, to, self.booking.max_status_range_days)?;

        Ok(days
            .into_iter()
            .map(|date| {
                let (slots, locked) = self.reconciled(organization_id, &settings, date);
                aggregate_day(date, &slots, locked)
            })
            .collect())
    }

    pub fn is_locked(&self, organization_id: Uuid, date: NaiveDate) -> bool {
        self.store.is_locked(organization_id, date)
    }

    /// 锁定某天（幂等），返回锁定后的全部日期
    pub fn lock_day(&self, organization_id: Uuid, date: NaiveDate) -> Result<Vec<NaiveDate>> {
        self.ensure_organization(organization_id)?;
        if self.store.lock_day(organization_id, date) {
            info!("Organization {} locked {}", organization_id, date);
        }
        Ok(self.store.locked_days(organization_id))
    }

    /// 解锁某天（幂等），返回解锁后的全部日期
    pub fn unlock_day(&self, organization_id: Uuid, date: NaiveDate) -> Result<Vec<NaiveDate>> {
        self.ensure_organization(organization_id)?;
        if self.store.unlock_day(organization_id, date) {
            info!("Organization {} unlocked {}", organization_id, date);
        }
        Ok(self.store.locked_days(organization_id))
    }

    pub fn locked_days(&self, organization_id: Uuid) -> Result<Vec<NaiveDate>> {
        self.ensure_organization(organization_id)?;
        Ok(self.store.locked_days(organization_id))
    }

    pub fn cache(&self) -> &Arc<dyn SlotCache> {
        &self.cache
    }
}
