//! 内存存储
//!
//! 所有状态都放在 `DashMap` 里。需要"检查后写入"的操作（邮箱唯一、同一时段
//! 只能被预约一次、取消时同步清理预约索引）都在对应 entry 的锁内完成。
//!
//! 锁顺序：`appointments` → `booked` → (`users` / `settings` / `locked_days`)。
//! 预约流程先在 `booked` 内完成检查与占位，释放后才写 `appointments`，因此
//! 不会反向持锁。锁定某天同样先占住 `booked` 的 entry 再写 `locked_days`，
//! 与预约互斥。

use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::errors::{Result, SlotbookError};
use crate::scheduling::{BookedSlot, OrganizationSettings};

use super::models::{Appointment, AppointmentStatus, Role, User};

/// 预约索引的 key：(organization_id, date)
type DayKey = (Uuid, NaiveDate);

#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<Uuid, User>,
    /// 规范化邮箱 → user id
    emails: DashMap<String, Uuid>,
    /// 组织设置及其版本号（每次写入 +1，从 1 开始）
    settings: DashMap<Uuid, (OrganizationSettings, u64)>,
    appointments: DashMap<Uuid, Appointment>,
    booked: DashMap<DayKey, Vec<BookedSlot>>,
    locked_days: DashMap<Uuid, BTreeSet<NaiveDate>>,
    /// 每个组织的预约流水号
    counters: DashMap<Uuid, u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ============ Users ============

    /// 插入新用户，邮箱已被占用时返回 Conflict
    pub fn insert_user(&self, user: User) -> Result<User> {
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(SlotbookError::conflict(format!(
                "Email '{}' is already registered",
                user.email
            ))),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
                self.users.insert(user.id, user.clone());
                debug!("Stored user {} ({})", user.id, user.role);
                Ok(user)
            }
        }
    }

    pub fn get_user(&self, id: Uuid) -> Option<User> {
        self.users.get(&id).map(|u| u.value().clone())
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        let id = *self.emails.get(email)?;
        self.get_user(id)
    }

    /// 更新用户；邮箱变化时先占用新邮箱再释放旧邮箱
    pub fn update_user(&self, updated: User) -> Result<User> {
        let previous_email = self
            .users
            .get(&updated.id)
            .map(|u| u.email.clone())
            .ok_or_else(|| SlotbookError::not_found("User not found"))?;

        if previous_email != updated.email {
            match self.emails.entry(updated.email.clone()) {
                Entry::Occupied(existing) if *existing.get() != updated.id => {
                    return Err(SlotbookError::conflict(format!(
                        "Email '{}' is already registered",
                        updated.email
                    )));
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(slot) => {
                    slot.insert(updated.id);
                }
            }
            self.emails
                .remove_if(&previous_email, |_, owner| *owner == updated.id);
        }

        self.users.insert(updated.id, updated.clone());
        Ok(updated)
    }

    pub fn users_with_role(&self, role: Role) -> Vec<User> {
        self.users
            .iter()
            .filter(|u| u.value().role == role)
            .map(|u| u.value().clone())
            .collect()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    // ============ Organization settings ============

    pub fn get_settings(&self, organization_id: Uuid) -> Option<OrganizationSettings> {
        self.settings.get(&organization_id).map(|s| s.0.clone())
    }

    /// 设置与版本号一起读出，保证两者对应同一次写入
    pub fn settings_with_revision(
        &self,
        organization_id: Uuid,
    ) -> Option<(OrganizationSettings, u64)> {
        self.settings.get(&organization_id).map(|s| s.value().clone())
    }

    /// 写入设置，返回新的版本号
    pub fn put_settings(&self, organization_id: Uuid, settings: OrganizationSettings) -> u64 {
        match self.settings.entry(organization_id) {
            Entry::Occupied(mut current) => {
                let revision = current.get().1 + 1;
                current.insert((settings, revision));
                revision
            }
            Entry::Vacant(slot) => {
                slot.insert((settings, 1));
                1
            }
        }
    }

    // ============ Locked days ============

    /// 锁定某天；返回是否为新锁定
    ///
    /// 持有该天预约索引的 entry 期间写入，进行中的预约要么在锁定前完成，
    /// 要么在检查时看到锁定。
    pub fn lock_day(&self, organization_id: Uuid, date: NaiveDate) -> bool {
        let _day = self.booked.entry((organization_id, date));
        self.locked_days
            .entry(organization_id)
            .or_default()
            .insert(date)
    }

    /// 解锁某天；返回该天之前是否处于锁定状态
    pub fn unlock_day(&self, organization_id: Uuid, date: NaiveDate) -> bool {
        self.locked_days
            .get_mut(&organization_id)
            .is_some_and(|mut days| days.remove(&date))
    }

    pub fn is_locked(&self, organization_id: Uuid, date: NaiveDate) -> bool {
        self.locked_days
            .get(&organization_id)
            .is_some_and(|days| days.contains(&date))
    }

    pub fn locked_days(&self, organization_id: Uuid) -> Vec<NaiveDate> {
        self.locked_days
            .get(&organization_id)
            .map(|days| days.iter().copied().collect())
            .unwrap_or_default()
    }

    // ============ Appointments ============

    /// 预约：在同一个索引 entry 锁内完成业务检查、占用检查与占位
    ///
    /// `check` 在持锁状态下执行（例如该天是否被锁定、时段是否仍被提供），
    /// 返回 Err 则放弃预约且不留下任何索引。`check` 不能再访问预约索引。
    ///
    /// 传入的 `appointment.number` 会被忽略，由组织计数器重新分配。
    pub fn book<F>(&self, mut appointment: Appointment, check: F) -> Result<Appointment>
    where
        F: FnOnce() -> Result<()>,
    {
        let key = (appointment.organization_id, appointment.date);
        let (start, end) = (appointment.time_slot.start, appointment.time_slot.end);

        {
            let day = self.booked.entry(key);
            check()?;

            let slot = BookedSlot {
                appointment_id: appointment.id,
                start,
                end,
            };
            match day {
                Entry::Occupied(mut day) => {
                    if day.get().iter().any(|b| b.matches(start, end)) {
                        return Err(SlotbookError::conflict(format!(
                            "Slot {}-{} on {} is already booked",
                            start, end, appointment.date
                        )));
                    }
                    day.get_mut().push(slot);
                }
                Entry::Vacant(day) => {
                    day.insert(vec![slot]);
                }
            }
        }

        appointment.number = {
            let mut counter = self.counters.entry(appointment.organization_id).or_insert(0);
            *counter += 1;
            *counter
        };

        self.appointments.insert(appointment.id, appointment.clone());
        trace!(
            "Booked appointment #{} ({}) for organization {}",
            appointment.number, appointment.id, appointment.organization_id
        );
        Ok(appointment)
    }

    pub fn get_appointment(&self, id: Uuid) -> Option<Appointment> {
        self.appointments.get(&id).map(|a| a.value().clone())
    }

    /// 变更预约状态；取消时在同一把锁内移除预约索引中的占位
    ///
    /// `check` 在持锁状态下拿到当前预约，返回 Err 则放弃变更。
    pub fn set_appointment_status<F>(
        &self,
        id: Uuid,
        status: AppointmentStatus,
        check: F,
    ) -> Result<Appointment>
    where
        F: FnOnce(&Appointment) -> Result<()>,
    {
        let mut appointment = self
            .appointments
            .get_mut(&id)
            .ok_or_else(|| SlotbookError::not_found("Appointment not found"))?;

        check(appointment.value())?;

        let was_occupying = appointment.status.occupies_slot();
        appointment.status = status;
        appointment.updated_at = Utc::now();

        if was_occupying && !status.occupies_slot() {
            let key = (appointment.organization_id, appointment.date);
            if let Some(mut day) = self.booked.get_mut(&key) {
                day.retain(|b| b.appointment_id != id);
            }
            self.booked.remove_if(&key, |_, day| day.is_empty());
            debug!("Released slot of cancelled appointment {}", id);
        }

        Ok(appointment.value().clone())
    }

    /// 按条件筛选预约
    pub fn appointments_where<F>(&self, predicate: F) -> Vec<Appointment>
    where
        F: Fn(&Appointment) -> bool,
    {
        self.appointments
            .iter()
            .filter(|a| predicate(a.value()))
            .map(|a| a.value().clone())
            .collect()
    }

    /// 某组织某天的已预约时段
    pub fn booked_slots(&self, organization_id: Uuid, date: NaiveDate) -> Vec<BookedSlot> {
        self.booked
            .get(&(organization_id, date))
            .map(|day| day.value().clone())
            .unwrap_or_default()
    }

    pub fn appointment_count(&self) -> usize {
        self.appointments.len()
    }
}
