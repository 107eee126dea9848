//! Appointment service
//!
//! Booking runs the caller-level checks first. The checks that depend on
//! shared schedule state (locked day, offered slot) run inside the store's
//! booking lock together with the "is this slot still free" insert. Status
//! changes run their permission and transition checks under the
//! appointment's lock.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::BookingConfig;
use crate::errors::{Result, SlotbookError};
use crate::scheduling::ClockTime;
use crate::storage::{Appointment, AppointmentStatus, MemoryStore, Role, SlotTime};

use super::AuthUser;
use super::schedule_service::ScheduleService;

pub const MAX_NOTES_LENGTH: usize = 1000;

/// 预约请求
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub organization_id: Uuid,
    pub date: NaiveDate,
    pub start: ClockTime,
    pub end: ClockTime,
    pub notes: Option<String>,
}

/// 列表过滤条件，日期为闭区间
#[derive(Debug, Clone, Copy, Default)]
pub struct AppointmentFilter {
    pub status: Option<AppointmentStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl AppointmentFilter {
    fn matches(&self, appointment: &Appointment) -> bool {
        self.status.is_none_or(|s| appointment.status == s)
            && self.from.is_none_or(|from| appointment.date >= from)
            && self.to.is_none_or(|to| appointment.date <= to)
    }
}

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv; charset=utf-8",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = SlotbookError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(SlotbookError::invalid_field(
                "format",
                format!("Unsupported export format '{}', use json or csv", other),
            )),
        }
    }
}

/// CSV 行，列顺序即表头顺序
#[derive(Serialize)]
struct CsvRow<'a> {
    number: u64,
    id: Uuid,
    date: NaiveDate,
    start: ClockTime,
    end: ClockTime,
    status: AppointmentStatus,
    organization_id: Uuid,
    individual_id: Uuid,
    notes: &'a str,
}

impl<'a> From<&'a Appointment> for CsvRow<'a> {
    fn from(a: &'a Appointment) -> Self {
        Self {
            number: a.number,
            id: a.id,
            date: a.date,
            start: a.time_slot.start,
            end: a.time_slot.end,
            status: a.status,
            organization_id: a.organization_id,
            individual_id: a.individual_id,
            notes: &a.notes,
        }
    }
}

pub struct AppointmentService {
    store: Arc<MemoryStore>,
    schedule: Arc<ScheduleService>,
    booking: BookingConfig,
}

impl AppointmentService {
    pub fn new(
        store: Arc<MemoryStore>,
        schedule: Arc<ScheduleService>,
        booking: BookingConfig,
    ) -> Self {
        Self {
            store,
            schedule,
            booking,
        }
    }

    /// 预约一个时段，成功后状态为 pending
    pub fn book(&self, caller: AuthUser, req: BookingRequest) -> Result<Appointment> {
        if caller.role != Role::Individual {
            return Err(SlotbookError::forbidden(
                "Only individuals can book appointments",
            ));
        }

        if !self.booking.allow_past_dates && req.date < Utc::now().date_naive() {
            return Err(SlotbookError::invalid_field(
                "date",
                "Cannot book a date in the past",
            ));
        }

        let notes = req.notes.map(|n| n.trim().to_string()).unwrap_or_default();
        if notes.chars().count() > MAX_NOTES_LENGTH {
            return Err(SlotbookError::invalid_field(
                "notes",
                format!("Notes must be at most {} characters", MAX_NOTES_LENGTH),
            ));
        }

        let now = Utc::now();
        let candidate = Appointment {
            id: Uuid::new_v4(),
            organization_id: req.organization_id,
            individual_id: caller.id,
            date: req.date,
            time_slot: SlotTime {
                start: req.start,
                end: req.end,
            },
            status: AppointmentStatus::Pending,
            notes,
            number: 0,
            created_at: now,
            updated_at: now,
        };

        // 以下检查在预约索引锁内执行，与锁定某天互斥
        let appointment = self.store.book(candidate, || {
            // 组织不存在时这里返回 404
            let offered =
                self.schedule
                    .offered_slot(req.organization_id, req.date, req.start, req.end)?;

            if self.schedule.is_locked(req.organization_id, req.date) {
                return Err(SlotbookError::invalid_field(
                    "date",
                    "This day is not available for booking",
                ));
            }

            if offered.is_none() {
                return Err(SlotbookError::invalid_field(
                    "timeSlot",
                    format!(
                        "{}-{} is not a slot offered on {}",
                        req.start, req.end, req.date
                    ),
                ));
            }
            Ok(())
        })?;

        info!(
            "Appointment #{} booked: organization {} on {} {}-{} by {}",
            appointment.number,
            appointment.organization_id,
            appointment.date,
            appointment.time_slot.start,
            appointment.time_slot.end,
            caller.id
        );
        Ok(appointment)
    }

    /// 调用者可见的预约，按日期、开始时间排序
    pub fn list_for_user(&self, caller: AuthUser, filter: AppointmentFilter) -> Vec<Appointment> {
        let mut appointments = self.store.appointments_where(|a| {
            let own = match caller.role {
                Role::Organization => a.organization_id == caller.id,
                Role::Individual => a.individual_id == caller.id,
            };
            own && filter.matches(a)
        });
        appointments.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then(a.time_slot.start.cmp(&b.time_slot.start))
                .then(a.number.cmp(&b.number))
        });
        appointments
    }

    /// 非参与方看到的是 404 而不是 403
    pub fn get(&self, caller: AuthUser, id: Uuid) -> Result<Appointment> {
        self.store
            .get_appointment(id)
            .filter(|a| a.involves(caller.id))
            .ok_or_else(|| SlotbookError::not_found("Appointment not found"))
    }

    pub fn update_status(
        &self,
        caller: AuthUser,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment> {
        let updated = self.store.set_appointment_status(id, status, |current| {
            if !current.involves(caller.id) {
                return Err(SlotbookError::not_found("Appointment not found"));
            }
            if !current.status.can_transition_to(status) {
                return Err(SlotbookError::invalid_field(
                    "status",
                    format!(
                        "Cannot change status from {} to {}",
                        current.status, status
                    ),
                ));
            }
            if status == AppointmentStatus::Confirmed && caller.id != current.organization_id {
                return Err(SlotbookError::forbidden(
                    "Only the organization can confirm an appointment",
                ));
            }
            Ok(())
        });

        match &updated {
            Ok(a) => info!("Appointment {} is now {} (by {})", a.id, a.status, caller.id),
            Err(e) => warn!("Status change of appointment {} rejected: {}", id, e),
        }
        updated
    }

    pub fn cancel(&self, caller: AuthUser, id: Uuid) -> Result<Appointment> {
        self.update_status(caller, id, AppointmentStatus::Cancelled)
    }

    /// 导出调用者的全部预约
    pub fn export(&self, caller: AuthUser, format: ExportFormat) -> Result<String> {
        let appointments = self.list_for_user(caller, AppointmentFilter::default());

        let body = match format {
            ExportFormat::Json => serde_json::to_string_pretty(&appointments)?,
            ExportFormat::Csv => {
                let mut writer = csv::Writer::from_writer(Vec::new());
                for appointment in &appointments {
                    writer.serialize(CsvRow::from(appointment))?;
                }
                if appointments.is_empty() {
                    // 没有数据行时 serialize 不会写表头
                    writer.write_record([
                        "number",
                        "id",
                        "date",
                        "start",
                        "end",
                        "status",
                        "organization_id",
                        "individual_id",
                        "notes",
                    ])?;
                }
                let bytes = writer
                    .into_inner()
                    .map_err(|e| SlotbookError::serialization(e.to_string()))?;
                String::from_utf8(bytes).map_err(|e| SlotbookError::serialization(e.to_string()))?
            }
        };

        info!(
            "Exported {} appointment(s) as {} for {}",
            appointments.len(),
            format.extension(),
            caller.id
        );
        Ok(body)
    }
}
