//! Service layer for business logic
//!
//! Shared by the HTTP handlers. Each service holds an `Arc<MemoryStore>` and
//! is itself shared behind an `Arc`.

mod appointment_service;
mod schedule_service;
mod user_service;

use uuid::Uuid;

use crate::storage::{Role, User};

pub use appointment_service::{
    AppointmentFilter, AppointmentService, BookingRequest, ExportFormat, MAX_NOTES_LENGTH,
};
pub use schedule_service::{DaySlots, ScheduleService};
pub use user_service::{RegisterRequest, UpdateProfileRequest, UserService};

/// 已认证的调用者
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
        }
    }
}
