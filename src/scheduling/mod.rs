//! 时段计算
//!
//! - `time`: `HH:mm` 时刻与星期类型
//! - `settings`: 组织营业时间配置及校验
//! - `slots`: 由营业时间生成时段
//! - `availability`: 用已预约时段与锁定日修正可用性
//! - `status`: 按日期范围汇总时段数量

pub mod availability;
pub mod settings;
pub mod slots;
pub mod status;
pub mod time;

pub use availability::{BookedSlot, reconcile};
pub use settings::{BusinessHours, OrganizationSettings};
pub use slots::{TimeSlot, generate_slots, slot_id};
pub use status::{DayStatus, aggregate_day, date_range};
pub use time::{ClockTime, DayOfWeek};
