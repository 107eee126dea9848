use std::sync::Arc;

pub mod memory;
pub mod models;

pub use memory::MemoryStore;
pub use models::{Appointment, AppointmentStatus, Role, SlotTime, User};

pub struct StorageFactory;

impl StorageFactory {
    /// 目前只有内存存储；进程退出后数据不保留
    pub fn create() -> Arc<MemoryStore> {
        tracing::warn!("Using in-memory storage, data will be lost on restart");
        Arc::new(MemoryStore::new())
    }
}
