use std::sync::Arc;

use tokio::signal;
use tracing::{info, warn};

use crate::storage::MemoryStore;

/// 等待 Ctrl+C，然后记录内存中即将丢失的数据量
pub async fn listen_for_shutdown(store: Arc<MemoryStore>) {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }

    warn!(
        "Discarding in-memory data: {} user(s), {} appointment(s)",
        store.user_count(),
        store.appointment_count()
    );
}
