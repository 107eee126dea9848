pub mod moka;
pub mod null;
pub mod traits;

use std::sync::Arc;

use tracing::info;

use crate::config::CacheConfig;

pub use self::moka::MokaSlotCache;
pub use null::NullSlotCache;
pub use traits::SlotCache;

pub struct SlotCacheFactory;

impl SlotCacheFactory {
    pub fn create(config: &CacheConfig) -> Arc<dyn SlotCache> {
        let cache: Arc<dyn SlotCache> = if config.enabled {
            Arc::new(MokaSlotCache::new(config))
        } else {
            Arc::new(NullSlotCache)
        };
        info!("Slot cache: {}", cache.name());
        cache
    }
}
