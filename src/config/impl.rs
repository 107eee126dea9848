use std::sync::{Arc, OnceLock};

use super::StaticConfig;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

static CONFIG: OnceLock<Arc<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Falls back to in-memory defaults when `init_config` was never called,
/// which keeps library consumers (tests, benches) free of global setup.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get_or_init(|| Arc::new(StaticConfig::default()))
        .clone()
}

/// Initialize the global configuration from `config.toml` + `SB__*` env vars
pub fn init_config() -> Arc<StaticConfig> {
    init_config_from(DEFAULT_CONFIG_PATH)
}

/// Initialize the global configuration from an explicit file path
///
/// Only the first call has an effect; later calls return the already
/// loaded instance.
pub fn init_config_from(path: &str) -> Arc<StaticConfig> {
    CONFIG
        .get_or_init(|| Arc::new(StaticConfig::load(path)))
        .clone()
}
