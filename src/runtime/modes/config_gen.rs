use anyhow::{Result, anyhow};

use crate::config::StaticConfig;

/// 写出示例配置；`output` 为 None 时打印到 stdout
pub fn generate_config(output: Option<&str>) -> Result<()> {
    match output {
        Some(path) => {
            StaticConfig::default()
                .save_to_file(path)
                .map_err(|e| anyhow!("Failed to write {}: {}", path, e))?;
            println!("Sample configuration written to {}", path);
        }
        None => print!("{}", StaticConfig::generate_sample_config()),
    }
    Ok(())
}
