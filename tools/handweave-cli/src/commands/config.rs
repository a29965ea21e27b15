//! Show or persist the effective configuration.

use anyhow::Context;
use handweave_common::config::{config_file_path, AppConfig};

pub fn run(config: &AppConfig, write: bool) -> anyhow::Result<()> {
    println!("# {}", config_file_path().display());
    println!("{}", serde_json::to_string_pretty(config)?);

    if write {
        let path = config.save().context("Failed to write config")?;
        println!();
        println!("Config written to: {}", path.display());
    }
    Ok(())
}
