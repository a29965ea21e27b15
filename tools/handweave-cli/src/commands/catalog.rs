//! Print generated formation coordinates.

use anyhow::Context;
use handweave_choreography::FormationCatalog;
use handweave_common::config::AppConfig;
use handweave_model::spatial::FormationKind;

pub fn run(config: &AppConfig, formation: Option<FormationKind>) -> anyhow::Result<()> {
    let catalog =
        FormationCatalog::generate(&config.formation).context("Failed to generate formations")?;

    let json = match formation {
        Some(kind) => serde_json::to_string_pretty(catalog.get(kind))?,
        None => serde_json::to_string_pretty(&catalog)?,
    };
    println!("{json}");
    Ok(())
}
