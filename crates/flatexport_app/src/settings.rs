use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use export_logging::export_info;
use flatexport_engine::ExportConfig;

/// Load export settings from a RON file; without a file the defaults apply.
pub(crate) fn load(path: Option<&Path>) -> Result<ExportConfig> {
    let Some(path) = path else {
        return Ok(ExportConfig::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings from {path:?}"))?;
    let config: ExportConfig = ron::from_str(&content)
        .with_context(|| format!("failed to parse settings from {path:?}"))?;
    export_info!("Loaded settings from {:?}", path);
    Ok(config)
}
