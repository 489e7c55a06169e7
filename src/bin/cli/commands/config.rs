//! Configuration command handlers

use ecoverse_probe::{OutputFormat, ProbeConfig, ProbeError, ProbeResult};

use std::path::PathBuf;

/// Print the effective configuration with the token masked
pub fn handle_config_show(config: &ProbeConfig, format: OutputFormat) -> ProbeResult<()> {
    let mut shown = config.clone();
    shown.endpoint.auth_token = mask(&shown.endpoint.auth_token);

    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&shown)?,
        OutputFormat::Table => toml::to_string_pretty(&shown).map_err(|e| {
            ProbeError::config_error(format!("Failed to serialize config: {}", e))
        })?,
    };
    println!("{}", rendered);
    Ok(())
}

/// Write a default configuration file without reading the existing one
pub fn handle_config_init(output: Option<PathBuf>, force: bool) -> ProbeResult<()> {
    let path = match output {
        Some(path) => path,
        None => ProbeConfig::default_config_path()?,
    };
    if path.exists() && !force {
        return Err(ProbeError::invalid_input(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    ProbeConfig::default().save_to_file(&path)?;
    println!("✓ Wrote default configuration to {}", path.display());
    Ok(())
}

fn mask(token: &str) -> String {
    match token.char_indices().nth(4) {
        Some((cut, _)) => format!("{}***", &token[..cut]),
        None => "***".to_string(),
    }
}
