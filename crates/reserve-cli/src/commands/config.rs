use reserve_core::CloudConfig;

use crate::commands::common::App;
use crate::config::jsonbin_base_url;
use crate::error::CliError;

pub fn run_config_show(app: &App) -> Result<(), CliError> {
    let config = app.service.cloud_config()?;
    for line in format_config_lines(&config, &jsonbin_base_url()) {
        println!("{line}");
    }
    Ok(())
}

pub fn run_config_set(
    app: &App,
    enable: bool,
    disable: bool,
    api_key: Option<String>,
    bin_id: Option<String>,
) -> Result<(), CliError> {
    let current = app.service.cloud_config()?;
    let updated = apply_config_changes(current, enable, disable, api_key, bin_id);
    let saved = app.service.save_cloud_config(updated)?;

    if saved.is_usable() {
        println!("Cloud sync enabled for bin {}", saved.bin_id);
    } else if saved.enabled {
        println!("Cloud sync enabled, but the API key or bin id is still missing");
    } else {
        println!("Cloud sync disabled");
    }
    Ok(())
}

/// Merge flag values into the stored config. Supplying a key or bin id
/// without `--disable` turns sync on.
pub fn apply_config_changes(
    mut config: CloudConfig,
    enable: bool,
    disable: bool,
    api_key: Option<String>,
    bin_id: Option<String>,
) -> CloudConfig {
    let credentials_given = api_key.is_some() || bin_id.is_some();
    if let Some(api_key) = api_key {
        config.api_key = api_key;
    }
    if let Some(bin_id) = bin_id {
        config.bin_id = bin_id;
    }
    if disable {
        config.enabled = false;
    } else if enable || credentials_given {
        config.enabled = true;
    }
    config
}

pub fn format_config_lines(config: &CloudConfig, base_url: &str) -> Vec<String> {
    let key = if config.api_key().is_some() {
        mask_secret(&config.api_key)
    } else {
        "(not set)".to_string()
    };
    let bin = config.bin_id().unwrap_or_else(|| "(not set)".to_string());
    vec![
        format!("Enabled:  {}", if config.enabled { "yes" } else { "no" }),
        format!("API key:  {key}"),
        format!("Bin id:   {bin}"),
        format!("Endpoint: {base_url}"),
        format!(
            "Status:   {}",
            if config.is_usable() { "ready" } else { "not configured" }
        ),
    ]
}

/// Keep the last four characters visible.
pub fn mask_secret(secret: &str) -> String {
    let secret = secret.trim();
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{tail}", "*".repeat(count - 4))
}
