//! Show or initialize the configuration file.

use std::path::Path;

use quietcut_common::config::{config_file_path, AppConfig};

pub fn run(
    config: &AppConfig,
    explicit_path: Option<&Path>,
    init: bool,
    force: bool,
) -> anyhow::Result<()> {
    let path = explicit_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path);

    if init {
        if path.exists() && !force {
            anyhow::bail!(
                "Config already exists at {} (use --force to overwrite)",
                path.display()
            );
        }
        AppConfig::default().save_to(&path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
