//! Write the default configuration file.

use std::path::PathBuf;

use storyreel_common::config::{config_file_path, AppConfig};

pub fn run(path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(config_file_path);
    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    let config = AppConfig::default();
    config.save_to(&path)?;

    println!("Wrote config: {}", path.display());
    println!("  Output dir: {}", config.output_dir.display());
    println!("  Work dir:   {}", config.work_dir.display());
    println!("  Speech:     {}", config.speech.speech_url());
    Ok(())
}
