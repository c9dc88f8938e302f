//! `folio init`: write a default config file.

use folio_config::AppConfig;
use std::path::Path;

pub async fn run(path: Option<&Path>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = super::config_path(path);

    println!("Folio: first-time setup");
    println!("=======================\n");

    if let Some(dir) = config_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
            println!("  Created config directory: {}", dir.display());
        }
    }

    if config_path.exists() && !force {
        println!("  Config already exists at: {}", config_path.display());
        println!("  Edit it manually or re-run with --force.\n");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("  Wrote config.toml to: {}", config_path.display());
    println!("\n  Next steps:");
    println!("    1. Set profile_name and [inference] model in the config");
    println!("    2. Run: folio seed        (demo profile into SQLite)");
    println!("    3. Run: folio serve\n");

    Ok(())
}
