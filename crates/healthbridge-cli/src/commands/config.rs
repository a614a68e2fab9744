use anyhow::Result;

use healthbridge_core::AppConfig;

pub fn run(config: &AppConfig, write: bool) -> Result<()> {
    let path = AppConfig::config_path();

    if write {
        if path.exists() {
            println!("Config file already exists: {}", path.display());
            return Ok(());
        }
        AppConfig::default().save()?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    println!("# {}", path.display());
    print!("{}", config.to_toml()?);
    Ok(())
}
