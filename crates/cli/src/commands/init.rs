use std::path::Path;

use provdir_core::config::{DatabaseConfig, DirectoryConfig};
use provdir_core::db::sqlite::SqliteRepository;
use tracing::info;

/// Run the `init` command: create data directory, write default config, and set up the database.
pub async fn run(data_dir: &str) -> anyhow::Result<()> {
    let data_path = Path::new(data_dir);

    if !data_path.exists() {
        std::fs::create_dir_all(data_path)?;
        info!("Created data directory: {}", data_dir);
    }

    let db_path = data_path.join("provdir.db");
    let db_path_str = db_path.to_string_lossy().to_string();

    let mut config = DirectoryConfig::generate_default();
    config.directory.data_dir = data_dir.to_string();
    config.directory.database = DatabaseConfig {
        path: db_path_str.clone(),
        ..Default::default()
    };
    config.validate()?;

    let config_path = data_path.join("provdir.toml");
    let toml_str = toml::to_string_pretty(&config)?;
    std::fs::write(&config_path, &toml_str)?;
    info!("Wrote configuration to {}", config_path.display());

    let repo = SqliteRepository::open(&config.directory.database).await?;
    repo.close().await;
    info!("Database initialized at {}", db_path_str);

    println!("Provider directory initialized successfully!");
    println!("  Data directory: {}", data_dir);
    println!("  Configuration:  {}", config_path.display());
    println!("  Database:       {}", db_path_str);
    println!();
    println!("Next steps:");
    println!(
        "  1. Run `provdir --config {} user add --username <name> --password <password> --admin`",
        config_path.display()
    );
    println!(
        "  2. Run `provdir --config {} serve` and sign in",
        config_path.display()
    );

    Ok(())
}
