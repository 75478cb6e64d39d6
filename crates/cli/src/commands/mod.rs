pub mod init;
pub mod serve;
pub mod status;
pub mod user;

use std::path::Path;

use provdir_core::config::DirectoryConfig;
use provdir_core::db::sqlite::SqliteRepository;
use tracing::info;

/// Load and validate the configuration, then open the store it describes.
pub async fn open_store(config_path: &str) -> anyhow::Result<(DirectoryConfig, SqliteRepository)> {
    let config = DirectoryConfig::load(Path::new(config_path))?;
    config.validate()?;
    info!("Loaded configuration from {}", config_path);

    let repo = SqliteRepository::open(&config.directory.database).await?;
    Ok((config, repo))
}
