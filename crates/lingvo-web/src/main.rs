use anyhow::{Context, bail};
use lingvo_config::Config;
use lingvo_web::start_server;
use std::env;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = load_config()?;
    start_server(&config)
        .await
        .context("web server failed")?;
    Ok(())
}

/// A content directory argument overrides the config file's path.
fn load_config() -> anyhow::Result<Config> {
    let config_path = Config::config_path();
    let from_file = Config::load().context("Failed to load config file")?;

    match (env::args().nth(1), from_file) {
        (Some(arg), Some(mut config)) => {
            config.content_path = PathBuf::from(arg);
            Ok(config)
        }
        (Some(arg), None) => {
            log::info!("Using content path from CLI argument: {arg}");
            Ok(Config::new(arg))
        }
        (None, Some(config)) => {
            log::info!("Loaded content path from {}", config_path.display());
            Ok(config)
        }
        (None, None) => bail!(
            "No content path provided and no config file found\nUsage: lingvo-web <content-folder-path>\nOr create a config file at {}",
            config_path.display()
        ),
    }
}
