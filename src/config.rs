use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs::read_to_string;

const CONFIG_FILE: &str = "Config.toml";

fn default_listen_addr() -> String {
    "127.0.0.1:7878".to_string()
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    /// Base URL of the remote commentary service
    pub commentary_url: String,

    /// Agent identifier playing white, announced in the introduction
    pub white_agent: String,

    /// Agent identifier playing black, announced in the introduction
    pub black_agent: String,

    /// TCP address the audio monitor stream listens on
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

pub async fn load() -> Result<Config> {
    load_from(CONFIG_FILE).await
}

pub async fn load_from(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let config = read_to_string(path)
        .await
        .with_context(|| format!("Could not read config file {}", path.display()))?;
    let config: Config = toml::from_str(&config)?;

    Ok(config)
}
