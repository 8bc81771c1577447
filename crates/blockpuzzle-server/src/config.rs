//! Server configuration from environment variables.

use anyhow::Context;
use blockpuzzle_core::{GameConfig, DEFAULT_GRID_SIZE};
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SAVE_DIR: &str = "./saves";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (`SERVER_ADDR`)
    pub addr: SocketAddr,
    /// Root of all saved sessions and the shared high score (`BLOCKPUZZLE_SAVE_DIR`)
    pub save_dir: PathBuf,
    /// Board settings for new games (`BLOCKPUZZLE_GRID_SIZE`)
    pub game: GameConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let addr = lookup("SERVER_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.into())
            .parse()
            .context("SERVER_ADDR is not a socket address")?;

        let save_dir = lookup("BLOCKPUZZLE_SAVE_DIR")
            .unwrap_or_else(|| DEFAULT_SAVE_DIR.into())
            .into();

        let grid_size = match lookup("BLOCKPUZZLE_GRID_SIZE") {
            Some(value) => value
                .parse()
                .context("BLOCKPUZZLE_GRID_SIZE is not a number")?,
            None => DEFAULT_GRID_SIZE,
        };
        let game = GameConfig::new(grid_size)?;

        Ok(Self {
            addr,
            save_dir,
            game,
        })
    }
}
