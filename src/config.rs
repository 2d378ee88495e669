use crate::infrastructure::yahoo::DEFAULT_BASE_URL;
use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Well-known model location: written by the `train` binary, read once at
/// startup by the server.
pub const DEFAULT_MODEL_PATH: &str = "saved_models/next_return_gbdt.json";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub model_path: PathBuf,
    pub yahoo_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("Invalid BIND_ADDR, expected host:port")?;

        let model_path = env::var("MODEL_PATH")
            .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
            .into();

        let yahoo_base_url =
            env::var("YAHOO_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(Self { bind_addr, model_path, yahoo_base_url })
    }
}
