use std::path::PathBuf;

use anyhow::{Context, Result};

/// Runtime settings, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// TCP port the SSH listener binds on.
    pub port: u16,
    /// Base URL of the JSON document index backend.
    pub elasticsearch_url: String,
    /// Path to the fake-filesystem YAML dump.
    pub files_config: PathBuf,
    /// Verbose logging toggle.
    pub debug: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let port = required("PORT")?
            .parse::<u16>()
            .context("PORT is not a valid TCP port")?;
        let elasticsearch_url = required("ELASTICSEARCH_URL")?;
        let files_config = PathBuf::from(required("FILES_CONFIG")?);
        let debug = std::env::var_os("DEBUG").is_some();

        Ok(Self {
            port,
            elasticsearch_url,
            files_config,
            debug,
        })
    }
}

fn required(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("{} is not set", name))
}
