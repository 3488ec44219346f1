//! Shell configuration.
//!
//! Values come from, in increasing priority: built-in defaults, an optional
//! TOML file and `ZKCLI_`-prefixed environment variables. Command-line flags
//! are applied on top by the binary. A named file that does not exist is an
//! error.

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::cli::commands::history::DEFAULT_HISTORY_SIZE;

pub const DEFAULT_SERVER: &str = "127.0.0.1:2181";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Connection string used at startup.
    pub server: String,
    /// Number of lines kept by `history`.
    pub history_size: usize,
    /// Default `env_logger` filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            history_size: DEFAULT_HISTORY_SIZE,
            log_level: "warn".to_string(),
        }
    }
}

impl ShellConfig {
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(ShellConfig::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file_exact(file));
        }
        figment.merge(Env::prefixed("ZKCLI_"))
    }

    pub fn load(file: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(file).extract()
    }
}
