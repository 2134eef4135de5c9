//! Environment-driven server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::warn;

const DEFAULT_BIND: ([u8; 4], u16) = ([0, 0, 0, 0], 8080);
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(DEFAULT_BIND),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl Config {
    /// Reads `PASTEBOX_BIND` and `PASTEBOX_DATA_DIR`, falling back to the
    /// defaults (and logging a warning) on invalid values.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind = match std::env::var("PASTEBOX_BIND") {
            Ok(value) => match value.trim().parse::<SocketAddr>() {
                Ok(addr) => addr,
                Err(e) => {
                    warn!(
                        "Invalid PASTEBOX_BIND='{}': {}. Falling back to {}",
                        value, e, defaults.bind
                    );
                    defaults.bind
                }
            },
            Err(_) => defaults.bind,
        };

        let data_dir = std::env::var("PASTEBOX_DATA_DIR")
            .map_or(defaults.data_dir, PathBuf::from);

        Self { bind, data_dir }
    }
}
