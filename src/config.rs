//! Process configuration
//!
//! Loaded once at startup from `$HOME/.clip/config.json` and immutable for
//! the server's lifetime. A missing file means defaults; malformed JSON is
//! fatal at startup.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Port used when the config file is absent or declares port 0.
pub const DEFAULT_PORT: u16 = 4321;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
}

impl Config {
    /// Load configuration from the fixed per-user config path.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(config_path())
    }

    /// Load configuration from an explicit JSON file path.
    pub fn load_from(path: PathBuf) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Json)
                    .required(false),
            )
            .set_default("host", "")?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .build()?;

        settings.try_deserialize()
    }

    /// Effective port: a declared port of 0 falls back to the default.
    pub const fn effective_port(&self) -> u16 {
        if self.port == 0 {
            DEFAULT_PORT
        } else {
            self.port
        }
    }

    /// Address to bind. An empty host means all interfaces.
    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        let host = if self.host.is_empty() {
            "0.0.0.0"
        } else {
            &self.host
        };
        format!("{}:{}", host, self.effective_port())
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

/// Read-only state shared by every request task.
#[derive(Debug)]
pub struct ServerContext {
    pub config: Config,
    pub source_root: PathBuf,
}

impl ServerContext {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            source_root: source_root(),
        }
    }
}

/// `$HOME/.clip/config.json`
pub fn config_path() -> PathBuf {
    clip_dir().join("config.json")
}

/// `$HOME/.clip/source` — the storage root all served files live under.
pub fn source_root() -> PathBuf {
    clip_dir().join("source")
}

fn clip_dir() -> PathBuf {
    PathBuf::from(std::env::var_os("HOME").unwrap_or_default()).join(".clip")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(dir.path().join("nonexistent.json")).unwrap();
        assert_eq!(cfg.effective_port(), DEFAULT_PORT);
        assert_eq!(
            cfg.get_socket_addr().unwrap().to_string(),
            "0.0.0.0:4321"
        );
    }

    #[test]
    fn test_file_overrides_host_and_port() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, r#"{"port": 8080, "host": "127.0.0.1"}"#);
        let cfg = Config::load_from(path).unwrap();
        assert_eq!(
            cfg.get_socket_addr().unwrap().to_string(),
            "127.0.0.1:8080"
        );
    }

    #[test]
    fn test_zero_port_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, r#"{"port": 0}"#);
        let cfg = Config::load_from(path).unwrap();
        assert_eq!(cfg.effective_port(), DEFAULT_PORT);
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "{}");
        let cfg = Config::load_from(path).unwrap();
        assert_eq!(cfg.host, "");
        assert_eq!(cfg.effective_port(), DEFAULT_PORT);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "{not json");
        assert!(Config::load_from(path).is_err());
    }
}
