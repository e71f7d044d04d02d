use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::audit;
use crate::error::{Error, Result};

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "kvstore", version, about = "Concurrent in-memory key-value store")]
pub struct Args {
    /// Port to listen on, overrides the config file
    pub port: Option<u16>,

    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind, overrides the config file
    #[arg(long)]
    pub host: Option<String>,

    /// Number of random entries to pre-populate, 0 disables seeding
    #[arg(long)]
    pub seed: Option<usize>,
}

/// Log configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogConfig {
    /// Log file path, if not set, logs will be printed to stdout
    pub file: Option<PathBuf>,
    /// Log level, default is "info"
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: default_log_level(),
        }
    }
}

/// Audit log configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuditConfig {
    /// Records kept before the oldest are dropped
    #[serde(default = "default_audit_capacity")]
    pub capacity: usize,
}

fn default_audit_capacity() -> usize {
    audit::DEFAULT_CAPACITY
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            capacity: default_audit_capacity(),
        }
    }
}

/// Start-up pre-population
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SeedConfig {
    pub count: usize,
    pub key_len: usize,
    pub value_len: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            count: 100,
            key_len: 5,
            value_len: 5,
        }
    }
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub audit: AuditConfig,

    #[serde(default)]
    pub seed: SeedConfig,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log: LogConfig::default(),
            audit: AuditConfig::default(),
            seed: SeedConfig::default(),
        }
    }
}

impl Config {
    /// Build the effective configuration: defaults, then the file, then the CLI
    pub fn load(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(host) = &args.host {
            config.host = host.clone();
        }
        if let Some(port) = args.port {
            config.port = port;
        }
        if let Some(count) = args.seed {
            config.seed.count = count;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&config_str).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Address handed to the listener
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(Error::InvalidConfig("host must not be empty".to_string()));
        }
        if self.seed.count > 0 && (self.seed.key_len == 0 || self.seed.value_len == 0) {
            return Err(Error::InvalidConfig(
                "seed key_len and value_len must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server_addr(), "127.0.0.1:3000");
        assert_eq!(config.log.level, "info");
        assert!(config.log.file.is_none());
        assert_eq!(config.audit.capacity, audit::DEFAULT_CAPACITY);
        assert_eq!(config.seed.count, 100);
    }

    #[test]
    fn test_parse_config() {
        let config_str = r#"
host = "0.0.0.0"
port = 8000

[log]
file = "/tmp/kvstore.log"
level = "debug"

[seed]
count = 10
"#;

        let config: Config = toml::from_str(config_str).unwrap();
        assert_eq!(config.server_addr(), "0.0.0.0:8000");
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.file, Some(PathBuf::from("/tmp/kvstore.log")));
        assert_eq!(config.seed.count, 10);
        assert_eq!(config.seed.key_len, 5);
        assert_eq!(config.audit.capacity, audit::DEFAULT_CAPACITY);
    }

    #[test]
    fn test_cli_overrides() {
        let args = Args::try_parse_from(["kvstore", "8000", "--host", "0.0.0.0", "--seed", "0"])
            .unwrap();
        let config = Config::load(&args).unwrap();
        assert_eq!(config.server_addr(), "0.0.0.0:8000");
        assert_eq!(config.seed.count, 0);
    }

    #[test]
    fn test_file_then_cli() {
        let path = std::env::temp_dir().join(format!("kvstore-config-{}.toml", std::process::id()));
        fs::write(&path, "port = 9000\n[audit]\ncapacity = 5\n").unwrap();

        let args = Args::try_parse_from(["kvstore", "--config", path.to_str().unwrap()]).unwrap();
        let config = Config::load(&args).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.audit.capacity, 5);

        let args = Args::try_parse_from(["kvstore", "9100", "-c", path.to_str().unwrap()]).unwrap();
        assert_eq!(Config::load(&args).unwrap().port, 9100);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file(Path::new("/nonexistent/kvstore.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }

    #[test]
    fn test_invalid_seed() {
        let mut config = Config::default();
        config.seed.key_len = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        config.seed.count = 0;
        assert!(config.validate().is_ok());
    }
}
