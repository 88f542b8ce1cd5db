use crate::util::DefaultExt;
use anyhow::{Context as _, Error};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    net::{IpAddr, Ipv4Addr},
    path::{Path, PathBuf},
    time::Duration,
};

fn log_level_is_info(level: &str) -> bool {
    level.to_lowercase() == "info"
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub address: IpAddr,
    pub port: u16,
    pub database_url: String,

    #[serde(skip_serializing_if = "log_level_is_info")]
    pub log_level: String,

    /// Directory served under `/styles/`
    pub static_dir: PathBuf,

    /// Maximum length of a text entry, in characters
    pub max_text_length: usize,
    /// Per-query timeout in milliseconds
    pub query_timeout: u64,

    #[serde(skip_serializing_if = "DefaultExt::is_default")]
    pub pool: PoolConfig,

    #[serde(skip_serializing_if = "DefaultExt::is_default")]
    pub threads: ThreadsConfig,

    pub session: SessionConfig,

    #[serde(skip_serializing_if = "DefaultExt::is_default")]
    pub password: PasswordConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            database_url: "sqlite://mininet.db".to_owned(),

            log_level: "info".to_owned(),

            static_dir: PathBuf::from("styles"),

            max_text_length: 500,
            query_timeout: 5000,

            pool: Default::default(),
            threads: Default::default(),
            session: Default::default(),
            password: Default::default(),
        }
    }
}

impl Config {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout)
    }
}

pub fn read(path: impl AsRef<Path>) -> Result<&'static Config, Error> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| {
        format!(
            "can't open {}, run `mininet init` to create it",
            path.display()
        )
    })?;
    let config: Config = serde_json::from_reader(BufReader::new(file))?;
    Ok(&*Box::leak(Box::new(config)))
}

pub fn write(path: impl AsRef<Path>) -> Result<(), Error> {
    let config: Config = Default::default();
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &config)?;
    Ok(())
}

#[derive(Debug, Deserialize, Serialize, Default, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct PoolConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_connections: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_timeout: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_lifetime: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Default, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ThreadsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_threads: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_blocking_threads: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct SessionConfig {
    /// Key material for cookie signatures, a random key is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// Session lifetime in seconds
    pub max_age: i64,
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: None,
            max_age: 86400,
            secure: false,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Default, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct PasswordConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lanes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_cost: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_cost: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt_length: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_survive_a_round_trip() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(!json.contains("log-level"));
        assert!(!json.contains("\"pool\""));

        let config: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_text_length, 500);
        assert_eq!(config.query_timeout(), Duration::from_secs(5));
        assert_eq!(config.session, SessionConfig::default());
    }

    #[test]
    fn partial_files_fall_back_to_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "port": 3000, "session": { "secure": true } }"#).unwrap();
        assert_eq!(config.port, 3000);
        assert!(config.session.secure);
        assert_eq!(config.session.max_age, 86400);
        assert_eq!(config.database_url, "sqlite://mininet.db");
    }
}
