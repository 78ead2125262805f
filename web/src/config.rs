use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::{collections::HashMap, path::Path, time::Duration};
use tracing::debug;

const DATABASE_URL_ENV: &str = "GEOWEB_DATABASE_URL";

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct DatabaseConfig {
    /// connection string, e.g. `sqlite://geo.sqlite?mode=rwc`
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub(crate) url: SecretString,
    /// a file containing the connection string
    #[serde(default)]
    pub(crate) urlfile: String,
    #[serde(default = "default_acquire_timeout")]
    pub(crate) acquire_timeout: u64,
}

impl DatabaseConfig {
    pub(crate) fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout)
    }
}

impl PartialEq for DatabaseConfig {
    fn eq(&self, other: &Self) -> bool {
        self.urlfile == other.urlfile
            && self.acquire_timeout == other.acquire_timeout
            && self.url.expose_secret() == other.url.expose_secret()
    }
}

fn default_acquire_timeout() -> u64 {
    libgeo::database::DEFAULT_ACQUIRE_TIMEOUT.as_secs()
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct ListenConfig {
    pub(crate) host: String,
    pub(crate) port: u16,
}

const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
fn default_listen() -> ListenConfig {
    ListenConfig {
        host: DEFAULT_HOST.to_string(),
        port: DEFAULT_HTTP_PORT,
    }
}

// This handles the case where the `listen` block is PRESENT, but a field may be missing.
fn deserialize_listen_with_default_port<'de, D>(deserializer: D) -> Result<ListenConfig, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct PartialListenConfig {
        host: Option<String>,
        port: Option<u16>,
    }

    let partial_config = PartialListenConfig::deserialize(deserializer)?;
    Ok(ListenConfig {
        host: partial_config
            .host
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: partial_config.port.unwrap_or(DEFAULT_HTTP_PORT),
    })
}

pub(crate) const DEFAULT_MAX_UPLOAD_SIZE: usize = 32 * 1024 * 1024;
fn default_max_upload_size() -> usize {
    DEFAULT_MAX_UPLOAD_SIZE
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EnvConfig {
    #[serde(default = "default_listen")]
    #[serde(deserialize_with = "deserialize_listen_with_default_port")]
    pub(crate) listen: ListenConfig,
    pub(crate) database: DatabaseConfig,
    /// the largest request body accepted by the upload form, in bytes
    #[serde(default = "default_max_upload_size")]
    pub(crate) max_upload_size: usize,
}

impl EnvConfig {
    /// Resolve the database connection string if it was not given inline
    pub(crate) fn init(&mut self) -> Result<()> {
        let db = &mut self.database;
        if !db.url.expose_secret().is_empty() {
            return Ok(());
        }
        // 'urlfile' entry in environment config takes priority
        if !db.urlfile.is_empty() {
            debug!("Looking up database url from file '{}'", db.urlfile);
            db.url = std::fs::read_to_string(&db.urlfile)
                .with_context(|| {
                    format!("Failed to read database url from file '{}'", db.urlfile)
                })?
                .trim()
                .to_string()
                .into();
        } else {
            debug!("Looking up database url from environment variable");
            db.url = std::env::var(DATABASE_URL_ENV)
                .with_context(|| {
                    format!("Failed to get database url from env variable {DATABASE_URL_ENV}")
                })?
                .into();
        }
        Ok(())
    }
}

/// Read the config file and pick out the named environment
pub(crate) fn load(path: &Path, envname: &str) -> Result<EnvConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Unable to read config file '{}'", path.display()))?;
    let mut configs: HashMap<String, EnvConfig> = serde_yaml::from_str(&contents)
        .with_context(|| format!("Unable to parse config file '{}'", path.display()))?;
    configs
        .remove(envname)
        .with_context(|| format!("No environment named '{envname}' in config file"))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_config() {
        let yaml = r#"dev:
  database:
    url: "sqlite://dev-geo.sqlite?mode=rwc"
  listen: &LISTEN
    host: "127.0.0.1"
    port: 3000
prod:
  database:
    urlfile: "/run/secrets/geoweb-db"
    acquire_timeout: 10
  max_upload_size: 1048576
  listen: *LISTEN"#;
        let configs: HashMap<String, EnvConfig> =
            serde_yaml::from_str(yaml).expect("Failed to parse yaml");
        assert_eq!(configs.len(), 2);
        assert_eq!(
            configs["dev"],
            EnvConfig {
                listen: ListenConfig {
                    host: "127.0.0.1".to_string(),
                    port: 3000,
                },
                database: DatabaseConfig {
                    url: "sqlite://dev-geo.sqlite?mode=rwc".to_string().into(),
                    urlfile: String::new(),
                    acquire_timeout: 5,
                },
                max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            }
        );
        assert_eq!(
            configs["prod"],
            EnvConfig {
                listen: ListenConfig {
                    host: "127.0.0.1".to_string(),
                    port: 3000,
                },
                database: DatabaseConfig {
                    url: Default::default(),
                    urlfile: "/run/secrets/geoweb-db".to_string(),
                    acquire_timeout: 10,
                },
                max_upload_size: 1048576,
            }
        );
        assert_eq!(
            configs["prod"].database.acquire_timeout(),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn test_default_listen() {
        let yaml = r#"dev:
  database:
    url: "sqlite::memory:"
  listen:
    host: "localhost"
test:
  database:
    url: "sqlite::memory:""#;
        let configs: HashMap<String, EnvConfig> =
            serde_yaml::from_str(yaml).expect("Failed to parse yaml");
        assert_eq!(configs["dev"].listen.port, DEFAULT_HTTP_PORT);
        assert_eq!(configs["dev"].listen.host, "localhost");
        assert_eq!(configs["test"].listen, default_listen());
        assert_eq!(configs["test"].max_upload_size, DEFAULT_MAX_UPLOAD_SIZE);
    }

    #[test]
    fn test_unknown_field() {
        let yaml = r#"dev:
  database:
    url: "sqlite::memory:"
    password: "hunter2""#;
        assert!(serde_yaml::from_str::<HashMap<String, EnvConfig>>(yaml).is_err());
    }

    #[test]
    fn test_init_keeps_inline_url() {
        let mut env = EnvConfig {
            listen: default_listen(),
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string().into(),
                urlfile: "/nonexistent/file".to_string(),
                acquire_timeout: 5,
            },
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        };
        env.init().expect("Inline url should not need a lookup");
        assert_eq!(env.database.url.expose_secret(), "sqlite::memory:");
    }

    #[test]
    fn test_init_missing_urlfile() {
        let mut env = EnvConfig {
            listen: default_listen(),
            database: DatabaseConfig {
                url: Default::default(),
                urlfile: "/nonexistent/geoweb-db-url".to_string(),
                acquire_timeout: 5,
            },
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        };
        assert!(env.init().is_err());
    }
}
