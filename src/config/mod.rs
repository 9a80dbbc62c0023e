use std::collections::HashMap;
use std::env;
use std::time::Duration;

use thiserror::Error;

/// Configuration errors; any of these aborts startup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub email: EmailConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub major: u32,
    pub minor: u32,
    pub port: u16,
    pub debug: bool,
    pub secret_key: String,
    pub timeout_read: Duration,
    pub timeout_write: Duration,
    pub timeout_idle: Duration,
}

#[derive(Debug, Clone)]
pub enum DatabaseConfig {
    /// Postgres for users/newsletters, Firebase Realtime Database for subscriptions
    Postgres {
        rdbms: RdbmsConfig,
        firebase: FirebaseConfig,
    },
    /// Process-local stores; nothing survives a restart
    Memory,
}

#[derive(Debug, Clone)]
pub struct RdbmsConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub db_name: String,
    pub debug: bool,
    pub max_connection_pool: u32,
    pub max_idle_connections: u32,
    pub connections_max_lifetime: Duration,
}

#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    pub location: String,
    pub ref_entry_point: String,
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub send_from_name: String,
    pub send_from_address: String,
    pub provider: EmailProvider,
}

#[derive(Debug, Clone)]
pub enum EmailProvider {
    SendGrid { api_key: String },
    /// Write messages to the log instead of delivering them
    Log,
}

impl AppConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from a map, mostly for tests
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup: &lookup };

        let server = ServerConfig {
            major: vars.required_parse("SERVER_MAJOR")?,
            minor: vars.required_parse("SERVER_MINOR")?,
            port: vars.required_parse("SERVER_PORT")?,
            debug: vars.required_bool("SERVER_DEBUG")?,
            secret_key: vars.required("API_SECRET")?,
            timeout_read: vars.required_duration("SERVER_TIMEOUT_READ")?,
            timeout_write: vars.required_duration("SERVER_TIMEOUT_WRITE")?,
            timeout_idle: vars.required_duration("SERVER_TIMEOUT_IDLE")?,
        };

        let driver = vars.required("DB_DRIVER")?;
        let database = match driver.as_str() {
            "postgres" => DatabaseConfig::Postgres {
                rdbms: RdbmsConfig {
                    host: vars.required("DB_HOST")?,
                    port: vars.required_parse("DB_PORT")?,
                    username: vars.required("DB_USER")?,
                    password: vars.required("DB_PASS")?,
                    db_name: vars.required("DB_NAME")?,
                    debug: vars.required_bool("DB_DEBUG")?,
                    max_connection_pool: vars.optional_parse("DB_MAX_CONNECTION_POOL", 4)?,
                    max_idle_connections: vars.optional_parse("DB_MAX_IDLE_CONNECTIONS", 4)?,
                    connections_max_lifetime: vars
                        .optional_duration("DB_CONNECTIONS_MAX_LIFETIME", Duration::from_secs(300))?,
                },
                firebase: FirebaseConfig {
                    location: vars.required("DB_LOCATION")?,
                    ref_entry_point: vars.required("DB_ENTRY_POINT_REF")?,
                    auth_token: vars.optional("FIREBASE_AUTH_TOKEN"),
                },
            },
            "memory" => DatabaseConfig::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    key: "DB_DRIVER",
                    value: other.to_string(),
                    reason: "expected postgres or memory".to_string(),
                })
            }
        };

        let provider = match vars.optional("EMAIL_PROVIDER").as_deref() {
            None | Some("sendgrid") => EmailProvider::SendGrid {
                api_key: vars.required("SENDGRID_API_KEY")?,
            },
            Some("log") => EmailProvider::Log,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "EMAIL_PROVIDER",
                    value: other.to_string(),
                    reason: "expected sendgrid or log".to_string(),
                })
            }
        };

        let email = EmailConfig {
            send_from_name: vars.required("SEND_FROM_NAME")?,
            send_from_address: vars.required("SEND_FROM_ADDRESS")?,
            provider,
        };

        Ok(Self {
            server,
            database,
            email,
        })
    }

    /// Version label used for the route prefix and the request context, e.g. "v1"
    pub fn api_version(&self) -> String {
        format!("v{}", self.server.major)
    }
}

struct Vars<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl Vars<'_> {
    fn optional(&self, key: &'static str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.optional(key).ok_or(ConfigError::Missing(key))
    }

    fn required_parse<T>(&self, key: &'static str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.required(key)?;
        parse_value(key, &raw)
    }

    fn optional_parse<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            Some(raw) => parse_value(key, &raw),
            None => Ok(default),
        }
    }

    fn required_bool(&self, key: &'static str) -> Result<bool, ConfigError> {
        let raw = self.required(key)?;
        parse_bool(key, &raw)
    }

    fn required_duration(&self, key: &'static str) -> Result<Duration, ConfigError> {
        let raw = self.required(key)?;
        parse_duration(key, &raw)
    }

    fn optional_duration(&self, key: &'static str, default: Duration) -> Result<Duration, ConfigError> {
        match self.optional(key) {
            Some(raw) => parse_duration(key, &raw),
            None => Ok(default),
        }
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" => Ok(true),
        "0" | "false" | "f" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

/// Accepts `300ms`, `5s`, `2m`, `1h` or a bare number of seconds
fn parse_duration(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = raw.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);
    let amount: u64 = digits.parse().map_err(|_| invalid("expected a duration such as 5s"))?;

    match unit {
        "" | "s" => Ok(Duration::from_secs(amount)),
        "ms" => Ok(Duration::from_millis(amount)),
        "m" => Ok(Duration::from_secs(amount * 60)),
        "h" => Ok(Duration::from_secs(amount * 60 * 60)),
        _ => Err(invalid("unknown duration unit")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_vars() -> HashMap<String, String> {
        [
            ("SERVER_MAJOR", "1"),
            ("SERVER_MINOR", "0"),
            ("SERVER_PORT", "8080"),
            ("SERVER_DEBUG", "false"),
            ("API_SECRET", "secret"),
            ("SERVER_TIMEOUT_READ", "5s"),
            ("SERVER_TIMEOUT_WRITE", "10s"),
            ("SERVER_TIMEOUT_IDLE", "1m"),
            ("DB_DRIVER", "memory"),
            ("EMAIL_PROVIDER", "log"),
            ("SEND_FROM_NAME", "Newsletters"),
            ("SEND_FROM_ADDRESS", "news@example.com"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_memory_config() {
        let config = AppConfig::from_map(&base_vars()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.timeout_idle, Duration::from_secs(60));
        assert_eq!(config.api_version(), "v1");
        assert!(matches!(config.database, DatabaseConfig::Memory));
        assert!(matches!(config.email.provider, EmailProvider::Log));
    }

    #[test]
    fn test_missing_required_variable_fails() {
        let mut vars = base_vars();
        vars.remove("API_SECRET");
        assert_eq!(
            AppConfig::from_map(&vars).unwrap_err(),
            ConfigError::Missing("API_SECRET")
        );
    }

    #[test]
    fn test_postgres_driver_requires_connection_settings() {
        let mut vars = base_vars();
        vars.insert("DB_DRIVER".into(), "postgres".into());
        assert_eq!(
            AppConfig::from_map(&vars).unwrap_err(),
            ConfigError::Missing("DB_HOST")
        );
    }

    #[test]
    fn test_postgres_pool_defaults() {
        let mut vars = base_vars();
        for (k, v) in [
            ("DB_DRIVER", "postgres"),
            ("DB_HOST", "localhost"),
            ("DB_PORT", "5432"),
            ("DB_USER", "news"),
            ("DB_PASS", "pass"),
            ("DB_NAME", "news"),
            ("DB_DEBUG", "true"),
            ("DB_LOCATION", "https://example.firebaseio.com"),
            ("DB_ENTRY_POINT_REF", "newsletter"),
        ] {
            vars.insert(k.into(), v.into());
        }

        let config = AppConfig::from_map(&vars).unwrap();
        let DatabaseConfig::Postgres { rdbms, firebase } = config.database else {
            panic!("expected postgres config");
        };
        assert_eq!(rdbms.max_connection_pool, 4);
        assert_eq!(rdbms.max_idle_connections, 4);
        assert_eq!(rdbms.connections_max_lifetime, Duration::from_secs(300));
        assert!(firebase.auth_token.is_none());
    }

    #[test]
    fn test_sendgrid_requires_api_key() {
        let mut vars = base_vars();
        vars.remove("EMAIL_PROVIDER");
        assert_eq!(
            AppConfig::from_map(&vars).unwrap_err(),
            ConfigError::Missing("SENDGRID_API_KEY")
        );
    }

    #[test]
    fn test_duration_units() {
        assert_eq!(parse_duration("K", "250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("K", "15").unwrap(), Duration::from_secs(15));
        assert_eq!(parse_duration("K", "2h").unwrap(), Duration::from_secs(7200));
        assert!(parse_duration("K", "soon").is_err());
        assert!(parse_duration("K", "5d").is_err());
    }

    #[test]
    fn test_invalid_bool_reports_key() {
        let mut vars = base_vars();
        vars.insert("SERVER_DEBUG".into(), "maybe".into());
        assert!(matches!(
            AppConfig::from_map(&vars),
            Err(ConfigError::Invalid { key: "SERVER_DEBUG", .. })
        ));
    }
}
