//! Service settings loaded with the `config` crate
//!
//! Sources, lowest to highest precedence: built-in defaults, an optional
//! `silant.toml` in the working directory, then `SILANT__*` environment
//! variables (for example `SILANT__SERVER__PORT=8080` or
//! `SILANT__GROUPS__MANAGER=Managers`).

use config::{Config, ConfigError, Environment, File};
use permissions::GroupLabels;
use serde::Deserialize;

use crate::principal::DEFAULT_SESSION_COOKIE;

/// Two weeks, matching the session lifetime of the original console
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 1_209_600;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    pub ttl_seconds: u64,
    pub cookie_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub session: SessionSettings,
    #[serde(default)]
    pub groups: GroupLabels,
}

impl Settings {
    /// Load settings for a service listening on `default_port` unless overridden
    pub fn load(default_port: u16) -> Result<Self, ConfigError> {
        Self::builder(default_port)?
            .add_source(File::with_name("silant").required(false))
            .add_source(
                Environment::with_prefix("SILANT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    fn builder(
        default_port: u16,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", i64::from(default_port))?
            .set_default("session.ttl_seconds", DEFAULT_SESSION_TTL_SECONDS as i64)?
            .set_default("session.cookie_name", DEFAULT_SESSION_COOKIE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 4] = [
        "SILANT__SERVER__PORT",
        "SILANT__SESSION__TTL_SECONDS",
        "SILANT__GROUPS__MANAGER",
        "SILANT__SESSION__COOKIE_NAME",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();

        let settings = Settings::load(3001).unwrap();
        assert_eq!(settings.server.bind_address(), "0.0.0.0:3001");
        assert_eq!(settings.session.ttl_seconds, DEFAULT_SESSION_TTL_SECONDS);
        assert_eq!(settings.session.cookie_name, "sessionid");
        assert_eq!(settings.groups, GroupLabels::default());
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        clear_env();
        unsafe {
            std::env::set_var("SILANT__SERVER__PORT", "8080");
            std::env::set_var("SILANT__SESSION__TTL_SECONDS", "60");
            std::env::set_var("SILANT__GROUPS__MANAGER", "Managers");
        }

        let settings = Settings::load(3000).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.session.ttl_seconds, 60);
        assert_eq!(settings.groups.manager, "Managers");
        assert_eq!(settings.groups.client, "Клиенты");

        clear_env();
    }
}
