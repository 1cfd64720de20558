//! Configuration types and loading logic.

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use reqid::RawIdConfig;
use reqid_tracing::TracingConfig;
use serde::Deserialize;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerSettings {
    #[serde(default)]
    pub server: ServerConfig,

    /// Request ID middleware settings, validated at activation.
    #[serde(default)]
    pub request_id: RawIdConfig,

    #[serde(default)]
    pub tracing: TracingConfig,
}

/// Server listen configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
        }
    }
}

fn default_listen_address() -> String {
    "0.0.0.0:3090".to_string()
}

impl ServerSettings {
    /// Load configuration from TOML file and environment variables.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (REQID_ prefix, __ for nesting)
    /// 2. TOML config file
    /// 3. Defaults
    pub fn load(config_path: &str) -> anyhow::Result<Self> {
        Ok(Self::figment(config_path).extract()?)
    }

    fn figment(config_path: &str) -> Figment {
        Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("REQID_").split("__"))
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;
    use reqid::{materialize, ConfigError};

    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        Jail::expect_with(|_jail| {
            let settings = ServerSettings::load("does-not-exist.toml").unwrap();
            assert_eq!(settings.server.listen_address, "0.0.0.0:3090");
            assert_eq!(settings.request_id, RawIdConfig::default());
            assert_eq!(materialize(&settings.request_id).unwrap().length().get(), 21);
            Ok(())
        });
    }

    #[test]
    fn test_toml_request_id_section() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "reqid.toml",
                r#"
                [server]
                listen_address = "127.0.0.1:8080"

                [request_id]
                length = 10

                [[request_id.additional]]
                name = "trace"
                length = 5
                "#,
            )?;

            let settings = ServerSettings::load("reqid.toml").unwrap();
            let config = materialize(&settings.request_id).unwrap();

            assert_eq!(settings.server.listen_address, "127.0.0.1:8080");
            assert_eq!(config.length().get(), 10);
            assert_eq!(config.additional_length("trace").map(|n| n.get()), Some(5));
            Ok(())
        });
    }

    #[test]
    fn test_duplicate_names_survive_loading_and_fail_activation() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "reqid.toml",
                r#"
                [[request_id.additional]]
                name = "trace"
                length = 5

                [[request_id.additional]]
                name = "trace"
                length = 6
                "#,
            )?;

            let settings = ServerSettings::load("reqid.toml").unwrap();
            assert_eq!(
                materialize(&settings.request_id),
                Err(ConfigError::DuplicateKey { name: "trace".into() })
            );
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("reqid.toml", "[request_id]\nlength = 10\n")?;
            jail.set_env("REQID_REQUEST_ID__LENGTH", "32");

            let settings = ServerSettings::load("reqid.toml").unwrap();
            assert_eq!(materialize(&settings.request_id).unwrap().length().get(), 32);
            Ok(())
        });
    }
}
