use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use paywise_auth::{AuthClientConfig, DEFAULT_API_BASE_URL};
use paywise_http::{HttpClientConfig, TransportSecurity};
use serde::{Deserialize, Serialize};
use url::Url;

/// Config file read when `--config` is not given. Missing is fine.
pub const DEFAULT_CONFIG_FILE: &str = "./paywise.yaml";

/// Environment variable prefix; `__` separates nested keys.
pub const ENV_PREFIX: &str = "PAYWISE_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub api_base_url: String,
    pub session_file: PathBuf,
    #[serde(with = "paywise_utils::humantime_serde")]
    pub request_timeout: Duration,
    pub allow_insecure_http: bool,
    pub logging: LoggingConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            session_file: default_session_file(),
            request_timeout: Duration::from_secs(30),
            allow_insecure_http: true,
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `warn` or `paywise_auth=debug`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn default_session_file() -> PathBuf {
    let relative = Path::new(".paywise").join("session.json");
    match dirs::home_dir() {
        Some(home) => home.join(relative),
        None => relative,
    }
}

impl CliConfig {
    /// Layered load: defaults -> YAML file -> `PAYWISE_*` environment.
    ///
    /// A missing file is skipped unless it was named explicitly.
    ///
    /// # Errors
    ///
    /// Fails when an explicitly named file is missing or a value does not
    /// deserialize. Unknown keys are ignored.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        match path {
            Some(path) if !path.is_file() => {
                anyhow::bail!("config file not found: {}", path.display());
            }
            Some(path) => figment = figment.merge(Yaml::file(path)),
            None => figment = figment.merge(Yaml::file(DEFAULT_CONFIG_FILE)),
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid PayWise configuration")
    }

    /// Client configuration for the SDK.
    ///
    /// # Errors
    ///
    /// Fails when the base URL does not parse or is rejected by
    /// [`AuthClientConfig::validate`].
    pub fn auth_client_config(&self) -> anyhow::Result<AuthClientConfig> {
        let transport = if self.allow_insecure_http {
            TransportSecurity::AllowInsecureHttp
        } else {
            TransportSecurity::TlsOnly
        };
        let mut config = AuthClientConfig {
            api_base_url: Url::parse(&self.api_base_url)
                .with_context(|| format!("invalid api_base_url '{}'", self.api_base_url))?,
            http: HttpClientConfig {
                request_timeout: self.request_timeout,
                user_agent: format!("paywise-cli/{}", env!("CARGO_PKG_VERSION")),
                ..HttpClientConfig::default()
            }
            .with_transport(transport),
            ..AuthClientConfig::default()
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_point_at_local_backend() {
        let config = CliConfig::default();
        assert_eq!(config.api_base_url, "http://127.0.0.1:8000/api/");
        assert!(config.session_file.ends_with(".paywise/session.json"));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.allow_insecure_http);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn yaml_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "paywise.yaml",
                r"
api_base_url: https://paywise.example.com/api
request_timeout: 5s
logging:
  level: info
",
            )?;
            jail.set_env("PAYWISE_LOGGING__FORMAT", "json");
            jail.set_env("PAYWISE_ALLOW_INSECURE_HTTP", "false");

            let config = CliConfig::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.api_base_url, "https://paywise.example.com/api");
            assert_eq!(config.request_timeout, Duration::from_secs(5));
            assert_eq!(config.logging.level, "info");
            assert_eq!(config.logging.format, LogFormat::Json);
            assert!(!config.allow_insecure_http);
            Ok(())
        });
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        Jail::expect_with(|_| {
            assert!(CliConfig::load(Some(Path::new("nope.yaml"))).is_err());
            assert!(CliConfig::load(None).is_ok());
            Ok(())
        });
    }

    #[test]
    fn auth_config_is_normalized() {
        let config = CliConfig {
            api_base_url: "http://localhost:8000/api".to_owned(),
            request_timeout: Duration::from_secs(3),
            ..CliConfig::default()
        };
        let auth = config.auth_client_config().unwrap();
        assert_eq!(auth.api_base_url.as_str(), "http://localhost:8000/api/");
        assert_eq!(auth.http.request_timeout, Duration::from_secs(3));
        assert_eq!(auth.http.transport, TransportSecurity::AllowInsecureHttp);
        assert!(auth.http.user_agent.starts_with("paywise-cli/"));
    }

    #[test]
    fn plain_http_needs_opt_in() {
        let config = CliConfig {
            allow_insecure_http: false,
            ..CliConfig::default()
        };
        assert!(config.auth_client_config().is_err());
    }
}
