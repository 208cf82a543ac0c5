//! Provider-level configuration.
//!
//! The provider block holds the server URL and the credentials used for
//! HTTP Basic authentication. Any of them may instead come from the
//! environment.

use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use url::Url;

use crate::schema::{Attribute, Diagnostic, Schema, Validator};
use crate::validation::is_http_url;

/// Environment variable holding the server URL.
pub const ENV_SERVER_URL: &str = "NXRM_SERVER_URL";
/// Environment variable holding the username.
pub const ENV_SERVER_USERNAME: &str = "NXRM_SERVER_USERNAME";
/// Environment variable holding the password.
pub const ENV_SERVER_PASSWORD: &str = "NXRM_SERVER_PASSWORD";

/// Provider configuration as written by the user.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the server, e.g. `https://nexus.example.com`.
    pub url: Option<String>,
    /// Username for HTTP Basic authentication.
    pub username: Option<String>,
    /// Password for HTTP Basic authentication.
    pub password: Option<String>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Resolved connection settings, ready to build a client from.
#[derive(Clone)]
pub struct NexusConnection {
    /// Base URL of the server.
    pub base_url: Url,
    /// Username for HTTP Basic authentication.
    pub username: String,
    /// Password for HTTP Basic authentication.
    pub password: String,
}

impl fmt::Debug for NexusConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NexusConnection")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl ProviderConfig {
    /// Schema of the provider block.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_description("Sonatype Nexus Repository connection settings")
            .with_attribute(
                "url",
                Attribute::optional_string()
                    .with_description(format!(
                        "Base URL of the server. Falls back to {}.",
                        ENV_SERVER_URL
                    ))
                    .with_validator(Validator::HttpUrl),
            )
            .with_attribute(
                "username",
                Attribute::optional_string().with_description(format!(
                    "Username for HTTP Basic authentication. Falls back to {}.",
                    ENV_SERVER_USERNAME
                )),
            )
            .with_attribute(
                "password",
                Attribute::optional_string()
                    .sensitive()
                    .with_description(format!(
                        "Password for HTTP Basic authentication. Falls back to {}.",
                        ENV_SERVER_PASSWORD
                    )),
            )
    }

    /// Parse the provider block. A null block is an empty configuration.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Self::deserialize(value)
    }

    /// Resolve against the process environment.
    pub fn resolve_from_env(&self) -> Result<NexusConnection, Vec<Diagnostic>> {
        self.resolve(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration, falling back to `lookup` for unset values.
    ///
    /// Configured values win over the environment. Empty strings count as
    /// unset.
    pub fn resolve<F>(&self, lookup: F) -> Result<NexusConnection, Vec<Diagnostic>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |configured: &Option<String>, key: &str| {
            configured
                .clone()
                .filter(|v| !v.is_empty())
                .or_else(|| lookup(key).filter(|v| !v.is_empty()))
        };

        let url = pick(&self.url, ENV_SERVER_URL);
        let username = pick(&self.username, ENV_SERVER_USERNAME);
        let password = pick(&self.password, ENV_SERVER_PASSWORD);

        let mut diagnostics = Vec::new();

        let base_url = match url {
            None => {
                diagnostics.push(missing_setting("url", ENV_SERVER_URL));
                None
            },
            Some(raw) if !is_http_url(&raw) => {
                diagnostics.push(
                    Diagnostic::error("Invalid Attribute Value Match")
                        .with_detail(format!("Attribute url must be a valid HTTP URL, got: {}", raw))
                        .with_attribute("url"),
                );
                None
            },
            Some(raw) => match Url::parse(raw.trim_end_matches('/')) {
                Ok(parsed) => Some(parsed),
                Err(err) => {
                    diagnostics.push(
                        Diagnostic::error("Invalid Attribute Value Match")
                            .with_detail(format!("Attribute url could not be parsed: {}", err))
                            .with_attribute("url"),
                    );
                    None
                },
            },
        };
        if username.is_none() {
            diagnostics.push(missing_setting("username", ENV_SERVER_USERNAME));
        }
        if password.is_none() {
            diagnostics.push(missing_setting("password", ENV_SERVER_PASSWORD));
        }

        match (base_url, username, password) {
            (Some(base_url), Some(username), Some(password)) if diagnostics.is_empty() => {
                Ok(NexusConnection {
                    base_url,
                    username,
                    password,
                })
            },
            _ => Err(diagnostics),
        }
    }
}

fn missing_setting(attribute: &str, env_key: &str) -> Diagnostic {
    Diagnostic::error("Missing provider configuration")
        .with_detail(format!(
            "The provider attribute \"{}\" is not set and {} is empty.",
            attribute, env_key
        ))
        .with_attribute(attribute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_resolve_from_config() {
        let config = ProviderConfig::from_value(&json!({
            "url": "http://localhost:8081/",
            "username": "admin",
            "password": "admin123"
        }))
        .unwrap();

        let conn = config.resolve(env(&[])).unwrap();
        assert_eq!(conn.base_url.as_str(), "http://localhost:8081/");
        assert_eq!(conn.username, "admin");
        assert_eq!(conn.password, "admin123");
    }

    #[test]
    fn test_environment_fallback() {
        let config = ProviderConfig::from_value(&Value::Null).unwrap();
        let conn = config
            .resolve(env(&[
                (ENV_SERVER_URL, "https://nexus.example.com"),
                (ENV_SERVER_USERNAME, "ci"),
                (ENV_SERVER_PASSWORD, "secret"),
            ]))
            .unwrap();
        assert_eq!(conn.base_url.host_str(), Some("nexus.example.com"));
        assert_eq!(conn.username, "ci");
    }

    #[test]
    fn test_config_wins_over_environment() {
        let config = ProviderConfig {
            username: Some("from-config".into()),
            ..Default::default()
        };
        let conn = config
            .resolve(env(&[
                (ENV_SERVER_URL, "https://nexus.example.com"),
                (ENV_SERVER_USERNAME, "from-env"),
                (ENV_SERVER_PASSWORD, "secret"),
            ]))
            .unwrap();
        assert_eq!(conn.username, "from-config");
    }

    #[test]
    fn test_missing_settings_are_reported() {
        let diagnostics = ProviderConfig::default().resolve(env(&[])).unwrap_err();
        let attributes: Vec<_> = diagnostics
            .iter()
            .filter_map(|d| d.attribute.as_deref())
            .collect();
        assert_eq!(attributes, vec!["url", "username", "password"]);
        assert!(diagnostics[0].mentions(ENV_SERVER_URL));
    }

    #[test]
    fn test_invalid_url() {
        let config = ProviderConfig {
            url: Some("ftp://nexus".into()),
            username: Some("u".into()),
            password: Some("p".into()),
        };
        let diagnostics = config.resolve(env(&[])).unwrap_err();
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].mentions("Attribute url must be a valid HTTP URL, got: ftp://nexus"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = ProviderConfig {
            url: Some("http://localhost:8081".into()),
            username: Some("admin".into()),
            password: Some("hunter2".into()),
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));

        let conn = config.resolve(env(&[])).unwrap();
        assert!(!format!("{:?}", conn).contains("hunter2"));
    }

    #[test]
    fn test_schema_marks_password_sensitive() {
        let schema = ProviderConfig::schema();
        assert!(schema.block.attributes["password"].flags.sensitive);
        assert!(!schema.block.attributes["url"].flags.required);
    }
}
