use engine_core::error::ConfigurationError;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, path::Path, time::Duration};

pub const ORG_URL_ENV: &str = "AZDO_ORG_SERVICE_URL";
pub const TOKEN_ENV: &str = "AZDO_PERSONAL_ACCESS_TOKEN";

const ORG_URL_FIELD: &str = "organization_url";
const TOKEN_FIELD: &str = "personal_access_token";

/// Source of environment defaults.
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Per-connection settings as written by the user. Every field may be left
/// out and filled from the environment.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub organization_url: Option<String>,
    pub personal_access_token: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("organization_url", &self.organization_url)
            .field(
                "personal_access_token",
                &self.personal_access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl ConnectionConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|err| {
            ConfigurationError::new("config", format!("cannot read {}: {err}", path.display()))
        })?;
        serde_json::from_str(&source).map_err(|err| {
            ConfigurationError::new("config", format!("invalid JSON in {}: {err}", path.display()))
        })
    }

    /// Combines explicit values with environment defaults. Explicit values
    /// win; empty strings count as missing.
    pub fn resolve(&self, env: &dyn EnvSource) -> Result<ResolvedConfig, ConfigurationError> {
        let pick = |explicit: &Option<String>, key: &str| {
            non_empty(explicit.clone()).or_else(|| non_empty(env.var(key)))
        };

        let organization_url = pick(&self.organization_url, ORG_URL_ENV);
        let personal_access_token = pick(&self.personal_access_token, TOKEN_ENV);

        match (organization_url, personal_access_token) {
            (Some(organization_url), Some(personal_access_token)) => {
                let organization = organization_name(&organization_url)?;
                Ok(ResolvedConfig {
                    organization_url,
                    organization,
                    personal_access_token,
                    request_timeout: self.request_timeout_secs.map(Duration::from_secs),
                })
            }
            (url, token) => {
                let missing = [
                    url.is_none().then_some(ORG_URL_FIELD),
                    token.is_none().then_some(TOKEN_FIELD),
                ]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>();

                Err(ConfigurationError::new(
                    missing.join(", "),
                    format!(
                        "'{ORG_URL_FIELD}' and '{TOKEN_FIELD}' must be set in the connection \
                         configuration or through {ORG_URL_ENV} and {TOKEN_ENV}; missing: {}",
                        missing.join(", ")
                    ),
                ))
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Fully resolved connection settings.
#[derive(Clone, PartialEq)]
pub struct ResolvedConfig {
    pub organization_url: String,
    pub organization: String,
    pub personal_access_token: String,
    pub request_timeout: Option<Duration>,
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("organization_url", &self.organization_url)
            .field("organization", &self.organization)
            .field("personal_access_token", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Organization name encoded in an organization URL: the subdomain of a
/// `*.visualstudio.com` host, otherwise the last path segment.
pub fn organization_name(url: &str) -> Result<String, ConfigurationError> {
    let parsed = Url::parse(url.trim()).map_err(|err| {
        ConfigurationError::new(ORG_URL_FIELD, format!("'{url}' is not a valid URL: {err}"))
    })?;

    if let Some(org) = parsed
        .host_str()
        .and_then(|host| host.strip_suffix(".visualstudio.com"))
        .and_then(|prefix| prefix.split('.').next())
        .filter(|org| !org.is_empty())
    {
        return Ok(org.to_string());
    }

    parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .ok_or_else(|| {
            ConfigurationError::new(
                ORG_URL_FIELD,
                format!("'{url}' does not name an organization"),
            )
        })
}
