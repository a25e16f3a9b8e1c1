use crate::error::CliError;
use clap::Args;
use connectors::config::ConnectionConfig;
use tracing::debug;

/// Where the connection settings come from. Flags win over the config file,
/// which wins over the environment.
#[derive(Args, Debug, Default)]
pub struct ConnectionArgs {
    #[arg(long, global = true, help = "JSON file with the connection settings")]
    pub config: Option<String>,

    #[arg(long, global = true, help = "KEY=VALUE file merged into the environment")]
    pub env_file: Option<String>,

    #[arg(long, global = true, help = "Organization URL, e.g. https://dev.azure.com/contoso")]
    pub org_url: Option<String>,

    #[arg(long, global = true, help = "Personal access token")]
    pub token: Option<String>,
}

impl ConnectionArgs {
    pub fn connection_config(&self) -> Result<ConnectionConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => {
                debug!(path = %path, "loading connection settings");
                ConnectionConfig::from_file(path)?
            }
            None => ConnectionConfig::default(),
        };

        if let Some(url) = &self.org_url {
            config.organization_url = Some(url.clone());
        }
        if let Some(token) = &self.token {
            config.personal_access_token = Some(token.clone());
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn flags_override_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"organization_url": "https://dev.azure.com/from-file", "personal_access_token": "file-token"}}"#
        )
        .unwrap();

        let args = ConnectionArgs {
            config: Some(file.path().display().to_string()),
            org_url: Some("https://dev.azure.com/from-flag".into()),
            ..Default::default()
        };
        let config = args.connection_config().unwrap();

        assert_eq!(
            config.organization_url.as_deref(),
            Some("https://dev.azure.com/from-flag")
        );
        assert_eq!(config.personal_access_token.as_deref(), Some("file-token"));
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let args = ConnectionArgs {
            config: Some("/nonexistent/azdo.json".into()),
            ..Default::default()
        };
        assert!(matches!(
            args.connection_config(),
            Err(CliError::Configuration(_))
        ));
    }
}
