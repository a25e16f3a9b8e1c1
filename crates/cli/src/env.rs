use crate::error::CliError;
use connectors::config::EnvSource;
use std::{collections::HashMap, fs, path::Path};

/// Process environment overlaid with the entries of `.env` style files.
#[derive(Debug, Clone, Default)]
pub struct EnvManager {
    vars: HashMap<String, String>,
}

impl EnvManager {
    pub fn from_process() -> Self {
        EnvManager {
            vars: std::env::vars().collect(),
        }
    }

    /// Merges `KEY=VALUE` lines from `path`; file entries win over the process.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CliError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::EnvFile(format!("failed to read {}: {e}", path.display()))
        })?;

        self.parse_env_content(&content)
    }

    fn parse_env_content(&mut self, content: &str) -> Result<(), CliError> {
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);
            let Some((key, value)) = line.split_once('=') else {
                return Err(CliError::EnvFile(format!(
                    "malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(CliError::EnvFile(format!("empty key at line {}", line_num + 1)));
            }

            self.vars.insert(key.to_string(), Self::unquote_value(value));
        }

        Ok(())
    }

    fn unquote_value(value: &str) -> String {
        let value = value.trim();
        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                return value[1..value.len() - 1].to_string();
            }
        }
        value.to_string()
    }
}

impl EnvSource for EnvManager {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connectors::config::{ORG_URL_ENV, TOKEN_ENV};
    use std::io::Write;

    #[test]
    fn test_parse_basic_env() {
        let mut env = EnvManager::default();
        let content = r#"
# Comment
AZDO_ORG_SERVICE_URL=https://dev.azure.com/contoso
export AZDO_PERSONAL_ACCESS_TOKEN=abc
        "#;

        env.parse_env_content(content).unwrap();
        assert_eq!(env.var(ORG_URL_ENV).unwrap(), "https://dev.azure.com/contoso");
        assert_eq!(env.var(TOKEN_ENV).unwrap(), "abc");
    }

    #[test]
    fn test_parse_quoted_values() {
        let mut env = EnvManager::default();
        let content = r#"
QUOTED="value with spaces"
SINGLE='single quoted'
UNQUOTED=no_spaces
        "#;

        env.parse_env_content(content).unwrap();
        assert_eq!(env.var("QUOTED").unwrap(), "value with spaces");
        assert_eq!(env.var("SINGLE").unwrap(), "single quoted");
        assert_eq!(env.var("UNQUOTED").unwrap(), "no_spaces");
    }

    #[test]
    fn test_invalid_env_format() {
        let mut env = EnvManager::default();
        assert!(env.parse_env_content("INVALID LINE WITHOUT EQUALS").is_err());
        assert!(env.parse_env_content("=value").is_err());
    }

    #[test]
    fn file_entries_override_existing_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{TOKEN_ENV}=from-file").unwrap();

        let mut env = EnvManager::default();
        env.vars.insert(TOKEN_ENV.to_string(), "from-process".to_string());
        env.load_from_file(file.path()).unwrap();

        assert_eq!(env.var(TOKEN_ENV).unwrap(), "from-file");
    }
}
