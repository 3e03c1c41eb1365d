// Comparison run settings
// Loaded from ./ice-compare.toml or ~/.config/ice-compare/config.toml

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "ice-compare.toml";

/// Registry connection settings (`[database]`).
#[derive(Clone, Deserialize)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    /// Database identifier; for the SQLite registry, the database file path.
    pub sid: String,
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("sid", &self.sid)
            .finish()
    }
}

/// `[compare]`
#[derive(Debug, Clone, Deserialize)]
pub struct CompareSettings {
    /// Patients to sample per run.
    pub number_of_children: usize,
}

/// `[ice]`
#[derive(Debug, Clone, Deserialize)]
pub struct ForecasterSettings {
    pub service_endpoint: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompareConfig {
    pub database: DatabaseSettings,
    pub compare: CompareSettings,
    pub ice: ForecasterSettings,
}

impl CompareConfig {
    /// Locations tried when no explicit path is given, in order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(DEFAULT_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("ice-compare").join("config.toml"));
        }
        paths
    }

    /// Load from `explicit` if given, otherwise from the first existing
    /// search path. Returns the config and the path it came from.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, PathBuf), ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let searched = Self::search_paths();
                match searched.iter().find(|p| p.is_file()) {
                    Some(found) => found.clone(),
                    None => return Err(ConfigError::NotFound(searched)),
                }
            }
        };
        let config = Self::from_file(&path)?;
        Ok((config, path))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let input = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml(&input).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: CompareConfig = toml::from_str(input).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.sid.trim().is_empty() {
            return Err(ConfigError::Invalid("database.sid must not be empty".into()));
        }

        let endpoint = self.ice.service_endpoint.trim();
        let parsed = url::Url::parse(endpoint).map_err(|e| {
            ConfigError::Invalid(format!("ice.service_endpoint '{endpoint}': {e}"))
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::Invalid(format!(
                "ice.service_endpoint must be http or https, got '{}'",
                parsed.scheme()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID: &str = r#"
[database]
username = "registry_ro"
password = "s3cret"
sid = "/var/lib/registry/registry.db"

[compare]
number_of_children = 250

[ice]
service_endpoint = "http://localhost:8080/opencds-decision-support-service/evaluate"
"#;

    #[test]
    fn parses_all_sections() {
        let config = CompareConfig::from_toml(VALID).unwrap();
        assert_eq!(config.database.username, "registry_ro");
        assert_eq!(config.database.sid, "/var/lib/registry/registry.db");
        assert_eq!(config.compare.number_of_children, 250);
        assert!(config.ice.service_endpoint.ends_with("/evaluate"));
    }

    #[test]
    fn missing_key_is_a_parse_error() {
        let input = VALID.replace("number_of_children = 250", "");
        let err = CompareConfig::from_toml(&input).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("number_of_children"));
    }

    #[test]
    fn missing_section_is_a_parse_error() {
        let input = VALID.replace("[ice]", "[forecaster]");
        assert!(matches!(
            CompareConfig::from_toml(&input),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn endpoint_must_be_http() {
        let input = VALID.replace("http://localhost:8080", "ftp://localhost");
        let err = CompareConfig::from_toml(&input).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let input = VALID.replace(
            "http://localhost:8080/opencds-decision-support-service/evaluate",
            "not a url",
        );
        assert!(matches!(
            CompareConfig::from_toml(&input),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn password_not_in_debug_output() {
        let config = CompareConfig::from_toml(VALID).unwrap();
        let dbg = format!("{:?}", config);
        assert!(!dbg.contains("s3cret"));
        assert!(dbg.contains("registry_ro"));
    }

    #[test]
    fn load_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VALID.as_bytes()).unwrap();

        let (config, path) = CompareConfig::load(Some(file.path())).unwrap();
        assert_eq!(path, file.path());
        assert_eq!(config.compare.number_of_children, 250);
    }

    #[test]
    fn explicit_path_that_does_not_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = CompareConfig::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn parse_error_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[database\n").unwrap();
        let err = CompareConfig::from_file(file.path()).unwrap_err();
        match err {
            ConfigError::Parse { path, .. } => assert_eq!(path, file.path()),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
