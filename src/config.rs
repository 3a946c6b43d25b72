//! Runtime configuration: intake endpoint, credentials, camera backend and
//! logging, plus the environment tag sent with each submission.

use std::fmt;
use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::Deserialize;

/// Prefix of the environment variables that override file settings.
pub const ENV_PREFIX: &str = "WALKIN";

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A source could not be read or did not deserialize.
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),

    /// A required setting is empty or absent.
    #[error("missing required setting `{0}`")]
    Missing(&'static str),
}

/// Deployment environment the intake endpoint should file the record under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Environment {
    Development,
    Stage,
    #[default]
    Production,
}

impl Environment {
    /// Reads the `env` launch parameter. Anything unrecognized is production.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("development") => Self::Development,
            Some("stage") => Self::Stage,
            _ => Self::Production,
        }
    }

    /// Returns the value of the `x-environment` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Stage => "stage",
            Self::Production => "production",
        }
    }

    /// Returns the mode indicator text, or `None` in production.
    pub fn mode_label(&self) -> Option<&'static str> {
        match self {
            Self::Development => Some("Development Mode"),
            Self::Stage => Some("Stage Mode"),
            Self::Production => None,
        }
    }
}

#[mutants::skip]
impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the intake API, without the `/walk-in-entry/add` path.
    pub api_url: String,
    /// Value of the `x-api-key` header.
    pub api_key: String,
    /// Program and arguments that stream MJPEG frames to stdout.
    ///
    /// `{facing}` and `{quality}` in arguments are substituted. Empty means
    /// no camera streaming; photos are then picked from disk.
    pub camera_command: Vec<String>,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl AppConfig {
    /// Loads settings from the config file and `WALKIN_*` environment variables.
    ///
    /// An explicit `path` must exist; the default path
    /// (`$XDG_CONFIG_HOME/walkin/config.toml`) is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env = config::Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .list_separator(" ")
            .with_list_parse_key("camera_command");
        match path {
            Some(path) => Self::from_sources(Some(path), true, env),
            None => Self::from_sources(default_path().as_deref(), false, env),
        }
    }

    fn from_sources(
        file: Option<&Path>,
        file_required: bool,
        env: config::Environment,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().set_default("log_level", "info")?;
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(file_required));
        }
        let config: AppConfig = builder.add_source(env).build()?.try_deserialize()?;
        config.checked()
    }

    fn checked(self) -> Result<Self, ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::Missing("api_url"));
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("api_key"));
        }
        Ok(self)
    }
}

/// Returns the default config file location.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("walkin").join("config.toml"))
}

/// Returns the directory log files are written to.
pub fn log_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("walkin").join("logs"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> config::Environment {
        let mut map = config::Map::new();
        for (k, v) in pairs {
            map.insert((*k).to_string(), (*v).to_string());
        }
        config::Environment::with_prefix("WALKIN_TEST")
            .try_parsing(true)
            .list_separator(" ")
            .with_list_parse_key("camera_command")
            .source(Some(map))
    }

    fn toml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    // --- Environment ---

    #[test]
    fn env_param_recognized_values() {
        assert_eq!(
            Environment::from_param(Some("development")),
            Environment::Development
        );
        assert_eq!(Environment::from_param(Some("stage")), Environment::Stage);
    }

    #[test]
    fn env_param_defaults_to_production() {
        assert_eq!(Environment::from_param(None), Environment::Production);
        assert_eq!(Environment::from_param(Some("")), Environment::Production);
        assert_eq!(Environment::from_param(Some("STAGE")), Environment::Production);
        assert_eq!(Environment::from_param(Some("prod")), Environment::Production);
    }

    #[test]
    fn env_header_values() {
        assert_eq!(Environment::Development.as_str(), "development");
        assert_eq!(Environment::Stage.as_str(), "stage");
        assert_eq!(Environment::Production.as_str(), "production");
    }

    #[test]
    fn only_non_production_has_mode_label() {
        assert_eq!(Environment::Development.mode_label(), Some("Development Mode"));
        assert_eq!(Environment::Stage.mode_label(), Some("Stage Mode"));
        assert_eq!(Environment::Production.mode_label(), None);
    }

    // --- AppConfig ---

    #[test]
    fn loads_from_file() {
        let file = toml_file("api_url = \"https://api.example.com\"\napi_key = \"k1\"\n");
        let config = AppConfig::from_sources(Some(file.path()), true, env_from(&[])).unwrap();
        assert_eq!(config.api_url, "https://api.example.com");
        assert_eq!(config.api_key, "k1");
        assert_eq!(config.log_level, "info");
        assert!(config.camera_command.is_empty());
    }

    #[test]
    fn env_overrides_file() {
        let file = toml_file("api_url = \"https://api.example.com\"\napi_key = \"k1\"\n");
        let env = env_from(&[
            ("WALKIN_TEST_API_KEY", "from-env"),
            ("WALKIN_TEST_LOG_LEVEL", "debug"),
        ]);
        let config = AppConfig::from_sources(Some(file.path()), true, env).unwrap();
        assert_eq!(config.api_key, "from-env");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn camera_command_from_env_is_split() {
        let env = env_from(&[
            ("WALKIN_TEST_API_URL", "https://api.example.com"),
            ("WALKIN_TEST_API_KEY", "k"),
            ("WALKIN_TEST_CAMERA_COMMAND", "ffmpeg -f v4l2 -i /dev/video0"),
        ]);
        let config = AppConfig::from_sources(None, false, env).unwrap();
        assert_eq!(
            config.camera_command,
            vec!["ffmpeg", "-f", "v4l2", "-i", "/dev/video0"]
        );
    }

    #[test]
    fn camera_command_from_file_list() {
        let file = toml_file(
            "api_url = \"u\"\napi_key = \"k\"\ncamera_command = [\"cam\", \"--facing\", \"{facing}\"]\n",
        );
        let config = AppConfig::from_sources(Some(file.path()), true, env_from(&[])).unwrap();
        assert_eq!(config.camera_command, vec!["cam", "--facing", "{facing}"]);
    }

    #[test]
    fn missing_key_is_reported() {
        let env = env_from(&[("WALKIN_TEST_API_URL", "https://api.example.com")]);
        let err = AppConfig::from_sources(None, false, env).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("api_key")));
    }

    #[test]
    fn missing_url_is_reported() {
        let err = AppConfig::from_sources(None, false, env_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("api_url")));
    }

    #[test]
    fn optional_missing_file_is_skipped() {
        let env = env_from(&[
            ("WALKIN_TEST_API_URL", "https://api.example.com"),
            ("WALKIN_TEST_API_KEY", "k"),
        ]);
        let config =
            AppConfig::from_sources(Some(Path::new("/nonexistent/walkin.toml")), false, env)
                .unwrap();
        assert_eq!(config.api_key, "k");
    }

    #[test]
    fn required_missing_file_fails() {
        let err = AppConfig::from_sources(
            Some(Path::new("/nonexistent/walkin.toml")),
            true,
            env_from(&[]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }
}
