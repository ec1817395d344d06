//! Layered application settings.
//!
//! Sources, lowest to highest priority: built-in defaults, an optional TOML
//! file, `CCENTRAL_*` environment variables, then command-line overrides.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::source::{Backend, FileBackend, HttpBackend};

/// Environment variable prefix (`CCENTRAL_API_URL`, ...).
pub const ENV_PREFIX: &str = "CCENTRAL";

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Base URL of the ccentral daemon.
    pub api_url: String,
    /// Seconds between refreshes of the selected service.
    pub refresh_interval_secs: u64,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Write logs to this file (TUI mode logs nowhere otherwise).
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// Serve services from a JSON file instead of the daemon.
    #[serde(default)]
    pub data_file: Option<PathBuf>,
    /// Serve the built-in mock service.
    #[serde(default)]
    pub mock: bool,
}

/// Values given on the command line; `None` leaves lower layers in place.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub refresh_interval_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
    pub data_file: Option<PathBuf>,
    pub mock: bool,
}

impl Settings {
    /// Load settings from all layers.
    pub fn load(config_path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        Self::load_with_env(config_path, overrides, None)
    }

    /// Like [`Settings::load`], reading the environment layer from `env`
    /// instead of the process environment when given.
    fn load_with_env(
        config_path: Option<&Path>,
        overrides: &Overrides,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("api_url", crate::source::DEFAULT_ENDPOINT)?
            .set_default("refresh_interval_secs", 2u64)?
            .set_default("request_timeout_secs", 10u64)?
            .set_default("mock", false)?;

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        }

        builder = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true).source(env))
            .set_override_option("api_url", overrides.api_url.clone())?
            .set_override_option("refresh_interval_secs", overrides.refresh_interval_secs)?
            .set_override_option("request_timeout_secs", overrides.request_timeout_secs)?
            .set_override_option("log_file", path_value(&overrides.log_file))?
            .set_override_option("data_file", path_value(&overrides.data_file))?;
        if overrides.mock {
            builder = builder.set_override("mock", true)?;
        }

        let settings: Settings = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.refresh_interval_secs == 0 {
            bail!("refresh_interval_secs must be at least 1");
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be at least 1");
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Build the backend these settings select: the mock service, a data
    /// file, or the HTTP daemon, in that order of precedence.
    pub fn backend(&self) -> Result<Arc<dyn Backend>> {
        if self.mock {
            return Ok(Arc::new(FileBackend::mock()));
        }
        if let Some(ref path) = self.data_file {
            let backend = FileBackend::load(path)
                .with_context(|| format!("Failed to load data file {}", path.display()))?;
            return Ok(Arc::new(backend));
        }
        let backend = HttpBackend::builder()
            .endpoint(&self.api_url)
            .timeout(self.request_timeout())
            .build()?;
        Ok(Arc::new(backend))
    }
}

fn path_value(path: &Option<PathBuf>) -> Option<String> {
    path.as_ref().map(|p| p.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env() -> Option<HashMap<String, String>> {
        Some(HashMap::new())
    }

    fn toml_file(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load_with_env(None, &Overrides::default(), no_env()).unwrap();
        assert_eq!(settings.api_url, "http://127.0.0.1:3000");
        assert_eq!(settings.refresh_interval(), Duration::from_secs(2));
        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
        assert_eq!(settings.log_file, None);
        assert_eq!(settings.data_file, None);
        assert!(!settings.mock);
    }

    #[test]
    fn test_file_layer() {
        let file = toml_file(
            r#"
api_url = "http://ccentral.internal:8080"
refresh_interval_secs = 5
log_file = "/tmp/ccentral.log"
"#,
        );
        let settings =
            Settings::load_with_env(Some(file.path()), &Overrides::default(), no_env()).unwrap();
        assert_eq!(settings.api_url, "http://ccentral.internal:8080");
        assert_eq!(settings.refresh_interval_secs, 5);
        assert_eq!(settings.request_timeout_secs, 10);
        assert_eq!(settings.log_file, Some(PathBuf::from("/tmp/ccentral.log")));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = toml_file("refresh_interval_secs = 5\n");
        let env = HashMap::from([
            ("CCENTRAL_REFRESH_INTERVAL_SECS".to_string(), "7".to_string()),
            ("CCENTRAL_MOCK".to_string(), "true".to_string()),
        ]);
        let settings =
            Settings::load_with_env(Some(file.path()), &Overrides::default(), Some(env)).unwrap();
        assert_eq!(settings.refresh_interval_secs, 7);
        assert!(settings.mock);
    }

    #[test]
    fn test_cli_overrides_everything() {
        let file = toml_file("api_url = \"http://from-file:1\"\n");
        let env = HashMap::from([("CCENTRAL_API_URL".to_string(), "http://from-env:2".to_string())]);
        let overrides = Overrides {
            api_url: Some("http://from-cli:3".to_string()),
            request_timeout_secs: Some(3),
            data_file: Some(PathBuf::from("services.json")),
            ..Overrides::default()
        };
        let settings = Settings::load_with_env(Some(file.path()), &overrides, Some(env)).unwrap();
        assert_eq!(settings.api_url, "http://from-cli:3");
        assert_eq!(settings.request_timeout_secs, 3);
        assert_eq!(settings.data_file, Some(PathBuf::from("services.json")));
    }

    #[test]
    fn test_zero_refresh_rejected() {
        let overrides = Overrides {
            refresh_interval_secs: Some(0),
            ..Overrides::default()
        };
        let err = Settings::load_with_env(None, &overrides, no_env()).unwrap_err();
        assert!(err.to_string().contains("refresh_interval_secs"));
    }

    #[test]
    fn test_unparseable_file_rejected() {
        let file = toml_file("refresh_interval_secs = [not toml");
        assert!(Settings::load_with_env(Some(file.path()), &Overrides::default(), no_env()).is_err());
    }

    #[test]
    fn test_backend_selection() {
        let mut settings = Settings::load_with_env(None, &Overrides::default(), no_env()).unwrap();
        assert_eq!(settings.backend().unwrap().description(), "http: http://127.0.0.1:3000");

        settings.mock = true;
        assert_eq!(settings.backend().unwrap().description(), "mock");

        settings.mock = false;
        settings.data_file = Some(PathBuf::from("/nonexistent/services.json"));
        assert!(settings.backend().is_err());
    }
}
