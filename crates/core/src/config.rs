use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use directories::{BaseDirs, ProjectDirs};
use once_cell::sync::Lazy;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);
pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_secs(30);

static ENV_API_URL: &str = "TODOMASTER_API_URL";
static ENV_TIMEOUT_MS: &str = "TODOMASTER_TIMEOUT_MS";
static ENV_DATA_DIR: &str = "TODOMASTER_DATA_DIR";

static PROJECT_DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("dev", "todomaster", "todomaster"));

/// Values supplied on the command line; `None` falls through to the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub health_interval: Option<Duration>,
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: String,
    timeout: Duration,
    health_interval: Option<Duration>,
    data_dir: PathBuf,
}

impl ClientConfig {
    /// Config pointing at `base_url` with default timeout and the working
    /// directory as data dir. Intended for tests and embedding.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            health_interval: Some(DEFAULT_HEALTH_INTERVAL),
            data_dir: PathBuf::from(".todomaster"),
        }
    }

    /// Resolve every setting from the overrides, then environment variables,
    /// then platform defaults.
    pub fn discover(overrides: ConfigOverrides) -> Result<Self> {
        let base_url = match overrides.base_url {
            Some(url) => url,
            None => env::var(ENV_API_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        };
        validate_base_url(&base_url)?;

        let timeout_ms = match overrides.timeout_ms {
            Some(ms) => ms,
            None => match env::var(ENV_TIMEOUT_MS) {
                Ok(raw) => raw
                    .trim()
                    .parse()
                    .with_context(|| format!("{ENV_TIMEOUT_MS} must be milliseconds, got '{raw}'"))?,
                Err(_) => DEFAULT_TIMEOUT.as_millis() as u64,
            },
        };
        if timeout_ms == 0 {
            bail!("request timeout must be greater than zero");
        }

        let health_interval = match overrides.health_interval {
            Some(interval) if interval.is_zero() => None,
            Some(interval) => Some(interval),
            None => Some(DEFAULT_HEALTH_INTERVAL),
        };

        let data_dir = resolve_data_dir(overrides.data_dir)?;

        Ok(Self {
            base_url,
            timeout: Duration::from_millis(timeout_ms),
            health_interval,
            data_dir,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `None` disables periodic probing.
    pub fn health_interval(&self) -> Option<Duration> {
        self.health_interval
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("todomaster.log")
    }
}

fn validate_base_url(raw: &str) -> Result<()> {
    let parsed = reqwest::Url::parse(raw).with_context(|| format!("invalid API URL '{raw}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("API URL must use http or https, got '{}'", parsed.scheme());
    }
    Ok(())
}

fn resolve_data_dir(data_dir_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = data_dir_override {
        return Ok(dir);
    }

    if let Ok(env_dir) = env::var(ENV_DATA_DIR) {
        return Ok(PathBuf::from(env_dir));
    }

    if let Some(project) = &*PROJECT_DIRS {
        return Ok(project.data_dir().to_path_buf());
    }

    if let Some(base) = BaseDirs::new() {
        return Ok(base.home_dir().join(".todomaster"));
    }

    Ok(env::current_dir()?.join(".todomaster"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn overrides_take_precedence() {
        let dir = TempDir::new().unwrap();
        let config = ClientConfig::discover(ConfigOverrides {
            base_url: Some("http://tasks.local:8080/api".into()),
            timeout_ms: Some(2500),
            health_interval: Some(Duration::from_secs(5)),
            data_dir: Some(dir.path().to_path_buf()),
        })
        .unwrap();

        assert_eq!(config.base_url(), "http://tasks.local:8080/api");
        assert_eq!(config.timeout(), Duration::from_millis(2500));
        assert_eq!(config.health_interval(), Some(Duration::from_secs(5)));
        assert_eq!(config.data_dir(), dir.path());
    }

    #[test]
    fn zero_health_interval_disables_probing() {
        let config = ClientConfig::discover(ConfigOverrides {
            base_url: Some(DEFAULT_BASE_URL.into()),
            health_interval: Some(Duration::ZERO),
            data_dir: Some(PathBuf::from("/tmp/todomaster-test")),
            ..ConfigOverrides::default()
        })
        .unwrap();
        assert_eq!(config.health_interval(), None);
    }

    #[test]
    fn rejects_invalid_url_and_zero_timeout() {
        let bad_url = ClientConfig::discover(ConfigOverrides {
            base_url: Some("not a url".into()),
            data_dir: Some(PathBuf::from("/tmp")),
            ..ConfigOverrides::default()
        });
        assert!(bad_url.is_err());

        let zero_timeout = ClientConfig::discover(ConfigOverrides {
            base_url: Some(DEFAULT_BASE_URL.into()),
            timeout_ms: Some(0),
            data_dir: Some(PathBuf::from("/tmp")),
            ..ConfigOverrides::default()
        });
        assert!(zero_timeout.is_err());
    }

    #[test]
    fn new_uses_ten_second_timeout() {
        let config = ClientConfig::new(DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }
}
