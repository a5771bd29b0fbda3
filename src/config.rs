use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::Error;

/// Client configuration.
///
/// The required field (`base_url`) is a constructor parameter; everything
/// else has a default and a `with_*` override.
///
/// ```rust,ignore
/// use taskchat_client::ClientConfig;
///
/// let config = ClientConfig::new("https://api.example.com".parse()?)
///     .with_storage_path("/home/me/.config/taskchat/session.json")
///     .with_timeout(std::time::Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ClientConfig {
    pub(crate) base_url: Url,
    pub(crate) storage_path: Option<PathBuf>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) user_agent: String,
}

impl ClientConfig {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            storage_path: None,
            timeout: None,
            user_agent: concat!("taskchat-client/", env!("CARGO_PKG_VERSION")).into(),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `TASKCHAT_API_URL`: service base URL
    ///
    /// # Optional env vars
    /// - `TASKCHAT_STORAGE_PATH`: file to persist the session in (in-memory otherwise)
    /// - `TASKCHAT_TIMEOUT_SECS`: whole-request timeout in seconds
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL is missing or invalid, or the
    /// timeout is not an integer.
    pub fn from_env() -> Result<Self, Error> {
        let base_url_str = std::env::var("TASKCHAT_API_URL")
            .map_err(|_| Error::Config("TASKCHAT_API_URL is required".into()))?;
        let base_url: Url = base_url_str
            .parse()
            .map_err(|e| Error::Config(format!("TASKCHAT_API_URL: {e}")))?;

        let mut config = Self::new(base_url);

        if let Ok(path) = std::env::var("TASKCHAT_STORAGE_PATH") {
            if !path.trim().is_empty() {
                config = config.with_storage_path(path);
            }
        }
        if let Ok(secs) = std::env::var("TASKCHAT_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("TASKCHAT_TIMEOUT_SECS: {e}")))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn storage_path(&self) -> Option<&PathBuf> {
        self.storage_path.as_ref()
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
