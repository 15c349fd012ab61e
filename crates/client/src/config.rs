use std::time::Duration;

use zync_core::job::params::DEFAULT_INSTANCE_TYPE;
use zync_core::job::JobDefaults;

use crate::error::ZyncError;

/// Request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for one Zync site.
///
/// Validated on construction: the base URL must parse as `http` or
/// `https`, and the script name and token must be non-empty.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Site URL without a trailing slash, e.g. `https://studio.zync.io`.
    pub base_url: String,
    /// Name of the API script registered with the site.
    pub script_name: String,
    /// Token issued for `script_name`.
    pub token: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Instance type applied to jobs that do not choose one.
    pub default_instance_type: String,
}

impl ClientConfig {
    pub fn new(
        base_url: impl Into<String>,
        script_name: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, ZyncError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        let script_name = script_name.into();
        let token = token.into();

        let parsed = reqwest::Url::parse(&base_url)
            .map_err(|e| ZyncError::Config(format!("Invalid ZYNC_URL '{base_url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ZyncError::Config(format!(
                "ZYNC_URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }
        if script_name.trim().is_empty() {
            return Err(ZyncError::Config("script name must not be empty".into()));
        }
        if token.trim().is_empty() {
            return Err(ZyncError::Config("token must not be empty".into()));
        }

        Ok(Self {
            base_url,
            script_name,
            token,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_instance_type: DEFAULT_INSTANCE_TYPE.to_string(),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_default_instance_type(mut self, instance_type: impl Into<String>) -> Self {
        self.default_instance_type = instance_type.into();
        self
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var                      | Default          |
    /// |------------------------------|------------------|
    /// | `ZYNC_URL`                   | required         |
    /// | `ZYNC_SCRIPT_NAME`           | required         |
    /// | `ZYNC_TOKEN`                 | required         |
    /// | `ZYNC_TIMEOUT_SECS`          | `10`             |
    /// | `ZYNC_DEFAULT_INSTANCE_TYPE` | `n1-standard-8`  |
    pub fn from_env() -> Result<Self, ZyncError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ZyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| ZyncError::Config(format!("{key} must be set")))
        };

        let mut config = Self::new(
            required("ZYNC_URL")?,
            required("ZYNC_SCRIPT_NAME")?,
            required("ZYNC_TOKEN")?,
        )?;

        if let Some(raw) = lookup("ZYNC_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| {
                ZyncError::Config(format!("ZYNC_TIMEOUT_SECS must be a valid u64, got '{raw}'"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(instance_type) = lookup("ZYNC_DEFAULT_INSTANCE_TYPE") {
            config.default_instance_type = instance_type;
        }

        Ok(config)
    }

    /// Job defaults derived from this site configuration.
    pub fn job_defaults(&self) -> JobDefaults {
        JobDefaults {
            instance_type: self.default_instance_type.clone(),
        }
    }

    /// Join `path` (starting with `/`) onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
