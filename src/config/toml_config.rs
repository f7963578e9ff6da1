use crate::core::RetryPolicy;
use crate::domain::envelope::DEFAULT_PAGE_SIZE;
use crate::domain::ports::{ApiDialect, ConfigProvider};
use crate::utils::error::{Result, StoreError};
use crate::utils::validation::{validate_positive_number, validate_range, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub backend: BackendConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    /// Required: the two backend generations are never guessed.
    pub dialect: ApiDialect,
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
    pub headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub attempts: u32,
    pub delay_ms: u64,
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay_ms: 250,
            backoff_factor: 2.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

const DEFAULT_TIMEOUT_SECONDS: u64 = 15;
const MAX_RETRY_ATTEMPTS: u32 = 10;
const MAX_BACKOFF_FACTOR: f64 = 10.0;
const MAX_RETRY_DELAY_MS: u64 = 60_000;
const DEFAULT_USER_AGENT: &str = concat!("appstore-client/", env!("CARGO_PKG_VERSION"));

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, dialect: ApiDialect) -> Self {
        Self {
            backend: BackendConfig {
                base_url: base_url.into(),
                dialect,
                timeout_seconds: None,
                user_agent: None,
                headers: None,
            },
            pagination: PaginationConfig::default(),
            retry: RetryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| StoreError::Config {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| StoreError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Expands `${VAR}` from the environment; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> String {
        static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
        let re = PLACEHOLDER.get_or_init(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retry.attempts.max(1),
            delay: Duration::from_millis(self.retry.delay_ms),
            backoff_factor: self.retry.backoff_factor,
        }
    }

    pub fn default_page_size(&self) -> u32 {
        self.pagination.default_page_size
    }

    pub fn json_logs(&self) -> bool {
        self.logging.json.unwrap_or(false)
    }
}

impl ConfigProvider for ClientConfig {
    fn base_url(&self) -> &str {
        &self.backend.base_url
    }

    fn dialect(&self) -> ApiDialect {
        self.backend.dialect
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    fn user_agent(&self) -> &str {
        self.backend.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    fn max_page_size(&self) -> u32 {
        self.pagination.max_page_size
    }

    fn default_headers(&self) -> Vec<(String, String)> {
        self.backend
            .headers
            .iter()
            .flat_map(|headers| headers.iter())
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        validate_url("backend.base_url", &self.backend.base_url)?;

        if let Some(timeout) = self.backend.timeout_seconds {
            validate_positive_number("backend.timeout_seconds", timeout, 1)?;
        }
        validate_positive_number(
            "pagination.default_page_size",
            self.pagination.default_page_size.into(),
            1,
        )?;
        validate_positive_number(
            "pagination.max_page_size",
            self.pagination.max_page_size.into(),
            1,
        )?;
        if self.pagination.default_page_size > self.pagination.max_page_size {
            return Err(StoreError::Config {
                message: format!(
                    "pagination.default_page_size ({}) exceeds pagination.max_page_size ({})",
                    self.pagination.default_page_size, self.pagination.max_page_size
                ),
            });
        }
        validate_range("retry.attempts", self.retry.attempts, 1, MAX_RETRY_ATTEMPTS)?;
        if !(1.0..=MAX_BACKOFF_FACTOR).contains(&self.retry.backoff_factor) {
            return Err(StoreError::Config {
                message: format!(
                    "retry.backoff_factor must be between 1.0 and {}, got {}",
                    MAX_BACKOFF_FACTOR, self.retry.backoff_factor
                ),
            });
        }
        validate_range("retry.delay_ms", self.retry.delay_ms, 0, MAX_RETRY_DELAY_MS)?;

        Ok(())
    }
}
