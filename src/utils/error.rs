use thiserror::Error;

/// Envelope error codes that mean "the caller has to authenticate again".
const AUTH_ERROR_CODES: &[&str] = &[
    "UNAUTHORIZED",
    "FORBIDDEN",
    "TOKEN_EXPIRED",
    "INVALID_TOKEN",
    "INVALID_CREDENTIALS",
    "USER_BANNED",
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Transport error: {message}")]
    Transport { message: String, timeout: bool },

    #[error("Server error [{code}]: {message}")]
    Server { code: String, message: String },

    #[error("Unexpected response shape: {message}")]
    Decode { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Authentication,
    Missing,
    Network,
    Backend,
    Protocol,
    Setup,
    Bug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl StoreError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        StoreError::Auth {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        StoreError::Decode {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        StoreError::Transport {
            message: message.into(),
            timeout: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        StoreError::Internal {
            message: message.into(),
        }
    }

    /// Classifies an envelope that came back with `success = false`.
    pub fn from_envelope_failure(code: Option<&str>, message: Option<&str>) -> Self {
        let message = message.unwrap_or("request was rejected by the server").to_string();
        match code {
            Some(code) if AUTH_ERROR_CODES.contains(&code) => StoreError::Auth { message },
            Some(code) if code == "NOT_FOUND" || code.ends_with("_NOT_FOUND") => {
                StoreError::NotFound { resource: message }
            }
            Some(code) => StoreError::Server {
                code: code.to_string(),
                message,
            },
            None => StoreError::Server {
                code: "UNKNOWN".to_string(),
                message,
            },
        }
    }

    /// Classifies a non-2xx HTTP status. `code`/`message` come from the error
    /// body when the server sent an envelope along with the status.
    pub fn from_status(
        status: u16,
        resource: &str,
        code: Option<&str>,
        message: Option<&str>,
    ) -> Self {
        match status {
            401 | 403 => StoreError::Auth {
                message: message
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("HTTP {} for {}", status, resource)),
            },
            404 => StoreError::NotFound {
                resource: resource.to_string(),
            },
            408 | 429 | 502 | 503 | 504 => StoreError::Transport {
                message: format!("HTTP {} for {}", status, resource),
                timeout: status == 408 || status == 504,
            },
            _ => {
                let message = message
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("HTTP {} for {}", status, resource));
                match code {
                    // A coded body is classified like an envelope failure.
                    Some(code) => Self::from_envelope_failure(Some(code), Some(&message)),
                    None => StoreError::Server {
                        code: format!("HTTP_{}", status),
                        message,
                    },
                }
            }
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            StoreError::Validation { .. } => ErrorCategory::Input,
            StoreError::Auth { .. } => ErrorCategory::Authentication,
            StoreError::NotFound { .. } => ErrorCategory::Missing,
            StoreError::Transport { .. } => ErrorCategory::Network,
            StoreError::Server { .. } => ErrorCategory::Backend,
            StoreError::Decode { .. } => ErrorCategory::Protocol,
            StoreError::Config { .. } => ErrorCategory::Setup,
            StoreError::Internal { .. } => ErrorCategory::Bug,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            StoreError::Validation { .. } | StoreError::NotFound { .. } => ErrorSeverity::Low,
            StoreError::Transport { .. } | StoreError::Auth { .. } => ErrorSeverity::Medium,
            StoreError::Server { .. } | StoreError::Config { .. } => ErrorSeverity::High,
            StoreError::Decode { .. } | StoreError::Internal { .. } => ErrorSeverity::Critical,
        }
    }

    /// Only transport failures are worth retrying, and only when the caller
    /// decides to.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Transport { .. })
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            StoreError::Validation { field, message } => {
                format!("Please check {}: {}", field, message)
            }
            StoreError::Auth { .. } => "Your session is no longer valid.".to_string(),
            StoreError::NotFound { .. } => "The requested item does not exist.".to_string(),
            StoreError::Transport { timeout: true, .. } => {
                "The store did not answer in time.".to_string()
            }
            StoreError::Transport { .. } => "Could not reach the store.".to_string(),
            StoreError::Server { message, .. } => message.clone(),
            StoreError::Decode { .. } => "The store sent a response we cannot read.".to_string(),
            StoreError::Config { message } => format!("Configuration problem: {}", message),
            StoreError::Internal { .. } => "Something went wrong inside the client.".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            StoreError::Validation { .. } => "Correct the input and try again",
            StoreError::Auth { .. } => "Log in again",
            StoreError::NotFound { .. } => "Refresh the listing; the item may have been removed",
            StoreError::Transport { .. } => "Check the network connection and retry later",
            StoreError::Server { .. } => "Try again later or contact support with the error code",
            StoreError::Decode { .. } => "Update the client; the backend format has changed",
            StoreError::Config { .. } => "Fix the configuration file or command-line flags",
            StoreError::Internal { .. } => "Report this as a bug",
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StoreError::Transport {
                message: err.to_string(),
                timeout: true,
            }
        } else if err.is_decode() {
            StoreError::Transport {
                message: format!("malformed response: {}", err),
                timeout: false,
            }
        } else if err.is_builder() {
            StoreError::Internal {
                message: err.to_string(),
            }
        } else {
            StoreError::Transport {
                message: err.to_string(),
                timeout: false,
            }
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;
        match err.classify() {
            Category::Syntax | Category::Eof => StoreError::Transport {
                message: format!("malformed response: {}", err),
                timeout: false,
            },
            Category::Data => StoreError::Decode {
                message: err.to_string(),
            },
            Category::Io => StoreError::Transport {
                message: err.to_string(),
                timeout: false,
            },
        }
    }
}

impl From<url::ParseError> for StoreError {
    fn from(err: url::ParseError) -> Self {
        StoreError::Config {
            message: format!("invalid URL: {}", err),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Config {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
