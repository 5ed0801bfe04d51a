use std::time::Duration;
use thiserror::Error;

/// 上游暫時不可用的細分類型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableKind {
    Timeout,
    Connection,
    RateLimited,
}

impl UnavailableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnavailableKind::Timeout => "timeout",
            UnavailableKind::Connection => "connection",
            UnavailableKind::RateLimited => "rate_limited",
        }
    }
}

impl std::fmt::Display for UnavailableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum DepromptError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Upstream unavailable ({kind}): {message}")]
    UpstreamUnavailable {
        kind: UnavailableKind,
        message: String,
        retry_after: Option<Duration>,
    },

    #[error("Upstream rejected the request with status {status}: {message}")]
    UpstreamRejected { status: u16, message: String },

    #[error("Upstream response format error: {message}")]
    UpstreamFormat { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Upstream,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DepromptError {
    pub fn validation(message: impl Into<String>) -> Self {
        DepromptError::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        DepromptError::Configuration {
            message: message.into(),
        }
    }

    pub fn unavailable(kind: UnavailableKind, message: impl Into<String>) -> Self {
        DepromptError::UpstreamUnavailable {
            kind,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn format(message: impl Into<String>) -> Self {
        DepromptError::UpstreamFormat {
            message: message.into(),
        }
    }

    /// 對外回應中的 `error_kind`
    pub fn kind(&self) -> &'static str {
        match self {
            DepromptError::Validation { .. } => "validation_error",
            DepromptError::Configuration { .. } => "configuration_error",
            DepromptError::UpstreamUnavailable { .. } => "upstream_unavailable",
            DepromptError::UpstreamRejected { .. } => "upstream_rejected",
            DepromptError::UpstreamFormat { .. } => "upstream_format_error",
            DepromptError::Io(_) => "internal_error",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DepromptError::Validation { .. } => ErrorCategory::Input,
            DepromptError::Configuration { .. } => ErrorCategory::Configuration,
            DepromptError::UpstreamUnavailable { .. }
            | DepromptError::UpstreamRejected { .. }
            | DepromptError::UpstreamFormat { .. } => ErrorCategory::Upstream,
            DepromptError::Io(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DepromptError::Validation { .. } => ErrorSeverity::Low,
            DepromptError::UpstreamUnavailable { .. } => ErrorSeverity::Medium,
            DepromptError::UpstreamRejected { .. } | DepromptError::UpstreamFormat { .. } => {
                ErrorSeverity::High
            }
            DepromptError::Configuration { .. } | DepromptError::Io(_) => ErrorSeverity::Critical,
        }
    }

    /// 只有暫時性的上游錯誤可以由呼叫端重試
    pub fn is_retryable(&self) -> bool {
        matches!(self, DepromptError::UpstreamUnavailable { .. })
    }

    pub fn unavailable_kind(&self) -> Option<UnavailableKind> {
        match self {
            DepromptError::UpstreamUnavailable { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            DepromptError::UpstreamUnavailable { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// 給使用者看的訊息。上游錯誤一律回傳通用訊息，不洩漏上游細節。
    pub fn user_friendly_message(&self) -> String {
        match self {
            DepromptError::Validation { message } => message.clone(),
            DepromptError::Configuration { message } => message.clone(),
            DepromptError::UpstreamUnavailable {
                kind: UnavailableKind::RateLimited,
                ..
            } => "The prompt service is busy right now. Please try again in a moment.".to_string(),
            DepromptError::UpstreamUnavailable { .. } => {
                "The prompt service is temporarily unavailable. Please try again.".to_string()
            }
            DepromptError::UpstreamRejected { .. } | DepromptError::UpstreamFormat { .. } => {
                "Something went wrong while improving your prompt. Please try again.".to_string()
            }
            DepromptError::Io(_) => "An internal error occurred.".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            DepromptError::Validation { .. } => {
                "Enter a non-empty prompt within the allowed length".to_string()
            }
            DepromptError::Configuration { .. } => {
                "Set the API_KEY environment variable (or .env entry) and restart".to_string()
            }
            DepromptError::UpstreamUnavailable {
                retry_after: Some(wait),
                ..
            } => format!("Retry after {} seconds", wait.as_secs()),
            DepromptError::UpstreamUnavailable { .. } => {
                "Retry the request; check network connectivity if it keeps failing".to_string()
            }
            DepromptError::UpstreamRejected { status: 401 | 403, .. } => {
                "Check that API_KEY is valid for the configured completion API".to_string()
            }
            DepromptError::UpstreamRejected { .. } => {
                "Check the configured model and request parameters".to_string()
            }
            DepromptError::UpstreamFormat { .. } => {
                "Inspect the logged upstream response; the model did not follow the response format"
                    .to_string()
            }
            DepromptError::Io(_) => "Check the listen address and process permissions".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DepromptError>;
