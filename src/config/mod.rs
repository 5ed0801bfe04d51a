#[cfg(feature = "cli")]
pub mod cli;

use crate::utils::error::{DepromptError, Result};
use crate::utils::validation::{self, Validate};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 8000;
pub const DEFAULT_MAX_CLARIFY_ROUNDS: usize = 5;

/// 服務設定。明確建立後傳入服務，不使用全域狀態。
#[derive(Clone)]
pub struct ServiceConfig {
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub max_prompt_chars: usize,
    pub max_clarify_rounds: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
            max_clarify_rounds: DEFAULT_MAX_CLARIFY_ROUNDS,
        }
    }
}

// API key 不可出現在日誌中
impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .field("max_prompt_chars", &self.max_prompt_chars)
            .field("max_clarify_rounds", &self.max_clarify_rounds)
            .finish()
    }
}

impl ServiceConfig {
    /// 從環境變數建立設定
    ///
    /// - `API_KEY` (必要，但在呼叫時才檢查)
    /// - `DEPROMPT_API_BASE_URL` (預設 https://api.openai.com/v1)
    /// - `DEPROMPT_MODEL` (預設 gpt-3.5-turbo)
    /// - `DEPROMPT_TIMEOUT_SECONDS` (預設 30)
    /// - `DEPROMPT_MAX_PROMPT_CHARS` (預設 8000)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            api_key: non_empty("API_KEY").map(|key| key.trim().to_string()),
            api_base_url: non_empty("DEPROMPT_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(default.api_base_url),
            model: non_empty("DEPROMPT_MODEL").unwrap_or(default.model),
            timeout: parse_or_default(&non_empty, "DEPROMPT_TIMEOUT_SECONDS")
                .map(Duration::from_secs)
                .unwrap_or(default.timeout),
            max_prompt_chars: parse_or_default(&non_empty, "DEPROMPT_MAX_PROMPT_CHARS")
                .unwrap_or(default.max_prompt_chars),
            ..default
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn api_key_configured(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|key| !key.trim().is_empty())
            .unwrap_or(false)
    }

    /// 取得 API key；缺少時回傳 `Configuration` 錯誤
    pub fn require_api_key(&self) -> Result<&str> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(DepromptError::configuration(
                "API key is not configured. Please set the API_KEY environment variable.",
            )),
        }
    }
}

fn parse_or_default<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("⚠️ Ignoring invalid value for {}: {}", name, raw);
            None
        }
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        self.require_api_key()?;
        validation::validate_url("api_base_url", &self.api_base_url)?;
        validation::validate_non_empty_string("model", &self.model)?;
        validation::validate_range("temperature", self.temperature, 0.0, 2.0)?;
        validation::validate_range("max_tokens", self.max_tokens, 1, 32_000)?;
        validation::validate_range("timeout_seconds", self.timeout.as_secs(), 1, 300)?;
        validation::validate_positive_number("max_prompt_chars", self.max_prompt_chars, 1)?;

        tracing::info!("✅ Service configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = ServiceConfig::from_lookup(lookup_from(&[]));
        assert!(config.api_key.is_none());
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_prompt_chars, 8000);
    }

    #[test]
    fn test_env_overrides() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("API_KEY", " sk-test "),
            ("DEPROMPT_API_BASE_URL", "http://localhost:9000/v1/"),
            ("DEPROMPT_MODEL", "gpt-4o-mini"),
            ("DEPROMPT_TIMEOUT_SECONDS", "5"),
            ("DEPROMPT_MAX_PROMPT_CHARS", "200"),
        ]));

        assert_eq!(config.require_api_key().unwrap(), "sk-test");
        assert_eq!(config.api_base_url, "http://localhost:9000/v1");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_prompt_chars, 200);
    }

    #[test]
    fn test_invalid_numbers_fall_back_to_defaults() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("DEPROMPT_TIMEOUT_SECONDS", "soon"),
            ("DEPROMPT_MAX_PROMPT_CHARS", "-1"),
        ]));
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECONDS));
        assert_eq!(config.max_prompt_chars, DEFAULT_MAX_PROMPT_CHARS);
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let config = ServiceConfig::from_lookup(lookup_from(&[("API_KEY", "   ")]));
        assert!(!config.api_key_configured());
        assert!(matches!(
            config.require_api_key(),
            Err(DepromptError::Configuration { .. })
        ));
    }

    #[test]
    fn test_config_validation() {
        assert!(ServiceConfig::default().with_api_key("sk-test").validate().is_ok());
        assert!(ServiceConfig::default().validate().is_err());
        assert!(ServiceConfig::default()
            .with_api_key("sk-test")
            .with_api_base_url("not a url")
            .validate()
            .is_err());
        assert!(ServiceConfig::default()
            .with_api_key("sk-test")
            .with_timeout(Duration::from_secs(0))
            .validate()
            .is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ServiceConfig::default().with_api_key("sk-very-secret");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
