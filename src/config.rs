//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default base address of the content/agent service.
pub const DEFAULT_BASE_URL: &str = "https://builder.empromptu.ai/api_tools";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for the remote service.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base address every endpoint path is appended to.
    pub base_url: String,
    /// Bearer credential.
    pub api_key: SecretString,
    /// Value of the application identifier header.
    pub app_id: String,
    /// Timeout applied to each request.
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn new(api_key: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: SecretString::from(api_key.into()),
            app_id: app_id.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load from `PAGE_CHAT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup("PAGE_CHAT_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("PAGE_CHAT_API_KEY".to_string()))?;
        let app_id = lookup("PAGE_CHAT_APP_ID")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("PAGE_CHAT_APP_ID".to_string()))?;

        let base_url = lookup("PAGE_CHAT_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = match lookup("PAGE_CHAT_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "PAGE_CHAT_TIMEOUT_SECS".to_string(),
                    message: format!("expected a positive number of seconds, got '{raw}'"),
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            base_url,
            api_key: SecretString::from(api_key),
            app_id,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Names used by the ingestion pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Name of the content object created from the submitted URL.
    pub content_object: String,
    /// Name of the summary object derived from the content.
    pub summary_object: String,
    /// Display name of the created agent.
    pub agent_name: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            content_object: "url_content".to_string(),
            summary_object: "url_summary".to_string(),
            agent_name: "Website Content Assistant".to_string(),
        }
    }
}

impl WorkflowConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let pick = |key: &str, default: String| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };
        Self {
            content_object: pick("PAGE_CHAT_CONTENT_OBJECT", defaults.content_object),
            summary_object: pick("PAGE_CHAT_SUMMARY_OBJECT", defaults.summary_object),
            agent_name: pick("PAGE_CHAT_AGENT_NAME", defaults.agent_name),
        }
    }
}
