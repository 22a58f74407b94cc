use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_GREETING: &str = "Hello! I am your financial analysis assistant. Ask me about the metrics, the analysis methods, or the statement you uploaded.";

/// Label queries used to find the rows the engine depends on. Each list is a
/// set of aliases; a row matches if its label contains any of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelAliases {
    pub total_assets: Vec<String>,
    pub current_assets: Vec<String>,
    pub current_liabilities: Vec<String>,
}

impl Default for LabelAliases {
    fn default() -> Self {
        Self {
            total_assets: vec!["TỔNG CỘNG TÀI SẢN".to_string(), "TOTAL ASSETS".to_string()],
            current_assets: vec!["TÀI SẢN NGẮN HẠN".to_string(), "CURRENT ASSETS".to_string()],
            current_liabilities: vec![
                "NỢ NGẮN HẠN".to_string(),
                "CURRENT LIABILITIES".to_string(),
            ],
        }
    }
}

impl LabelAliases {
    pub fn validate(&self) -> Result<()> {
        for (name, aliases) in [
            ("total_assets", &self.total_assets),
            ("current_assets", &self.current_assets),
            ("current_liabilities", &self.current_liabilities),
        ] {
            if aliases.is_empty() {
                return Err(AnalysisError::InvalidConfig(format!(
                    "label aliases for '{}' must not be empty",
                    name
                )));
            }
            if aliases.iter().any(|alias| alias.trim().is_empty()) {
                return Err(AnalysisError::InvalidConfig(format!(
                    "label aliases for '{}' contain a blank entry",
                    name
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Model identifier passed to the text generator.
    pub model: String,
    pub labels: LabelAliases,
    pub request_timeout_secs: u64,
    /// First assistant turn of every conversation. Shown to the user only.
    pub greeting: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            labels: LabelAliases::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            greeting: DEFAULT_GREETING.to_string(),
        }
    }
}

impl AnalyzerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "model identifier must not be empty".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(AnalysisError::InvalidConfig(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        self.labels.validate()
    }
}

/// Opaque API key handed over by the host's secret store.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Absence (or a blank value) is a precondition failure, reported before
    /// any call is attempted.
    pub fn require(value: Option<String>) -> Result<Self> {
        match value {
            Some(key) if !key.trim().is_empty() => Ok(Self(key.trim().to_string())),
            _ => Err(AnalysisError::MissingCredential(
                "no API key configured for the text generation service".to_string(),
            )),
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}
