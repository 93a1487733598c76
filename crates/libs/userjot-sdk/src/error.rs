use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use thiserror::Error;

pub mod code {
    pub const NOT_CONFIGURED: &str = "SDK_NOT_CONFIGURED";
    pub const METADATA_PENDING: &str = "SDK_METADATA_PENDING";
    pub const METADATA_FETCH_FAILED: &str = "SDK_METADATA_FETCH_FAILED";
    pub const TOKEN_ENCODING_FAILED: &str = "SDK_TOKEN_ENCODING_FAILED";
    pub const INVALID_URL: &str = "SDK_INVALID_URL";
    pub const VALIDATION_INVALID_ARGUMENT: &str = "SDK_VALIDATION_INVALID_ARGUMENT";
    pub const CONFIG_INVALID: &str = "SDK_CONFIG_INVALID";
    pub const INTERNAL: &str = "SDK_INTERNAL_ERROR";
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
#[non_exhaustive]
pub enum ErrorCategory {
    Validation,
    Config,
    Session,
    Transport,
    Encoding,
    Internal,
}

pub type ErrorDetails = BTreeMap<String, JsonValue>;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Error)]
#[error("{machine_code}: {message}")]
#[non_exhaustive]
pub struct SdkError {
    pub machine_code: String,
    pub category: ErrorCategory,
    pub retryable: bool,
    pub is_user_actionable: bool,
    pub message: String,
    #[serde(default)]
    pub details: ErrorDetails,
}

impl SdkError {
    pub fn new(
        machine_code: impl Into<String>,
        category: ErrorCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            machine_code: machine_code.into(),
            category,
            retryable: false,
            is_user_actionable: false,
            message: message.into(),
            details: ErrorDetails::new(),
        }
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn with_user_actionable(mut self, is_user_actionable: bool) -> Self {
        self.is_user_actionable = is_user_actionable;
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    pub fn code(&self) -> &str {
        self.machine_code.as_str()
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    pub fn is_user_actionable(&self) -> bool {
        self.is_user_actionable
    }

    pub fn not_configured() -> Self {
        Self::new(
            code::NOT_CONFIGURED,
            ErrorCategory::Session,
            "configure must be called with a project id before building widget urls",
        )
        .with_user_actionable(true)
    }

    pub fn metadata_pending() -> Self {
        Self::new(
            code::METADATA_PENDING,
            ErrorCategory::Session,
            "widget base url has not been resolved yet",
        )
        .with_retryable(true)
    }

    pub fn metadata_fetch_failed(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self::new(code::METADATA_FETCH_FAILED, category, message)
    }

    pub fn invalid_argument(field: &'static str, message: impl Into<String>) -> Self {
        Self::new(code::VALIDATION_INVALID_ARGUMENT, ErrorCategory::Validation, message)
            .with_user_actionable(true)
            .with_detail("field", JsonValue::String(field.to_owned()))
    }

    pub fn invalid_url(candidate: &str, reason: impl Into<String>) -> Self {
        Self::new(code::INVALID_URL, ErrorCategory::Validation, reason)
            .with_detail("url", JsonValue::String(candidate.to_owned()))
    }

    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(code::CONFIG_INVALID, ErrorCategory::Config, message).with_user_actionable(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_machine_code_and_message() {
        let err = SdkError::not_configured();
        let rendered = err.to_string();
        assert!(rendered.starts_with("SDK_NOT_CONFIGURED: "));
        assert!(err.is_user_actionable());
        assert!(!err.is_retryable());
    }

    #[test]
    fn pending_metadata_is_retryable() {
        let err = SdkError::metadata_pending();
        assert_eq!(err.code(), code::METADATA_PENDING);
        assert!(err.is_retryable());
    }

    #[test]
    fn invalid_argument_records_field_detail() {
        let err = SdkError::invalid_argument("project_id", "project id must not be empty");
        assert_eq!(err.details.get("field"), Some(&JsonValue::String("project_id".to_owned())));
        assert_eq!(err.category, ErrorCategory::Validation);
    }
}
