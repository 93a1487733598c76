use crate::error::SdkError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://widget.userjot.com";
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 10_000;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
#[non_exhaustive]
pub struct SdkConfig {
    /// Origin the metadata endpoint is templated under.
    pub api_base_url: String,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub user_agent: String,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            user_agent: concat!("userjot-sdk/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl SdkConfig {
    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout_ms = u64::try_from(connect.as_millis()).unwrap_or(u64::MAX);
        self.read_timeout_ms = u64::try_from(read.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// The metadata endpoint for `project_id`. The id is percent-encoded as a
    /// single path segment, so `/`, `?` and `#` cannot escape it.
    pub fn hello_endpoint(&self, project_id: &str) -> Result<String, SdkError> {
        let mut endpoint = self.parsed_base()?;
        endpoint
            .path_segments_mut()
            .map_err(|()| {
                SdkError::invalid_argument("api_base_url", "api_base_url cannot carry a path")
            })?
            .pop_if_empty()
            .extend(["widget", "mobile", "v1", project_id, "hello"]);
        Ok(endpoint.into())
    }

    fn parsed_base(&self) -> Result<url::Url, SdkError> {
        let base = self.api_base_url.trim();
        if base.is_empty() {
            return Err(SdkError::invalid_argument(
                "api_base_url",
                "api_base_url must not be empty",
            ));
        }
        url::Url::parse(base).map_err(|err| {
            SdkError::invalid_argument("api_base_url", format!("api_base_url is not a url: {err}"))
        })
    }

    pub fn validate(&self) -> Result<(), SdkError> {
        let parsed = self.parsed_base()?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SdkError::invalid_argument(
                "api_base_url",
                format!("api_base_url scheme '{}' is not http or https", parsed.scheme()),
            ));
        }
        if self.connect_timeout_ms == 0 {
            return Err(SdkError::invalid_argument(
                "connect_timeout_ms",
                "connect_timeout_ms must be greater than zero",
            ));
        }
        if self.read_timeout_ms == 0 {
            return Err(SdkError::invalid_argument(
                "read_timeout_ms",
                "read_timeout_ms must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Parses a TOML document; missing keys fall back to the defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, SdkError> {
        let config: Self = toml::from_str(raw)
            .map_err(|err| SdkError::config_invalid(format!("failed to parse sdk config: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SdkError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            SdkError::config_invalid(format!("failed to read {}: {err}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }
}
