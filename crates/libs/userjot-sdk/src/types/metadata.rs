use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMetadata {
    pub public_base_url: String,
}

impl RemoteMetadata {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self { public_base_url: public_base_url.into() }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Unconfigured,
    Resolving,
    Ready,
    Failed,
}

impl SessionPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unconfigured => "unconfigured",
            Self::Resolving => "resolving",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}
