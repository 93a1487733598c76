mod config;
mod metadata;
mod section;
mod user;

pub use config::{
    SdkConfig, DEFAULT_API_BASE_URL, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_READ_TIMEOUT_MS,
};
pub use metadata::{RemoteMetadata, SessionPhase};
pub use section::{DisplayMode, Section};
pub use user::IdentifiedUser;
