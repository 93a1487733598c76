//! Client core for embedding the UserJot feedback, roadmap and changelog
//! widget.
//!
//! A [`Client`] holds the configured project, resolves the widget's public
//! base url in the background and builds section urls, optionally carrying a
//! `clientToken` for the identified user. Showing the url is left to a
//! host-provided [`Presenter`].
//!
//! Diagnostics go through the `log` facade; install any logger to see them.

mod builder;
mod client;
mod error;
mod presenter;
mod resolver;
mod session;
pub mod token;
pub mod types;

pub use builder::build_section_url;
pub use client::Client;
pub use error::{code as error_code, ErrorCategory, ErrorDetails, SdkError};
pub use presenter::Presenter;
pub use resolver::{HttpMetadataSource, MetadataSource, ResolveHandle};
pub use token::{decode_client_token, encode_client_token, TokenPayload, CLIENT_TOKEN_PARAM};
pub use types::{
    DisplayMode, IdentifiedUser, RemoteMetadata, SdkConfig, Section, SessionPhase,
    DEFAULT_API_BASE_URL,
};
