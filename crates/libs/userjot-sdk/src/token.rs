//! `clientToken` encoding.
//!
//! The token is the identity claims as JSON, base64 encoded with the standard
//! alphabet and padding. It is not a signature: the optional `signature`
//! field is generated by the host's backend and verified by the widget
//! service, so it is carried through without inspection.

use crate::error::{code, ErrorCategory, SdkError};
use crate::types::IdentifiedUser;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

pub const CLIENT_TOKEN_PARAM: &str = "clientToken";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPayload {
    /// Project id.
    pub id: String,
    pub user: IdentifiedUser,
}

impl TokenPayload {
    pub fn new(project_id: impl Into<String>, user: IdentifiedUser) -> Self {
        Self { id: project_id.into(), user }
    }

    pub fn encode(&self) -> Result<String, SdkError> {
        let json = serde_json::to_vec(self).map_err(|err| {
            SdkError::new(code::TOKEN_ENCODING_FAILED, ErrorCategory::Encoding, err.to_string())
        })?;
        Ok(STANDARD.encode(json))
    }
}

/// Returns `Ok(None)` when nobody is identified.
pub fn encode_client_token(
    project_id: &str,
    user: Option<&IdentifiedUser>,
) -> Result<Option<String>, SdkError> {
    let Some(user) = user else {
        return Ok(None);
    };
    TokenPayload::new(project_id, user.clone()).encode().map(Some)
}

pub fn decode_client_token(token: &str) -> Result<TokenPayload, SdkError> {
    let bytes = STANDARD.decode(token.trim()).map_err(|err| {
        SdkError::new(
            code::TOKEN_ENCODING_FAILED,
            ErrorCategory::Encoding,
            format!("client token is not valid base64: {err}"),
        )
    })?;
    serde_json::from_slice(&bytes).map_err(|err| {
        SdkError::new(
            code::TOKEN_ENCODING_FAILED,
            ErrorCategory::Encoding,
            format!("client token is not a valid payload: {err}"),
        )
    })
}
