use crate::error::SdkError;
use crate::token::CLIENT_TOKEN_PARAM;
use crate::types::Section;

/// Joins base url, section path and optional token into an absolute url.
///
/// The returned string is the concatenation itself; it is only parsed to
/// check that it is an absolute url, never normalized.
pub fn build_section_url(
    public_base_url: &str,
    section: &Section,
    client_token: Option<&str>,
) -> Result<String, SdkError> {
    let mut candidate = format!("{public_base_url}{}", section.path());
    if let Some(token) = client_token.filter(|token| !token.is_empty()) {
        let separator = if candidate.contains('?') { '&' } else { '?' };
        candidate.push(separator);
        candidate.push_str(CLIENT_TOKEN_PARAM);
        candidate.push('=');
        candidate.push_str(token);
    }

    let parsed = url::Url::parse(&candidate)
        .map_err(|err| SdkError::invalid_url(&candidate, format!("not a valid url: {err}")))?;
    if parsed.cannot_be_a_base() || !parsed.has_host() {
        return Err(SdkError::invalid_url(&candidate, "url has no host"));
    }
    Ok(candidate)
}
