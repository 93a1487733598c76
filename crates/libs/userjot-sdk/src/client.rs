use crate::builder::build_section_url;
use crate::error::{code, SdkError};
use crate::presenter::Presenter;
use crate::resolver::{spawn_resolution, HttpMetadataSource, MetadataSource, ResolveHandle};
use crate::session::{self, SessionState, SharedSession};
use crate::token::encode_client_token;
use crate::types::{DisplayMode, IdentifiedUser, SdkConfig, Section, SessionPhase};
use std::sync::{Arc, Mutex};

/// One widget session: the configured project, the identified user and the
/// resolved base url.
///
/// Every operation is safe to call from any thread. Url producers return
/// `None` instead of failing; the reason is logged and available through
/// [`Client::try_build_url`].
#[derive(Debug)]
pub struct Client<S: MetadataSource = HttpMetadataSource> {
    source: Arc<S>,
    session: SharedSession,
}

impl Client<HttpMetadataSource> {
    pub fn new(config: SdkConfig) -> Result<Self, SdkError> {
        Ok(Self::with_source(HttpMetadataSource::new(config)?))
    }
}

impl<S: MetadataSource> Client<S> {
    pub fn with_source(source: S) -> Self {
        Self { source: Arc::new(source), session: Arc::new(Mutex::new(SessionState::default())) }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Stores `project_id`, forgets any resolved base url and starts
    /// resolving it in the background.
    ///
    /// A fetch started by an earlier `configure` is not cancelled, but its
    /// result is discarded once this call has run.
    pub fn configure(&self, project_id: impl Into<String>) -> ResolveHandle {
        let project_id = project_id.into();
        let generation = match session::lock(&self.session).configure(&project_id) {
            Ok(generation) => generation,
            Err(err) => {
                log::warn!("userjot: ignoring configure: {err}");
                return ResolveHandle::ready(Err(err));
            }
        };
        log::debug!("userjot: configured project {project_id} (generation {generation})");
        spawn_resolution(self.session.clone(), self.source.clone(), project_id, generation)
    }

    /// Replaces the identified user. A blank id is logged and ignored.
    pub fn identify(&self, user: IdentifiedUser) {
        if let Err(err) = session::lock(&self.session).identify(user) {
            log::warn!("userjot: ignoring identify: {err}");
        }
    }

    pub fn logout(&self) {
        session::lock(&self.session).logout();
    }

    pub fn phase(&self) -> SessionPhase {
        session::lock(&self.session).phase()
    }

    pub fn project_id(&self) -> Option<String> {
        session::lock(&self.session).project_id().map(str::to_owned)
    }

    pub fn public_base_url(&self) -> Option<String> {
        session::lock(&self.session).metadata().map(|metadata| metadata.public_base_url.clone())
    }

    pub fn identified_user(&self) -> Option<IdentifiedUser> {
        session::lock(&self.session).user().cloned()
    }

    /// The `clientToken` value urls would carry right now, if any.
    pub fn client_token(&self) -> Option<String> {
        let state = session::lock(&self.session);
        let project_id = state.project_id()?;
        token_for_url(encode_client_token(project_id, state.user()))
    }

    pub fn try_build_url(&self, section: &Section) -> Result<String, SdkError> {
        let (base, token) = {
            let state = session::lock(&self.session);
            let project_id = state.project_id().ok_or_else(SdkError::not_configured)?;
            // A failed fetch is not retried until the next `configure`.
            let base = state.metadata().ok_or_else(|| {
                SdkError::metadata_pending().with_retryable(state.phase() != SessionPhase::Failed)
            })?;
            let token = token_for_url(encode_client_token(project_id, state.user()));
            (base.public_base_url.clone(), token)
        };
        build_section_url(&base, section, token.as_deref())
    }

    pub fn build_url(&self, section: &Section) -> Option<String> {
        match self.try_build_url(section) {
            Ok(url) => Some(url),
            Err(err) => {
                match err.code() {
                    code::NOT_CONFIGURED => {
                        log::warn!("userjot: cannot build {section} url: {err}");
                    }
                    code::METADATA_PENDING => {
                        log::info!("userjot: {section} url unavailable until metadata resolves");
                    }
                    _ => log::warn!("userjot: failed to build {section} url: {err}"),
                }
                None
            }
        }
    }

    pub fn build_feedback_url(&self, board: Option<&str>) -> Option<String> {
        self.build_url(&Section::Feedback { board: board.map(str::to_owned) })
    }

    pub fn build_roadmap_url(&self) -> Option<String> {
        self.build_url(&Section::Roadmap)
    }

    pub fn build_changelog_url(&self) -> Option<String> {
        self.build_url(&Section::Changelog)
    }

    /// Builds the url for `section` and hands it to `presenter`. Returns
    /// whether a url was handed off.
    pub fn present<P: Presenter + ?Sized>(
        &self,
        presenter: &P,
        section: &Section,
        mode: DisplayMode,
    ) -> bool {
        let Some(url) = self.build_url(section) else {
            return false;
        };
        presenter.present(&url, mode);
        true
    }
}

/// Maps an encoder result to the token a url carries. An encoding failure
/// drops the token so the url is still built, just without identity.
fn token_for_url(encoded: Result<Option<String>, SdkError>) -> Option<String> {
    match encoded {
        Ok(token) => token,
        Err(err) => {
            log::error!("userjot: omitting client token: {err}");
            None
        }
    }
}
