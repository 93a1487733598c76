use crate::error::SdkError;
use crate::types::{IdentifiedUser, RemoteMetadata, SessionPhase};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Mutable state shared between the client and its resolver threads.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SessionState {
    project_id: Option<String>,
    user: Option<IdentifiedUser>,
    metadata: Option<RemoteMetadata>,
    phase: SessionPhase,
    generation: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            project_id: None,
            user: None,
            metadata: None,
            phase: SessionPhase::Unconfigured,
            generation: 0,
        }
    }
}

impl SessionState {
    pub(crate) fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub(crate) fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub(crate) fn user(&self) -> Option<&IdentifiedUser> {
        self.user.as_ref()
    }

    pub(crate) fn metadata(&self) -> Option<&RemoteMetadata> {
        self.metadata.as_ref()
    }

    /// Stores the project id, drops resolved metadata and returns the
    /// generation the next resolution must report back with.
    pub(crate) fn configure(&mut self, project_id: &str) -> Result<u64, SdkError> {
        if project_id.trim().is_empty() {
            return Err(SdkError::invalid_argument("project_id", "project id must not be empty"));
        }
        self.project_id = Some(project_id.to_owned());
        self.metadata = None;
        self.phase = SessionPhase::Resolving;
        self.generation += 1;
        Ok(self.generation)
    }

    pub(crate) fn identify(&mut self, user: IdentifiedUser) -> Result<(), SdkError> {
        user.validate()?;
        self.user = Some(user);
        Ok(())
    }

    pub(crate) fn logout(&mut self) {
        self.user = None;
    }

    /// Applies a resolver outcome. Returns `false` when `generation` belongs
    /// to a superseded `configure` and the outcome was dropped.
    pub(crate) fn apply_resolution(
        &mut self,
        generation: u64,
        outcome: &Result<RemoteMetadata, SdkError>,
    ) -> bool {
        if generation != self.generation {
            return false;
        }
        match outcome {
            Ok(metadata) => {
                self.metadata = Some(metadata.clone());
                self.phase = SessionPhase::Ready;
            }
            Err(_) => {
                self.metadata = None;
                self.phase = SessionPhase::Failed;
            }
        }
        true
    }
}

pub(crate) type SharedSession = Arc<Mutex<SessionState>>;

/// Locks the session, recovering the guard if another thread panicked while
/// holding it. No `SessionState` method can panic mid-update.
pub(crate) fn lock(session: &SharedSession) -> MutexGuard<'_, SessionState> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}
