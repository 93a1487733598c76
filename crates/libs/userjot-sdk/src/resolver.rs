use crate::error::{code, ErrorCategory, SdkError};
use crate::session::{self, SharedSession};
use crate::types::{RemoteMetadata, SdkConfig};
use serde::Deserialize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Where the widget's public base url comes from.
pub trait MetadataSource: Send + Sync + 'static {
    fn fetch(&self, project_id: &str) -> Result<RemoteMetadata, SdkError>;
}

#[derive(Debug, Deserialize)]
struct HelloResponse {
    metadata: HelloMetadata,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HelloMetadata {
    public_base_url: String,
}

/// Fetches metadata from the widget's `hello` endpoint.
#[derive(Debug)]
pub struct HttpMetadataSource {
    config: SdkConfig,
    agent: ureq::Agent,
}

impl HttpMetadataSource {
    pub fn new(config: SdkConfig) -> Result<Self, SdkError> {
        config.validate()?;
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(config.connect_timeout())
            .timeout_read(config.read_timeout())
            .user_agent(&config.user_agent)
            .build();
        Ok(Self { config, agent })
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }
}

impl MetadataSource for HttpMetadataSource {
    fn fetch(&self, project_id: &str) -> Result<RemoteMetadata, SdkError> {
        let endpoint = self.config.hello_endpoint(project_id)?;
        let response = self
            .agent
            .get(&endpoint)
            .set("Accept", "application/json")
            .call()
            .map_err(|err| map_http_error(&endpoint, err))?;

        if response.status() != 200 {
            return Err(SdkError::metadata_fetch_failed(
                ErrorCategory::Transport,
                format!("unexpected http status {} from {endpoint}", response.status()),
            )
            .with_detail("status", serde_json::Value::from(response.status())));
        }

        let body = response.into_string().map_err(|err| {
            SdkError::metadata_fetch_failed(
                ErrorCategory::Transport,
                format!("failed to read metadata response: {err}"),
            )
        })?;
        parse_hello_body(&body)
    }
}

pub(crate) fn parse_hello_body(body: &str) -> Result<RemoteMetadata, SdkError> {
    let hello: HelloResponse = serde_json::from_str(body).map_err(|err| {
        SdkError::metadata_fetch_failed(
            ErrorCategory::Validation,
            format!("malformed metadata response: {err}"),
        )
    })?;
    let public_base_url = hello.metadata.public_base_url;
    if public_base_url.trim().is_empty() {
        return Err(SdkError::metadata_fetch_failed(
            ErrorCategory::Validation,
            "metadata response has an empty publicBaseUrl",
        ));
    }
    Ok(RemoteMetadata { public_base_url })
}

fn map_http_error(endpoint: &str, err: ureq::Error) -> SdkError {
    match err {
        ureq::Error::Status(status, _) => SdkError::metadata_fetch_failed(
            ErrorCategory::Transport,
            format!("http status {status} from {endpoint}"),
        )
        .with_detail("status", serde_json::Value::from(status)),
        ureq::Error::Transport(transport) => SdkError::metadata_fetch_failed(
            ErrorCategory::Transport,
            format!("metadata request to {endpoint} failed: {transport}"),
        )
        .with_retryable(true),
    }
}

/// Completion handle for one background resolution. Dropping it detaches
/// the worker; the outcome is still applied to the session.
#[derive(Debug)]
pub struct ResolveHandle {
    inner: HandleInner,
}

#[derive(Debug)]
enum HandleInner {
    Spawned(JoinHandle<Result<RemoteMetadata, SdkError>>),
    Ready(Result<RemoteMetadata, SdkError>),
}

impl ResolveHandle {
    pub(crate) fn ready(outcome: Result<RemoteMetadata, SdkError>) -> Self {
        Self { inner: HandleInner::Ready(outcome) }
    }

    pub fn is_finished(&self) -> bool {
        match &self.inner {
            HandleInner::Spawned(handle) => handle.is_finished(),
            HandleInner::Ready(_) => true,
        }
    }

    /// Blocks until the fetch completes and returns its outcome.
    pub fn wait(self) -> Result<RemoteMetadata, SdkError> {
        match self.inner {
            HandleInner::Ready(outcome) => outcome,
            HandleInner::Spawned(handle) => handle.join().unwrap_or_else(|_| {
                Err(SdkError::new(
                    code::INTERNAL,
                    ErrorCategory::Internal,
                    "metadata resolver thread panicked",
                ))
            }),
        }
    }
}

/// Runs one fetch on a background thread and applies the outcome to the
/// session if `generation` is still current when it completes.
pub(crate) fn spawn_resolution<S: MetadataSource>(
    session: SharedSession,
    source: Arc<S>,
    project_id: String,
    generation: u64,
) -> ResolveHandle {
    let worker_session = session.clone();
    let worker_project = project_id.clone();
    let spawned = thread::Builder::new().name("userjot-metadata".to_owned()).spawn(move || {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| source.fetch(&worker_project)))
            .unwrap_or_else(|payload| Err(source_panicked(payload.as_ref())));
        record_outcome(&worker_session, &worker_project, generation, &outcome);
        outcome
    });

    match spawned {
        Ok(handle) => ResolveHandle { inner: HandleInner::Spawned(handle) },
        Err(err) => {
            let outcome = Err(SdkError::new(
                code::INTERNAL,
                ErrorCategory::Internal,
                format!("failed to spawn metadata resolver: {err}"),
            ));
            record_outcome(&session, &project_id, generation, &outcome);
            ResolveHandle::ready(outcome)
        }
    }
}

fn source_panicked(payload: &(dyn std::any::Any + Send)) -> SdkError {
    let reason = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic");
    SdkError::new(
        code::INTERNAL,
        ErrorCategory::Internal,
        format!("metadata source panicked: {reason}"),
    )
}

fn record_outcome(
    session: &SharedSession,
    project_id: &str,
    generation: u64,
    outcome: &Result<RemoteMetadata, SdkError>,
) {
    let applied = session::lock(session).apply_resolution(generation, outcome);
    if !applied {
        log::debug!(
            "userjot: dropping stale metadata for project {project_id} (generation {generation})"
        );
        return;
    }
    match outcome {
        Ok(metadata) => {
            log::info!(
                "userjot: resolved widget base url {} for project {project_id}",
                metadata.public_base_url
            );
        }
        Err(err) => {
            log::warn!("userjot: metadata resolution for project {project_id} failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;
    use crate::types::SessionPhase;
    use std::sync::{mpsc, Mutex};

    struct FixedSource(Result<RemoteMetadata, SdkError>);

    impl MetadataSource for FixedSource {
        fn fetch(&self, _project_id: &str) -> Result<RemoteMetadata, SdkError> {
            self.0.clone()
        }
    }

    /// Blocks each fetch until the test releases it with a base url.
    struct GatedSource {
        release: Mutex<mpsc::Receiver<String>>,
    }

    impl MetadataSource for GatedSource {
        fn fetch(&self, _project_id: &str) -> Result<RemoteMetadata, SdkError> {
            let release = self.release.lock().expect("release mutex poisoned");
            let base = release.recv().map_err(|err| {
                SdkError::new(code::INTERNAL, ErrorCategory::Internal, err.to_string())
            })?;
            Ok(RemoteMetadata::new(base))
        }
    }

    struct PanickingSource;

    impl MetadataSource for PanickingSource {
        fn fetch(&self, _project_id: &str) -> Result<RemoteMetadata, SdkError> {
            panic!("source exploded");
        }
    }

    fn shared_configured(project_id: &str) -> (SharedSession, u64) {
        let session: SharedSession = Arc::new(Mutex::new(SessionState::default()));
        let generation = session::lock(&session).configure(project_id).expect("configure");
        (session, generation)
    }

    #[test]
    fn parses_well_formed_hello_body() {
        let metadata =
            parse_hello_body(r#"{"metadata":{"publicBaseUrl":"https://acme.userjot.com","x":1}}"#)
                .expect("valid body");
        assert_eq!(metadata.public_base_url, "https://acme.userjot.com");
    }

    #[test]
    fn rejects_malformed_hello_bodies() {
        for body in [
            "",
            "not json",
            "{}",
            r#"{"metadata":{}}"#,
            r#"{"metadata":{"publicBaseUrl":42}}"#,
            r#"{"metadata":{"publicBaseUrl":"  "}}"#,
        ] {
            let err = parse_hello_body(body).expect_err("malformed body must fail");
            assert_eq!(err.machine_code, code::METADATA_FETCH_FAILED, "body: {body}");
            assert_eq!(err.category, ErrorCategory::Validation, "body: {body}");
        }
    }

    #[test]
    fn successful_fetch_populates_session() {
        let (session, generation) = shared_configured("p1");
        let source = Arc::new(FixedSource(Ok(RemoteMetadata::new("https://base.example"))));
        let handle = spawn_resolution(session.clone(), source, "p1".to_owned(), generation);

        let metadata = handle.wait().expect("fetch succeeds");
        assert_eq!(metadata.public_base_url, "https://base.example");
        let state = session::lock(&session);
        assert_eq!(state.phase(), SessionPhase::Ready);
        assert_eq!(state.metadata(), Some(&metadata));
    }

    #[test]
    fn failed_fetch_leaves_metadata_absent() {
        let (session, generation) = shared_configured("p1");
        let source = Arc::new(FixedSource(Err(SdkError::metadata_fetch_failed(
            ErrorCategory::Transport,
            "offline",
        ))));
        let err = spawn_resolution(session.clone(), source, "p1".to_owned(), generation)
            .wait()
            .expect_err("fetch fails");
        assert_eq!(err.machine_code, code::METADATA_FETCH_FAILED);
        let state = session::lock(&session);
        assert_eq!(state.phase(), SessionPhase::Failed);
        assert!(state.metadata().is_none());
    }

    #[test]
    fn superseded_fetch_does_not_overwrite_newer_configure() {
        let (session, stale_generation) = shared_configured("p1");
        let (release, gate) = mpsc::channel();
        let source = Arc::new(GatedSource { release: Mutex::new(gate) });

        let stale =
            spawn_resolution(session.clone(), source.clone(), "p1".to_owned(), stale_generation);
        let generation = session::lock(&session).configure("p2").expect("reconfigure");
        let current = spawn_resolution(session.clone(), source, "p2".to_owned(), generation);

        release.send("https://first.example".to_owned()).expect("release first");
        release.send("https://second.example".to_owned()).expect("release second");
        let stale_outcome = stale.wait().expect("stale fetch still completes");
        let current_outcome = current.wait().expect("current fetch completes");

        // Whichever worker received which base url, only the current
        // generation's result may land in the session.
        let state = session::lock(&session);
        assert_eq!(state.project_id(), Some("p2"));
        assert_eq!(state.metadata(), Some(&current_outcome));
        assert_ne!(state.metadata(), Some(&stale_outcome));
    }

    #[test]
    fn panicking_source_fails_the_session() {
        let (session, generation) = shared_configured("p1");
        let source = Arc::new(PanickingSource);
        let err = spawn_resolution(session.clone(), source, "p1".to_owned(), generation)
            .wait()
            .expect_err("panic maps to error");
        assert_eq!(err.machine_code, code::INTERNAL);
        assert!(err.message.contains("source exploded"), "message: {}", err.message);
        let state = session::lock(&session);
        assert_eq!(state.phase(), SessionPhase::Failed);
        assert!(state.metadata().is_none());
    }

    #[test]
    fn ready_handle_is_finished() {
        let handle = ResolveHandle::ready(Ok(RemoteMetadata::new("https://base.example")));
        assert!(handle.is_finished());
        assert!(handle.wait().is_ok());
    }
}
