//! Session drivers: run the state machines against a backend.
//!
//! Both sessions share one [`ClientState`]. Network calls run as spawned tasks
//! that can be cancelled; outcomes are fed back through the machines' ticket
//! checks, so a task that loses a race never touches the displayed state.

use async_trait::async_trait;
use kanji_core::models::{DictionaryEntry, UploadResponse};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::SelectedFile;
use crate::banner::Banner;
use crate::lookup_flow::LookupFlow;
use crate::upload_flow::{SelectRejected, UploadFlow, UploadPhase};
use crate::{ApiClient, ClientError};

/// The remote operations the sessions need.
#[async_trait]
pub trait KanjiBackend: Send + Sync + 'static {
    async fn upload(&self, file: SelectedFile) -> Result<UploadResponse, ClientError>;

    /// `Ok(None)` when the dictionary has no entry for `character`.
    async fn lookup(&self, character: String) -> Result<Option<DictionaryEntry>, ClientError>;
}

#[async_trait]
impl KanjiBackend for ApiClient {
    async fn upload(&self, file: SelectedFile) -> Result<UploadResponse, ClientError> {
        ApiClient::upload(self, &file).await
    }

    async fn lookup(&self, character: String) -> Result<Option<DictionaryEntry>, ClientError> {
        match ApiClient::lookup(self, &character).await {
            Ok(response) => Ok(Some(response.data)),
            Err(err) if err.is_missing_entry() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Character lookup is only available while OCR results are displayed")]
pub struct LookupUnavailable;

/// What the user sees: the upload machine and the lookup machine.
#[derive(Debug, Default, Clone)]
pub struct ClientState {
    pub upload: UploadFlow,
    pub lookup: LookupFlow,
}

impl ClientState {
    /// The most recently raised banner that is still visible at `now`
    pub fn banner(&self, now: Instant) -> Option<&str> {
        [self.upload.raised_banner(), self.lookup.raised_banner()]
            .into_iter()
            .flatten()
            .filter(|banner| banner.is_visible(now))
            .max_by_key(|banner| banner.raised_at())
            .map(Banner::message)
    }
}

#[derive(Debug, Default)]
struct Shared {
    state: ClientState,
    upload_task: Option<CancellationToken>,
    lookup_task: Option<CancellationToken>,
}

impl Shared {
    fn reset_lookup(&mut self) {
        self.state.lookup.clear();
        if let Some(token) = self.lookup_task.take() {
            token.cancel();
        }
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Drives the upload machine.
#[derive(Clone)]
pub struct UploadSession {
    backend: Arc<dyn KanjiBackend>,
    shared: Arc<Mutex<Shared>>,
}

impl UploadSession {
    pub fn new(backend: Arc<dyn KanjiBackend>) -> Self {
        Self {
            backend,
            shared: Arc::new(Mutex::new(Shared::default())),
        }
    }

    /// A lookup session over the same state
    pub fn lookup_session(&self) -> LookupSession {
        LookupSession {
            backend: self.backend.clone(),
            shared: self.shared.clone(),
        }
    }

    /// Read the current state.
    pub fn with_state<R>(&self, f: impl FnOnce(&ClientState) -> R) -> R {
        f(&lock(&self.shared).state)
    }

    pub fn select(&self, file: SelectedFile) -> Result<UploadPhase, SelectRejected> {
        let mut shared = lock(&self.shared);
        let phase = shared.state.upload.select(file, Instant::now())?;
        shared.reset_lookup();
        Ok(phase)
    }

    /// Start the upload. `None` when the trigger is disabled.
    ///
    /// The returned handle finishes once the outcome has been applied or the
    /// upload was cancelled by [`UploadSession::clear`].
    pub fn process(&self) -> Option<JoinHandle<()>> {
        let mut shared = lock(&self.shared);
        let (ticket, file) = shared.state.upload.process()?;
        shared.reset_lookup();

        let token = CancellationToken::new();
        shared.upload_task = Some(token.clone());
        drop(shared);

        let backend = self.backend.clone();
        let shared = self.shared.clone();
        Some(tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!(%ticket, "Upload cancelled");
                    return;
                }
                outcome = backend.upload(file) => outcome,
            };

            let mut shared = lock(&shared);
            if shared.state.upload.complete(ticket, outcome, Instant::now()) {
                shared.upload_task = None;
            }
        }))
    }

    /// Back to `Idle`, cancelling any upload or lookup in flight.
    pub fn clear(&self) {
        let mut shared = lock(&self.shared);
        shared.state.upload.clear();
        if let Some(token) = shared.upload_task.take() {
            token.cancel();
        }
        shared.reset_lookup();
    }

    pub fn dismiss_banner(&self) {
        let mut shared = lock(&self.shared);
        shared.state.upload.dismiss_banner();
        shared.state.lookup.dismiss_banner();
    }
}

/// Drives the lookup machine. Obtained from [`UploadSession::lookup_session`].
#[derive(Clone)]
pub struct LookupSession {
    backend: Arc<dyn KanjiBackend>,
    shared: Arc<Mutex<Shared>>,
}

impl LookupSession {
    pub fn with_state<R>(&self, f: impl FnOnce(&ClientState) -> R) -> R {
        f(&lock(&self.shared).state)
    }

    /// Look up `character`, cancelling the lookup it supersedes.
    pub fn lookup(&self, character: &str) -> Result<JoinHandle<()>, LookupUnavailable> {
        let mut shared = lock(&self.shared);
        if shared.state.upload.phase() != UploadPhase::ResultsDisplayed {
            return Err(LookupUnavailable);
        }

        let (ticket, _superseded) = shared.state.lookup.trigger(character);
        if let Some(previous) = shared.lookup_task.take() {
            previous.cancel();
        }
        let token = CancellationToken::new();
        shared.lookup_task = Some(token.clone());
        drop(shared);

        let backend = self.backend.clone();
        let shared = self.shared.clone();
        let character = character.to_string();
        Ok(tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!(%ticket, "Lookup cancelled");
                    return;
                }
                outcome = backend.lookup(character) => outcome,
            };

            let mut shared = lock(&shared);
            if shared.state.lookup.complete(ticket, outcome, Instant::now()) {
                shared.lookup_task = None;
            }
        }))
    }

    pub fn clear(&self) {
        lock(&self.shared).reset_lookup();
    }
}
