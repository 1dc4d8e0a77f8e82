//! Upload/Process state machine
//!
//! ```text
//! Idle -> FileSelected -> Previewing -> Processing -> ResultsDisplayed
//!                              ^             |
//!                              |             v
//!                              +--------- Error
//! ```
//!
//! The machine is a plain value: the owner feeds it user actions and request
//! outcomes and renders whatever state it ends up in. Network calls are made by
//! the owner using the ticket returned from [`UploadFlow::process`].

use kanji_core::models::UploadResponse;
use std::time::Instant;
use thiserror::Error;

use crate::api::SelectedFile;
use crate::banner::{self, Banner};
use crate::ticket::{Ticket, TicketIssuer};
use crate::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    /// A file passed the client-side check; its preview is being prepared.
    FileSelected,
    Previewing,
    Processing,
    ResultsDisplayed,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectRejected {
    #[error("'{name}' is not an image. Please choose a PNG, JPEG, GIF or WebP file.")]
    NotAnImage { name: String },

    #[error("An upload is already in progress")]
    Busy,
}

#[derive(Debug, Clone)]
pub struct UploadFlow {
    phase: UploadPhase,
    file: Option<SelectedFile>,
    results: Option<UploadResponse>,
    error: Option<String>,
    banner: Option<Banner>,
    in_flight: Option<Ticket>,
    tickets: TicketIssuer,
}

impl Default for UploadFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadFlow {
    pub fn new() -> Self {
        Self {
            phase: UploadPhase::Idle,
            file: None,
            results: None,
            error: None,
            banner: None,
            in_flight: None,
            tickets: TicketIssuer::default(),
        }
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn results(&self) -> Option<&UploadResponse> {
        self.results.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn in_flight(&self) -> Option<Ticket> {
        self.in_flight
    }

    /// Banner text if one is raised and has not expired at `now`
    pub fn banner(&self, now: Instant) -> Option<&str> {
        banner::visible(&self.banner, now)
    }

    pub(crate) fn raised_banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    /// Whether the process trigger should be enabled
    pub fn trigger_enabled(&self) -> bool {
        self.in_flight.is_none()
            && self.file.is_some()
            && matches!(self.phase, UploadPhase::Previewing | UploadPhase::Error)
    }

    /// User picked a file.
    ///
    /// Image files move the machine to `Previewing`, replacing any pending file
    /// and discarding earlier results. Anything else leaves the state untouched
    /// and raises a banner.
    pub fn select(&mut self, file: SelectedFile, now: Instant) -> Result<UploadPhase, SelectRejected> {
        if self.phase == UploadPhase::Processing {
            return Err(SelectRejected::Busy);
        }

        if !file.looks_like_image() {
            let rejected = SelectRejected::NotAnImage { name: file.name };
            tracing::debug!(error = %rejected, phase = ?self.phase, "File rejected by client check");
            self.banner = Some(Banner::new(rejected.to_string(), now));
            return Err(rejected);
        }

        self.banner = None;
        self.phase = UploadPhase::FileSelected;
        tracing::debug!(file = %file.name, size = file.data.len(), "File selected");

        self.file = Some(file);
        self.results = None;
        self.error = None;
        self.phase = UploadPhase::Previewing;
        Ok(self.phase)
    }

    /// User asked to process the selected file.
    ///
    /// Returns the ticket and file to upload, or `None` when the trigger is
    /// disabled (nothing selected, or an upload already in flight).
    pub fn process(&mut self) -> Option<(Ticket, SelectedFile)> {
        if !self.trigger_enabled() {
            tracing::debug!(phase = ?self.phase, "Process ignored");
            return None;
        }
        let file = self.file.clone()?;

        let ticket = self.tickets.issue();
        self.banner = None;
        self.error = None;
        self.in_flight = Some(ticket);
        self.phase = UploadPhase::Processing;
        tracing::debug!(%ticket, file = %file.name, "Upload started");
        Some((ticket, file))
    }

    /// Apply the outcome of the upload issued with `ticket`.
    ///
    /// Returns `false` and changes nothing when `ticket` is not the upload the
    /// machine is waiting for.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        outcome: Result<UploadResponse, ClientError>,
        now: Instant,
    ) -> bool {
        if self.in_flight != Some(ticket) {
            tracing::debug!(%ticket, waiting_for = ?self.in_flight, "Ignoring stale upload outcome");
            return false;
        }
        self.in_flight = None;

        match outcome {
            Ok(response) => {
                tracing::debug!(
                    %ticket,
                    characters = response.ocr_results.characters.len(),
                    "Upload succeeded"
                );
                self.results = Some(response);
                self.phase = UploadPhase::ResultsDisplayed;
            }
            Err(err) => {
                tracing::debug!(%ticket, error = %err, "Upload failed");
                let message = err.to_string();
                self.banner = Some(Banner::new(message.clone(), now));
                self.error = Some(message);
                self.phase = UploadPhase::Error;
            }
        }
        true
    }

    /// Back to `Idle` from any state. Returns the upload that was in flight, if any.
    pub fn clear(&mut self) -> Option<Ticket> {
        let cancelled = self.in_flight.take();
        self.phase = UploadPhase::Idle;
        self.file = None;
        self.results = None;
        self.error = None;
        self.banner = None;
        cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanji_core::models::{OcrCharacterResult, OcrResult};
    use std::time::Duration;

    fn png(name: &str) -> SelectedFile {
        SelectedFile::new(name, Some("image/png"), &b"\x89PNG"[..])
    }

    fn response() -> UploadResponse {
        let mut ocr = OcrResult::empty("Japanese");
        ocr.characters.push(OcrCharacterResult::new("日", 0.95));
        ocr.detected_text = "日".to_string();
        UploadResponse {
            success: true,
            filename: "a.png".to_string(),
            ocr_results: ocr,
            message: "Image processed successfully".to_string(),
        }
    }

    fn server_error() -> ClientError {
        ClientError::Server {
            status: 500,
            code: "PROVIDER_FAILURE".to_string(),
            message: "OCR failed".to_string(),
            recoverable: false,
        }
    }

    #[test]
    fn test_select_image_moves_to_previewing() {
        let mut flow = UploadFlow::new();
        assert_eq!(flow.phase(), UploadPhase::Idle);
        assert!(!flow.trigger_enabled());

        let phase = flow.select(png("a.png"), Instant::now()).unwrap();
        assert_eq!(phase, UploadPhase::Previewing);
        assert!(flow.trigger_enabled());
    }

    #[test]
    fn test_non_image_keeps_state_and_raises_banner() {
        let now = Instant::now();
        let mut flow = UploadFlow::new();
        flow.select(png("a.png"), now).unwrap();

        let text = SelectedFile::new("notes.txt", Some("text/plain"), &b"hi"[..]);
        let err = flow.select(text, now).unwrap_err();
        assert!(matches!(err, SelectRejected::NotAnImage { .. }));
        assert_eq!(flow.phase(), UploadPhase::Previewing);
        assert_eq!(flow.file().unwrap().name, "a.png");
        assert!(flow.banner(now).unwrap().contains("notes.txt"));
        assert!(flow.banner(now + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn test_new_selection_replaces_pending_file() {
        let now = Instant::now();
        let mut flow = UploadFlow::new();
        flow.select(png("a.png"), now).unwrap();
        flow.select(png("b.png"), now).unwrap();
        assert_eq!(flow.file().unwrap().name, "b.png");
        assert_eq!(flow.phase(), UploadPhase::Previewing);
    }

    #[test]
    fn test_second_process_is_noop_while_processing() {
        let mut flow = UploadFlow::new();
        flow.select(png("a.png"), Instant::now()).unwrap();

        let (ticket, file) = flow.process().unwrap();
        assert_eq!(file.name, "a.png");
        assert_eq!(flow.phase(), UploadPhase::Processing);
        assert!(!flow.trigger_enabled());
        assert!(flow.process().is_none());
        assert_eq!(flow.in_flight(), Some(ticket));
    }

    #[test]
    fn test_select_refused_while_processing() {
        let mut flow = UploadFlow::new();
        flow.select(png("a.png"), Instant::now()).unwrap();
        flow.process().unwrap();
        assert_eq!(
            flow.select(png("b.png"), Instant::now()),
            Err(SelectRejected::Busy)
        );
        assert_eq!(flow.file().unwrap().name, "a.png");
    }

    #[test]
    fn test_success_displays_results() {
        let now = Instant::now();
        let mut flow = UploadFlow::new();
        flow.select(png("a.png"), now).unwrap();
        let (ticket, _) = flow.process().unwrap();

        assert!(flow.complete(ticket, Ok(response()), now));
        assert_eq!(flow.phase(), UploadPhase::ResultsDisplayed);
        assert_eq!(flow.results().unwrap().ocr_results.detected_text, "日");
        assert!(!flow.trigger_enabled());
    }

    #[test]
    fn test_failure_keeps_preview_and_allows_retry() {
        let now = Instant::now();
        let mut flow = UploadFlow::new();
        flow.select(png("a.png"), now).unwrap();
        let (ticket, _) = flow.process().unwrap();

        assert!(flow.complete(ticket, Err(server_error()), now));
        assert_eq!(flow.phase(), UploadPhase::Error);
        assert_eq!(flow.error(), Some("OCR failed"));
        assert_eq!(flow.banner(now), Some("OCR failed"));
        assert_eq!(flow.file().unwrap().name, "a.png");
        assert!(flow.trigger_enabled());

        let (retry, _) = flow.process().unwrap();
        assert!(retry > ticket);
        assert!(flow.banner(now).is_none());
    }

    #[test]
    fn test_network_failure_moves_to_error() {
        let now = Instant::now();
        let mut flow = UploadFlow::new();
        flow.select(png("a.png"), now).unwrap();
        let (ticket, _) = flow.process().unwrap();

        flow.complete(ticket, Err(ClientError::Network("connection refused".into())), now);
        assert_eq!(flow.phase(), UploadPhase::Error);
        assert!(flow.banner(now).unwrap().contains("connection refused"));
    }

    #[test]
    fn test_outcome_after_clear_is_ignored() {
        let now = Instant::now();
        let mut flow = UploadFlow::new();
        flow.select(png("a.png"), now).unwrap();
        let (ticket, _) = flow.process().unwrap();

        assert_eq!(flow.clear(), Some(ticket));
        assert!(!flow.complete(ticket, Ok(response()), now));
        assert_eq!(flow.phase(), UploadPhase::Idle);
        assert!(flow.results().is_none());
    }

    #[test]
    fn test_stale_ticket_ignored_after_retry() {
        let now = Instant::now();
        let mut flow = UploadFlow::new();
        flow.select(png("a.png"), now).unwrap();
        let (first, _) = flow.process().unwrap();
        flow.complete(first, Err(server_error()), now);
        let (second, _) = flow.process().unwrap();

        assert!(!flow.complete(first, Ok(response()), now));
        assert_eq!(flow.phase(), UploadPhase::Processing);
        assert!(flow.complete(second, Ok(response()), now));
    }

    #[test]
    fn test_clear_from_results() {
        let now = Instant::now();
        let mut flow = UploadFlow::new();
        flow.select(png("a.png"), now).unwrap();
        let (ticket, _) = flow.process().unwrap();
        flow.complete(ticket, Ok(response()), now);

        assert_eq!(flow.clear(), None);
        assert_eq!(flow.phase(), UploadPhase::Idle);
        assert!(flow.file().is_none());
        assert!(flow.results().is_none());
    }
}
