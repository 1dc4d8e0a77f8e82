//! Character lookup state machine
//!
//! `Idle -> LookingUp -> {Displayed, NotFound, Error}`. A new trigger
//! supersedes the lookup in flight: only the latest ticket is applied.

use kanji_core::models::DictionaryEntry;
use std::time::Instant;

use crate::banner::{self, Banner};
use crate::ticket::{Ticket, TicketIssuer};
use crate::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupPhase {
    Idle,
    LookingUp,
    Displayed,
    /// The dictionary has no entry for the character.
    NotFound,
    Error,
}

#[derive(Debug, Clone)]
pub struct LookupFlow {
    phase: LookupPhase,
    character: Option<String>,
    entry: Option<DictionaryEntry>,
    error: Option<String>,
    banner: Option<Banner>,
    pending: Option<Ticket>,
    tickets: TicketIssuer,
}

impl Default for LookupFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl LookupFlow {
    pub fn new() -> Self {
        Self {
            phase: LookupPhase::Idle,
            character: None,
            entry: None,
            error: None,
            banner: None,
            pending: None,
            tickets: TicketIssuer::default(),
        }
    }

    pub fn phase(&self) -> LookupPhase {
        self.phase
    }

    /// Character of the current (or last) lookup
    pub fn character(&self) -> Option<&str> {
        self.character.as_deref()
    }

    pub fn entry(&self) -> Option<&DictionaryEntry> {
        self.entry.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn pending(&self) -> Option<Ticket> {
        self.pending
    }

    pub fn banner(&self, now: Instant) -> Option<&str> {
        banner::visible(&self.banner, now)
    }

    pub(crate) fn raised_banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    /// Start looking up `character`.
    ///
    /// Returns the new ticket and the ticket it superseded, if one was pending.
    pub fn trigger(&mut self, character: &str) -> (Ticket, Option<Ticket>) {
        let superseded = self.pending.take();
        let ticket = self.tickets.issue();
        tracing::debug!(%ticket, superseded = ?superseded, character, "Lookup started");

        self.pending = Some(ticket);
        self.phase = LookupPhase::LookingUp;
        self.character = Some(character.to_string());
        self.entry = None;
        self.error = None;
        self.banner = None;
        (ticket, superseded)
    }

    /// Apply a lookup outcome; `Ok(None)` is the dictionary's not-found answer.
    ///
    /// Returns `false` and changes nothing for a superseded or cleared ticket.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        outcome: Result<Option<DictionaryEntry>, ClientError>,
        now: Instant,
    ) -> bool {
        if self.pending != Some(ticket) {
            tracing::debug!(%ticket, waiting_for = ?self.pending, "Ignoring stale lookup outcome");
            return false;
        }
        self.pending = None;

        match outcome {
            Ok(Some(entry)) => {
                self.entry = Some(entry);
                self.phase = LookupPhase::Displayed;
            }
            Ok(None) => {
                self.phase = LookupPhase::NotFound;
            }
            Err(err) => {
                tracing::debug!(%ticket, error = %err, "Lookup failed");
                let message = err.to_string();
                self.banner = Some(Banner::new(message.clone(), now));
                self.error = Some(message);
                self.phase = LookupPhase::Error;
            }
        }
        true
    }

    /// Back to `Idle`. Returns the lookup that was pending, if any.
    pub fn clear(&mut self) -> Option<Ticket> {
        let cancelled = self.pending.take();
        self.phase = LookupPhase::Idle;
        self.character = None;
        self.entry = None;
        self.error = None;
        self.banner = None;
        cancelled
    }
}
