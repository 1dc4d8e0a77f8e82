//! Transient error banner shown by the client

use std::time::{Duration, Instant};

/// How long a banner stays up without user interaction
pub const BANNER_TTL: Duration = Duration::from_secs(5);

/// A dismissible message raised after a failure.
///
/// Hidden once [`BANNER_TTL`] has passed or on the next explicit user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    message: String,
    raised_at: Instant,
}

impl Banner {
    pub fn new(message: impl Into<String>, now: Instant) -> Self {
        Self {
            message: message.into(),
            raised_at: now,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn raised_at(&self) -> Instant {
        self.raised_at
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) < BANNER_TTL
    }
}

/// Visible banner text from an optional slot
pub(crate) fn visible(slot: &Option<Banner>, now: Instant) -> Option<&str> {
    slot.as_ref()
        .filter(|banner| banner.is_visible(now))
        .map(Banner::message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_hides_after_five_seconds() {
        let t0 = Instant::now();
        let banner = Banner::new("Upload failed", t0);
        assert!(banner.is_visible(t0));
        assert!(banner.is_visible(t0 + Duration::from_millis(4999)));
        assert!(!banner.is_visible(t0 + BANNER_TTL));
    }

    #[test]
    fn test_visible_helper() {
        let t0 = Instant::now();
        let slot = Some(Banner::new("oops", t0));
        assert_eq!(visible(&slot, t0), Some("oops"));
        assert_eq!(visible(&slot, t0 + Duration::from_secs(6)), None);
        assert_eq!(visible(&None, t0), None);
    }
}
