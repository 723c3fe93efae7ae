//! Upload flow state machine
//!
//! Tracks one image upload from file selection through variant generation
//! to completion. The phase sequence is fixed; the WebP phase is skipped
//! when no WebP variants are being produced.
//!
//! Progress here is real progress only: bytes read and phases completed.
//! Any smoothing or animation is a presentation concern and must not feed
//! back into this state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Phases of one upload, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UploadPhase {
    Idle,
    Reading,
    Compressing,
    GeneratingWebp,
    ReadyToUpload,
    Uploading,
    Done,
    Failed,
}

impl UploadPhase {
    /// Short status string for progress reporting
    pub fn status(&self) -> &'static str {
        match self {
            UploadPhase::Idle => "Waiting for file",
            UploadPhase::Reading => "Reading file",
            UploadPhase::Compressing => "Compressing image",
            UploadPhase::GeneratingWebp => "Generating WebP",
            UploadPhase::ReadyToUpload => "Ready to upload",
            UploadPhase::Uploading => "Uploading",
            UploadPhase::Done => "Done",
            UploadPhase::Failed => "Failed",
        }
    }

    /// Whether `next` is a legal successor of this phase
    fn allows(&self, next: UploadPhase) -> bool {
        use UploadPhase::*;
        // Failure is reachable from every phase that has started work
        if next == Failed {
            return !matches!(self, Idle | Done | Failed);
        }
        matches!(
            (self, next),
            (Idle, Reading)
                | (Reading, Compressing)
                | (Compressing, GeneratingWebp)
                | (Compressing, ReadyToUpload)
                | (GeneratingWebp, ReadyToUpload)
                | (ReadyToUpload, Uploading)
                | (Uploading, Done)
        )
    }
}

/// Attempted an out-of-order phase change
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid upload phase transition: {from:?} -> {to:?}")]
pub struct InvalidTransition {
    pub from: UploadPhase,
    pub to: UploadPhase,
}

/// State of one upload in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadFlow {
    phase: UploadPhase,
    /// Input size in bytes, known after reading starts
    total_bytes: u64,
    /// Bytes actually handled so far
    bytes_processed: u64,
    /// Error message once failed
    error: Option<String>,
}

impl UploadFlow {
    /// A fresh flow in the idle phase
    pub fn new() -> Self {
        Self {
            phase: UploadPhase::Idle,
            total_bytes: 0,
            bytes_processed: 0,
            error: None,
        }
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Move to `next`, rejecting out-of-order transitions
    pub fn advance(&mut self, next: UploadPhase) -> Result<(), InvalidTransition> {
        if !self.phase.allows(next) {
            return Err(InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        Ok(())
    }

    /// Enter the reading phase for an input of `total_bytes`
    pub fn start_reading(&mut self, total_bytes: u64) -> Result<(), InvalidTransition> {
        self.advance(UploadPhase::Reading)?;
        self.total_bytes = total_bytes;
        self.bytes_processed = 0;
        Ok(())
    }

    /// Record real bytes handled; clamped to the declared total
    pub fn record_bytes(&mut self, bytes: u64) {
        self.bytes_processed = (self.bytes_processed + bytes).min(self.total_bytes);
    }

    /// Mark the flow failed with a message; no further transitions succeed
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), InvalidTransition> {
        self.advance(UploadPhase::Failed)?;
        self.error = Some(message.into());
        Ok(())
    }

    /// Real progress in [0, 100]: byte progress across the work phases,
    /// completion once done. Nothing cosmetic contributes.
    pub fn percent(&self) -> f32 {
        match self.phase {
            UploadPhase::Idle => 0.0,
            UploadPhase::Done => 100.0,
            UploadPhase::Failed => 0.0,
            _ if self.total_bytes == 0 => 0.0,
            _ => ((self.bytes_processed as f64 / self.total_bytes as f64) * 100.0)
                .clamp(0.0, 100.0) as f32,
        }
    }
}

impl Default for UploadFlow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use UploadPhase::*;

    #[test]
    fn full_sequence_with_webp() {
        let mut flow = UploadFlow::new();
        flow.start_reading(1000).unwrap();
        flow.record_bytes(1000);
        flow.advance(Compressing).unwrap();
        flow.advance(GeneratingWebp).unwrap();
        flow.advance(ReadyToUpload).unwrap();
        flow.advance(Uploading).unwrap();
        flow.advance(Done).unwrap();
        assert_eq!(flow.percent(), 100.0);
    }

    #[test]
    fn webp_phase_is_skippable() {
        let mut flow = UploadFlow::new();
        flow.start_reading(10).unwrap();
        flow.advance(Compressing).unwrap();
        flow.advance(ReadyToUpload).unwrap();
        assert_eq!(flow.phase(), ReadyToUpload);
    }

    #[test]
    fn out_of_order_transitions_rejected() {
        let mut flow = UploadFlow::new();
        let err = flow.advance(Uploading).unwrap_err();
        assert_eq!(err.from, Idle);
        assert_eq!(err.to, Uploading);

        flow.start_reading(10).unwrap();
        assert!(flow.advance(Done).is_err());
        // Phase is unchanged after a rejected transition
        assert_eq!(flow.phase(), Reading);
    }

    #[test]
    fn failure_reachable_from_active_phases_only() {
        let mut flow = UploadFlow::new();
        assert!(flow.fail("too early").is_err());

        flow.start_reading(10).unwrap();
        flow.advance(Compressing).unwrap();
        flow.fail("encoder blew up").unwrap();
        assert_eq!(flow.phase(), Failed);
        assert_eq!(flow.error(), Some("encoder blew up"));

        // Terminal: nothing leaves the failed phase
        assert!(flow.advance(Reading).is_err());
        assert!(flow.fail("again").is_err());
    }

    #[test]
    fn percent_reflects_real_bytes_and_clamps() {
        let mut flow = UploadFlow::new();
        flow.start_reading(200).unwrap();
        flow.record_bytes(50);
        assert_eq!(flow.percent(), 25.0);

        // Over-reporting clamps at the declared total
        flow.record_bytes(10_000);
        assert_eq!(flow.percent(), 100.0);
    }

    #[test]
    fn status_strings_cover_all_phases() {
        for phase in [
            Idle,
            Reading,
            Compressing,
            GeneratingWebp,
            ReadyToUpload,
            Uploading,
            Done,
            Failed,
        ] {
            assert!(!phase.status().is_empty());
        }
    }
}
