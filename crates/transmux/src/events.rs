//! Observer channel and the events the controller emits on it.
//!
//! The controller never reports outcomes through return values; decrypt
//! timing and fatal push failures both travel through an [`EventSink`]
//! handed in at construction.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::TransmuxError;

/// Broad classification of a reported error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Errors raised while assembling or feeding media pipelines.
    Media,
}

/// Specific error condition carried by an error event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDetails {
    /// Format detection, pipeline construction or append failed.
    FragParsingError,
    /// Segment decryption failed.
    FragDecryptError,
}

/// Timing measurement for one pass through the decrypt stage.
///
/// Readings come from the clock selected in
/// [`TransmuxConfig`](crate::config::TransmuxConfig) and are relative to
/// that clock's own origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecryptStats {
    /// Clock reading when decryption started.
    pub started: Duration,
    /// Clock reading when decryption finished.
    pub finished: Duration,
}

impl DecryptStats {
    /// Wall-clock time spent in the decrypt stage.
    pub fn elapsed(&self) -> Duration {
        self.finished.saturating_sub(self.started)
    }
}

/// Events emitted by the controller on its observer channel.
#[derive(Debug, Clone)]
pub enum TransmuxEvent {
    /// A segment finished decrypting.
    SegmentDecrypted { stats: DecryptStats },
    /// A push was dropped. Exactly one of these is emitted per failed push.
    Error {
        kind: ErrorKind,
        details: ErrorDetails,
        fatal: bool,
        reason: String,
    },
}

/// Sending half of the observer channel.
///
/// Clone-cheap; `emit` becomes a no-op once the receiving side is gone, so
/// events fired after the embedder tore down its listener are discarded
/// safely instead of erroring.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<TransmuxEvent>,
}

impl EventSink {
    /// Create a sink together with its receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TransmuxEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Emit an event; dropped if no receiver is listening.
    pub fn emit(&self, event: TransmuxEvent) {
        let _ = self.tx.send(event);
    }

    pub(crate) fn emit_error(&self, error: &TransmuxError) {
        let details = match error {
            TransmuxError::Decrypt { .. } => ErrorDetails::FragDecryptError,
            TransmuxError::Detection
            | TransmuxError::Construction { .. }
            | TransmuxError::Append { .. } => ErrorDetails::FragParsingError,
        };
        self.emit(TransmuxEvent::Error {
            kind: ErrorKind::Media,
            details,
            fatal: true,
            reason: error.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_and_receive() {
        let (sink, mut rx) = EventSink::channel();
        sink.emit_error(&TransmuxError::Detection);
        match rx.try_recv() {
            Ok(TransmuxEvent::Error {
                details,
                fatal,
                reason,
                ..
            }) => {
                assert_eq!(details, ErrorDetails::FragParsingError);
                assert!(fatal);
                assert_eq!(reason, "no demux matching with content found");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_decrypt_error_maps_to_decrypt_details() {
        let (sink, mut rx) = EventSink::channel();
        sink.emit_error(&TransmuxError::Decrypt {
            reason: "bad key".into(),
        });
        match rx.try_recv() {
            Ok(TransmuxEvent::Error { details, .. }) => {
                assert_eq!(details, ErrorDetails::FragDecryptError);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_emit_without_receiver_is_noop() {
        let (sink, rx) = EventSink::channel();
        drop(rx);
        sink.emit_error(&TransmuxError::Detection);
    }

    #[test]
    fn test_decrypt_stats_elapsed() {
        let stats = DecryptStats {
            started: Duration::from_millis(10),
            finished: Duration::from_millis(25),
        };
        assert_eq!(stats.elapsed(), Duration::from_millis(15));

        // Coarse wall clocks can step backwards; elapsed saturates.
        let stepped = DecryptStats {
            started: Duration::from_millis(25),
            finished: Duration::from_millis(10),
        };
        assert_eq!(stepped.elapsed(), Duration::ZERO);
    }
}
