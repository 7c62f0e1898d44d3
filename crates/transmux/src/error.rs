use thiserror::Error;

/// Errors surfaced by the transmux controller.
///
/// Every variant is terminal for the push that produced it but never for
/// the controller itself; a later push may still succeed, e.g. after a
/// track switch corrects a codec mismatch.
#[derive(Debug, Error)]
pub enum TransmuxError {
    /// No registered format matched the buffer.
    #[error("no demux matching with content found")]
    Detection,

    /// AES-128 decryption failed before probing could run.
    #[error("decryption error: {reason}")]
    Decrypt { reason: String },

    /// A demuxer or remuxer constructor failed.
    #[error("pipeline construction failed: {reason}")]
    Construction { reason: String },

    /// The bound demuxer rejected the appended buffer.
    #[error("append failed: {reason}")]
    Append { reason: String },
}
