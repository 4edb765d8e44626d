//! Writer capabilities shared by every destination kind.
//!
//! A writer is described by a [`WriterOpener`] (the immutable, validated
//! configuration) and used through a [`WriterChannel`] (the live object that
//! delivers lines). The logging pipeline only ever talks to these two traits,
//! so new destination kinds plug in without touching the caller.

use std::{fmt, sync::Arc};

use thiserror::Error;

/// Failures raised while building or issuing a request.
///
/// A transport error means the line was not delivered; callers should treat
/// it as a candidate for their own fallback path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// A configured header name or value cannot be sent on the wire.
    #[error("invalid request header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },
    /// The endpoint could not be reached or the exchange failed mid-way.
    #[error("request to {endpoint} failed: {message}")]
    Network { endpoint: String, message: String },
    /// The per-send deadline elapsed before a response arrived.
    #[error("request to {endpoint} exceeded its deadline")]
    DeadlineExceeded { endpoint: String },
    /// The caller cancelled the send before it was dispatched.
    #[error("request to {endpoint} was cancelled")]
    Canceled { endpoint: String },
    /// Writing to a local stream failed.
    #[error("stream write failed: {0}")]
    Stream(String),
    /// Underlying client resources could not be allocated.
    #[error("failed to initialise client: {0}")]
    Client(String),
}

/// The remote endpoint answered outside the `2xx` range.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("endpoint rejected delivery with status {status}: {dump}")]
pub struct DeliveryRejectedError {
    /// HTTP status code returned by the endpoint.
    pub status: u16,
    /// Operator-facing dump of the response.
    pub dump: String,
}

/// Error carried alongside a [`SendReport`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Rejected(#[from] DeliveryRejectedError),
}

/// Outcome of a single send.
///
/// `written` follows the `io::Write` convention used by log pipelines: a
/// transport failure reports `0`, while a rejected delivery still reports the
/// full input length so generic fallback logic does not mistake it for a
/// lost line. Inspect `error` to observe rejections.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct SendReport {
    pub written: usize,
    pub error: Option<SendError>,
}

impl SendReport {
    /// The whole input was accepted.
    pub fn delivered(len: usize) -> Self {
        Self {
            written: len,
            error: None,
        }
    }

    /// Nothing was delivered.
    pub fn failed(err: TransportError) -> Self {
        Self {
            written: 0,
            error: Some(SendError::Transport(err)),
        }
    }

    /// The endpoint answered with a non-success status.
    pub fn rejected(len: usize, err: DeliveryRejectedError) -> Self {
        Self {
            written: len,
            error: Some(SendError::Rejected(err)),
        }
    }

    /// Return `true` when no error was recorded.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Return the transport error, if the send failed before a response.
    pub fn transport_error(&self) -> Option<&TransportError> {
        match &self.error {
            Some(SendError::Transport(err)) => Some(err),
            _ => None,
        }
    }

    /// Return the rejection, if the endpoint answered outside `2xx`.
    pub fn rejection(&self) -> Option<&DeliveryRejectedError> {
        match &self.error {
            Some(SendError::Rejected(err)) => Some(err),
            _ => None,
        }
    }
}

/// Live delivery object produced by a [`WriterOpener`].
///
/// Implementations must be safe to call from many threads at once; each call
/// is self-contained and blocking.
pub trait WriterChannel: Send + Sync {
    /// Deliver one formatted log line.
    fn send(&self, line: &[u8]) -> SendReport;

    /// Release the channel. Most channels hold no transport state.
    fn close(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Validated writer configuration able to open delivery channels.
///
/// `Display` renders the human-readable description used in diagnostics.
pub trait WriterOpener: fmt::Display + fmt::Debug + Send + Sync {
    /// Key used by the pipeline to deduplicate writers.
    fn writer_key(&self) -> String;

    /// Open a new channel bound to this writer.
    fn open_writer(self: Arc<Self>) -> Result<Arc<dyn WriterChannel>, TransportError>;
}

impl<T: WriterChannel + ?Sized> WriterChannel for Arc<T> {
    fn send(&self, line: &[u8]) -> SendReport {
        (**self).send(line)
    }

    fn close(&self) -> Result<(), TransportError> {
        (**self).close()
    }
}
