//! Delivery channel sending one HTTP request per log line.
//!
//! Each send is synchronous: the calling thread blocks for the round trip.
//! The channel keeps no per-call state, so a single instance may be shared
//! by any number of producer threads.

use std::{
    error::Error as _,
    io::{self, Read},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use delegate::delegate;
use log::{debug, trace};
use ureq::{Agent, AgentBuilder, ErrorKind};

use crate::{
    payload::extract_payload,
    writer::{DeliveryRejectedError, SendReport, TransportError, WriterChannel},
};

use super::{response::dump_response, writer::HttpWriter};

/// Content type announced on every request. The body is not validated.
pub const CONTENT_TYPE: &str = "application/json";

/// Upper bound on response bytes read back from a successful request so the
/// connection can return to the agent's pool.
const DRAIN_LIMIT: u64 = 64 * 1024;

/// Cooperative cancellation flag shared between a caller and its sends.
///
/// Cancellation is checked before a request is dispatched; a request already
/// on the wire is bounded by its deadline instead.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Per-send controls.
#[derive(Clone, Debug, Default)]
pub struct SendOptions {
    deadline: Option<Instant>,
    cancel: Option<CancelToken>,
}

impl SendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the send if no response has arrived by `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Shorthand for a deadline `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Observe `token` before dispatching.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_canceled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_canceled)
    }
}

/// Live channel bound to an [`HttpWriter`].
pub struct HttpChannel {
    writer: Arc<HttpWriter>,
    agent: Agent,
}

impl HttpChannel {
    pub(crate) fn new(writer: Arc<HttpWriter>) -> Result<Self, TransportError> {
        let mut builder = AgentBuilder::new()
            .timeout_connect(writer.connect_timeout())
            .timeout(writer.request_timeout());
        if writer.is_tls() {
            let connector = native_tls::TlsConnector::new()
                .map_err(|err| TransportError::Client(err.to_string()))?;
            builder = builder.tls_connector(Arc::new(connector));
        }
        Ok(Self {
            writer,
            agent: builder.build(),
        })
    }

    /// Writer this channel was opened from.
    pub fn writer(&self) -> &Arc<HttpWriter> {
        &self.writer
    }

    delegate! {
        to self.writer {
            /// Resolved endpoint requests are posted to.
            pub fn endpoint(&self) -> &str;
            /// Name of the extra header sent with each request, if any.
            pub fn header_key(&self) -> Option<&str>;
        }
    }

    /// Send one line, honouring the deadline and cancellation in `options`.
    ///
    /// See [`SendReport`] for the meaning of the returned length.
    pub fn send_with(&self, line: &[u8], options: &SendOptions) -> SendReport {
        let endpoint = self.endpoint();
        if options.is_canceled() {
            return SendReport::failed(TransportError::Canceled {
                endpoint: endpoint.to_owned(),
            });
        }
        let remaining = options
            .deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()));
        if remaining == Some(Duration::ZERO) {
            return SendReport::failed(TransportError::DeadlineExceeded {
                endpoint: endpoint.to_owned(),
            });
        }

        let request = match self.build_request(remaining) {
            Ok(request) => request,
            Err(err) => return SendReport::failed(err),
        };
        let payload = extract_payload(line);
        trace!("HttpChannel {endpoint}: posting {} byte payload", payload.len());

        match request.send_bytes(payload) {
            Ok(response) | Err(ureq::Error::Status(_, response)) => {
                self.classify(line.len(), response)
            }
            Err(ureq::Error::Transport(err)) => {
                debug!("HttpChannel {endpoint}: transport failure: {err}");
                SendReport::failed(self.transport_error(&err, options.deadline))
            }
        }
    }

    fn build_request(&self, remaining: Option<Duration>) -> Result<ureq::Request, TransportError> {
        let mut request = self
            .agent
            .post(self.endpoint())
            .set("Content-Type", CONTENT_TYPE);
        if let Some(header) = &self.writer.header {
            validate_header(&header.name, &header.value)?;
            request = request.set(&header.name, &header.value);
        }
        if let Some(remaining) = remaining {
            request = request.timeout(remaining.min(self.writer.request_timeout()));
        }
        Ok(request)
    }

    fn classify(&self, len: usize, response: ureq::Response) -> SendReport {
        let status = response.status();
        if (200..300).contains(&status) {
            drain(response);
            debug!("HttpChannel {}: delivered ({status})", self.endpoint());
            return SendReport::delivered(len);
        }
        debug!("HttpChannel {}: rejected ({status})", self.endpoint());
        SendReport::rejected(
            len,
            DeliveryRejectedError {
                status,
                dump: dump_response(response),
            },
        )
    }

    fn transport_error(&self, err: &ureq::Transport, deadline: Option<Instant>) -> TransportError {
        let endpoint = self.endpoint().to_owned();
        let deadline_passed = deadline.is_some_and(|d| Instant::now() >= d);
        if is_timeout(err) || deadline_passed {
            return TransportError::DeadlineExceeded { endpoint };
        }
        match err.kind() {
            ErrorKind::BadHeader => TransportError::InvalidHeader {
                name: self.header_key().unwrap_or_default().to_owned(),
                reason: err.to_string(),
            },
            _ => TransportError::Network {
                endpoint,
                message: err.to_string(),
            },
        }
    }
}

impl WriterChannel for HttpChannel {
    fn send(&self, line: &[u8]) -> SendReport {
        self.send_with(line, &SendOptions::default())
    }

    fn close(&self) -> Result<(), TransportError> {
        trace!("HttpChannel {}: closed", self.endpoint());
        Ok(())
    }
}

impl std::fmt::Debug for HttpChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpChannel")
            .field("endpoint", &self.endpoint())
            .finish()
    }
}

/// Check a header against RFC 9110 token and field-value rules.
pub(crate) fn validate_header(name: &str, value: &str) -> Result<(), TransportError> {
    let invalid = |reason: &str| TransportError::InvalidHeader {
        name: name.to_owned(),
        reason: reason.to_owned(),
    };
    if name.is_empty() {
        return Err(invalid("empty header name"));
    }
    if !name.bytes().all(is_token_byte) {
        return Err(invalid("header name contains a character outside the token set"));
    }
    if !value.bytes().all(|b| b == b'\t' || (b >= 0x20 && b != 0x7f)) {
        return Err(invalid("header value contains a control character"));
    }
    Ok(())
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

fn is_timeout(err: &ureq::Transport) -> bool {
    let mut source = err.source();
    while let Some(inner) = source {
        if let Some(io_err) = inner.downcast_ref::<io::Error>() {
            if matches!(
                io_err.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            ) {
                return true;
            }
        }
        source = inner.source();
    }
    false
}

fn drain(response: ureq::Response) {
    let _ = io::copy(
        &mut response.into_reader().take(DRAIN_LIMIT),
        &mut io::sink(),
    );
}
