//! HTTP log writer.
//!
//! [`HttpWriterConfig`] holds the raw configuration, parsed from the
//! directive syntax or deserialised with serde. Provisioning it yields an
//! immutable [`HttpWriter`], which opens [`HttpChannel`]s. A channel turns
//! each formatted log line into one `POST` carrying the line's payload.
//!
//! # Outcome Semantics
//!
//! - **2xx**: delivered; the full input length is reported.
//! - **Other statuses**: a [`DeliveryRejectedError`](crate::writer::DeliveryRejectedError)
//!   is recorded, but the full input length is still reported.
//! - **Network errors, invalid headers, deadlines, cancellation**: a
//!   [`TransportError`](crate::writer::TransportError) with zero bytes
//!   reported.
//!
//! Nothing is retried and nothing is buffered. Callers decide whether to fall
//! back to a local sink.

mod channel;
mod config;
mod response;
mod writer;

#[cfg(test)]
mod tests;

pub use channel::{CONTENT_TYPE, CancelToken, HttpChannel, SendOptions};
pub use config::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, HttpWriterConfig};
pub use response::DUMP_BODY_LIMIT;
pub use writer::HttpWriter;
