//! HTTP log writer.
//!
//! Forwards formatted log lines to a remote HTTP endpoint, one `POST` per
//! line. The crate is organised around two traits:
//!
//! - [`WriterOpener`]: a validated, immutable writer descriptor. It carries a
//!   deduplication key and opens channels.
//! - [`WriterChannel`]: a live delivery object turning each line into one
//!   delivery attempt and reporting how many bytes were accepted.
//!
//! [`HttpWriter`] / [`HttpChannel`] implement them for HTTP endpoints and
//! [`StreamWriter`] for the standard streams. The [`pipeline`] module holds
//! the plumbing a host needs around them: kind registry, channel cache and
//! local fallback.
//!
//! # Example
//!
//! ```no_run
//! use http_log_writer::{HttpWriterConfig, Replacer, WriterChannel};
//! use std::sync::Arc;
//!
//! let config = HttpWriterConfig::parse(
//!     "Caddyfile",
//!     "http https://logs.example.com/ingest {\n  key X-Auth\n  value secret123\n}",
//! )?;
//! let writer = Arc::new(config.provision(&Replacer::new())?);
//! let channel = writer.open_channel()?;
//! let report = channel.send(b"1700000000.1\tinfo\taccess\thttp\t{\"status\":200}\n");
//! assert_eq!(report.written, 45);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builders;
pub mod config;
pub mod http_writer;
pub mod payload;
pub mod pipeline;
pub mod rate_limited_warner;
pub mod stream_writer;
pub mod writer;

#[cfg(any(test, feature = "test-util"))]
pub mod test_utils;

pub use builders::{BuildError, HttpWriterBuilder, StreamWriterBuilder, WriterBuilderTrait};
pub use config::{ConfigError, Dispenser, Location, PlaceholderError, Replacer};
pub use http_writer::{CancelToken, HttpChannel, HttpWriter, HttpWriterConfig, SendOptions};
pub use payload::{StructuredLine, extract_payload};
pub use pipeline::{ChannelCache, FallbackChannel, WriterRegistry};
pub use rate_limited_warner::RateLimitedWarner;
pub use stream_writer::{StreamChannel, StreamTarget, StreamWriter};
pub use writer::{
    DeliveryRejectedError, SendError, SendReport, TransportError, WriterChannel, WriterOpener,
};
