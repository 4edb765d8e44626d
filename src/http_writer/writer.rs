//! The validated, immutable HTTP writer descriptor.

use std::{fmt, sync::Arc, time::Duration};

use serde::Serialize;

use crate::writer::{TransportError, WriterChannel, WriterOpener};

use super::{channel::HttpChannel, config::HttpWriterConfig};

/// Extra header attached to every request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct HeaderPair {
    pub(crate) name: String,
    pub(crate) value: String,
}

/// Writer forwarding log payloads to an HTTP endpoint.
///
/// Built by [`HttpWriterConfig::provision`]; immutable afterwards and shared
/// with its channels through `Arc`. Serialises back to the configuration
/// form with the endpoint already resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(into = "HttpWriterConfig")]
pub struct HttpWriter {
    pub(crate) endpoint: String,
    pub(crate) header: Option<HeaderPair>,
    pub(crate) batch_count: Option<u64>,
    pub(crate) batch_period: Option<u64>,
    pub(crate) connect_timeout: Duration,
    pub(crate) request_timeout: Duration,
}

impl HttpWriter {
    /// Resolved endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Deduplication key: the resolved endpoint.
    pub fn writer_key(&self) -> &str {
        &self.endpoint
    }

    /// Name of the extra request header, if one is configured.
    pub fn header_key(&self) -> Option<&str> {
        self.header.as_ref().map(|h| h.name.as_str())
    }

    /// Value sent with [`HttpWriter::header_key`].
    pub fn header_value(&self) -> Option<&str> {
        self.header.as_ref().map(|h| h.value.as_str())
    }

    /// Configured batch size. Not used when sending.
    pub fn batch_count(&self) -> Option<u64> {
        self.batch_count
    }

    /// Configured batch period. Not used when sending.
    pub fn batch_period(&self) -> Option<u64> {
        self.batch_period
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub(crate) fn is_tls(&self) -> bool {
        self.endpoint
            .get(..8)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("https://"))
    }

    /// Open a delivery channel bound to this writer.
    ///
    /// No network I/O happens here. Fails only when client resources (the
    /// TLS connector for `https` endpoints) cannot be created.
    pub fn open_channel(self: &Arc<Self>) -> Result<HttpChannel, TransportError> {
        HttpChannel::new(Arc::clone(self))
    }
}

impl fmt::Display for HttpWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.endpoint)
    }
}

impl WriterOpener for HttpWriter {
    fn writer_key(&self) -> String {
        self.endpoint.clone()
    }

    fn open_writer(self: Arc<Self>) -> Result<Arc<dyn WriterChannel>, TransportError> {
        Ok(Arc::new(self.open_channel()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Replacer;
    use rstest::rstest;

    fn writer(endpoint: &str) -> HttpWriter {
        HttpWriterConfig {
            endpoint: endpoint.into(),
            key: Some("X-Auth".into()),
            value: Some("token".into()),
            count: Some(100),
            ..Default::default()
        }
        .provision(&Replacer::isolated())
        .expect("provision")
    }

    #[rstest]
    fn display_and_key_are_the_endpoint() {
        let w = writer("http://example.com/log");
        assert_eq!(w.to_string(), "http://example.com/log");
        assert_eq!(WriterOpener::writer_key(&w), "http://example.com/log");
    }

    #[rstest]
    fn identical_endpoints_share_a_key() {
        let replacer = Replacer::isolated().with_value("host", "example.com");
        let templated = HttpWriterConfig {
            endpoint: "http://{host}/log".into(),
            ..Default::default()
        }
        .provision(&replacer)
        .expect("provision");
        let literal = writer("http://example.com/log");
        assert_eq!(templated.writer_key(), literal.writer_key());
    }

    #[rstest]
    #[case("https://example.com/", true)]
    #[case("HTTPS://example.com/", true)]
    #[case("http://example.com/", false)]
    fn detects_tls_endpoints(#[case] endpoint: &str, #[case] tls: bool) {
        assert_eq!(writer(endpoint).is_tls(), tls);
    }

    #[rstest]
    fn serialises_to_configuration_form() {
        let json = serde_json::to_value(writer("http://example.com/log")).expect("serialise");
        assert_eq!(json["url"], "http://example.com/log");
        assert_eq!(json["key"], "X-Auth");
        assert_eq!(json["value"], "token");
        assert_eq!(json["count"], 100);
        assert!(json.get("period").is_none());
    }

    #[rstest]
    fn opening_a_channel_leaves_the_writer_untouched() {
        let w = Arc::new(writer("http://example.com/log"));
        let before = (*w).clone();
        let channel = w.open_channel().expect("open channel");
        assert!(Arc::ptr_eq(channel.writer(), &w));
        assert_eq!(*w, before);
    }
}
