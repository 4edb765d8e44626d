//! Builder for [`HttpWriter`].
//!
//! Exposes the endpoint, the optional extra header, the batching options and
//! the client timeouts. The builder assembles an [`HttpWriterConfig`] and
//! provisions it, so it applies exactly the validation the directive syntax
//! does.

use std::sync::Arc;

use crate::{
    config::Replacer,
    http_writer::{HttpWriter, HttpWriterConfig},
    writer::WriterOpener,
};

use super::{BuildError, WriterBuilderTrait, option_setter};

/// Builder for constructing [`HttpWriter`] instances.
#[derive(Clone, Debug, Default)]
pub struct HttpWriterBuilder {
    endpoint: Option<String>,
    header: Option<(String, String)>,
    batch_count: Option<i64>,
    batch_period: Option<i64>,
    connect_timeout_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
}

impl HttpWriterBuilder {
    /// Create a new builder with no endpoint configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint template (required). Placeholders are resolved at
    /// build time.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Attach one extra header to every request. An empty name disables it.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.header = Some((key.into(), value.into()));
        self
    }

    option_setter!(
        #[doc = "Set the batch size. Validated but not used when sending."]
        with_batch_count,
        batch_count,
        i64
    );
    option_setter!(
        #[doc = "Set the batch period. Validated but not used when sending."]
        with_batch_period,
        batch_period,
        i64
    );
    option_setter!(
        #[doc = "Set the connect timeout in milliseconds."]
        with_connect_timeout_ms,
        connect_timeout_ms,
        u64
    );
    option_setter!(
        #[doc = "Set the overall request timeout in milliseconds."]
        with_request_timeout_ms,
        request_timeout_ms,
        u64
    );

    fn validate_endpoint(&self) -> Result<&str, BuildError> {
        match self.endpoint.as_deref() {
            None => Err(BuildError::InvalidConfig(
                "HTTP writer requires an endpoint".into(),
            )),
            Some(endpoint) if endpoint.trim().is_empty() => Err(BuildError::InvalidConfig(
                "endpoint must not be empty".into(),
            )),
            Some(endpoint) => Ok(endpoint),
        }
    }

    /// Assemble the unvalidated configuration.
    pub fn build_config(&self) -> Result<HttpWriterConfig, BuildError> {
        let endpoint = self.validate_endpoint()?.to_owned();
        let (key, value) = match &self.header {
            Some((key, value)) => (Some(key.clone()), Some(value.clone())),
            None => (None, None),
        };
        Ok(HttpWriterConfig {
            endpoint,
            key,
            value,
            count: self.batch_count,
            period: self.batch_period,
            connect_timeout_ms: self.connect_timeout_ms,
            request_timeout_ms: self.request_timeout_ms,
        })
    }

    /// Build and provision the writer.
    pub fn build(&self, replacer: &Replacer) -> Result<HttpWriter, BuildError> {
        Ok(self.build_config()?.provision(replacer)?)
    }
}

impl WriterBuilderTrait for HttpWriterBuilder {
    fn build_opener(&self, replacer: &Replacer) -> Result<Arc<dyn WriterOpener>, BuildError> {
        Ok(Arc::new(self.build(replacer)?))
    }
}
