//! Raw configuration for the HTTP writer and its validation into an
//! [`HttpWriter`](super::HttpWriter).
//!
//! Values arrive either from the directive syntax
//! ([`HttpWriterConfig::from_directives`]) or from serde, using the field
//! names `url`, `key`, `value`, `count` and `period`.

use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{ConfigError, Dispenser, Replacer};

use super::writer::{HeaderPair, HttpWriter};

/// Default timeout for establishing a connection to the endpoint.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default timeout for a whole request, connect included.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Unvalidated HTTP writer configuration.
///
/// `count` and `period` describe a batching policy that the writer does not
/// implement; they are accepted and validated so existing configurations
/// keep loading.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpWriterConfig {
    /// Endpoint template; may contain `{placeholder}` tokens.
    #[serde(rename = "url")]
    pub endpoint: String,
    /// Name of an extra request header. Empty or absent disables it. A
    /// header named like a default one (`Content-Type`) replaces that default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
}

impl HttpWriterConfig {
    /// Parse a writer block from `input`.
    pub fn parse(source: &str, input: &str) -> Result<Self, ConfigError> {
        let mut dispenser = Dispenser::new(source, input)?;
        Self::from_directives(&mut dispenser)
    }

    /// Deserialise the JSON form of a writer configuration.
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(input).map_err(|err| ConfigError::Json(err.to_string()))
    }

    /// Parse a writer block:
    ///
    /// ```text
    /// <name> <endpoint> {
    ///     count  <int>
    ///     period <int>
    ///     key    <header name>
    ///     value  <header value>
    /// }
    /// ```
    ///
    /// The leading name is the writer kind and is not interpreted here. When
    /// the dispenser holds several blocks, later ones overwrite earlier
    /// values.
    pub fn from_directives(d: &mut Dispenser) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        while d.next() {
            if !d.next_arg() {
                return Err(d.arg_err());
            }
            config.endpoint = d.val().to_owned();
            if d.next_arg() {
                return Err(d.unexpected_arg_err());
            }
            let nesting = d.nesting();
            while d.next_block(nesting) {
                let directive = d.val().to_owned();
                match directive.as_str() {
                    "count" => config.count = Some(integer_arg(d)?),
                    "period" => config.period = Some(integer_arg(d)?),
                    "key" => config.key = Some(string_arg(d)?),
                    "value" => config.value = Some(string_arg(d)?),
                    _ => return Err(d.unrecognized_err()),
                }
            }
        }
        Ok(config)
    }

    /// Resolve placeholders and validate every field.
    ///
    /// No network I/O happens here.
    pub fn provision(&self, replacer: &Replacer) -> Result<HttpWriter, ConfigError> {
        let endpoint = replacer
            .replace_or_err(&self.endpoint, true, true)
            .map_err(|reason| ConfigError::Placeholder {
                template: self.endpoint.clone(),
                reason,
            })?;
        validate_endpoint(&endpoint)?;

        let header = match self.key.as_deref() {
            Some(name) if !name.is_empty() => Some(HeaderPair {
                name: name.to_owned(),
                value: self.value.clone().unwrap_or_default(),
            }),
            _ => {
                if self.value.as_deref().is_some_and(|v| !v.is_empty()) {
                    debug!("HttpWriter {endpoint}: header value set without a key; ignoring it");
                }
                None
            }
        };

        Ok(HttpWriter {
            endpoint,
            header,
            batch_count: ensure_positive("count", self.count)?,
            batch_period: ensure_positive("period", self.period)?,
            connect_timeout: timeout_or(
                "connect_timeout_ms",
                self.connect_timeout_ms,
                DEFAULT_CONNECT_TIMEOUT,
            )?,
            request_timeout: timeout_or(
                "request_timeout_ms",
                self.request_timeout_ms,
                DEFAULT_REQUEST_TIMEOUT,
            )?,
        })
    }
}

impl From<HttpWriter> for HttpWriterConfig {
    fn from(writer: HttpWriter) -> Self {
        let (key, value) = match writer.header {
            Some(HeaderPair { name, value }) => (Some(name), Some(value)),
            None => (None, None),
        };
        Self {
            endpoint: writer.endpoint,
            key,
            value,
            count: writer.batch_count.and_then(|c| i64::try_from(c).ok()),
            period: writer.batch_period.and_then(|p| i64::try_from(p).ok()),
            connect_timeout_ms: u64::try_from(writer.connect_timeout.as_millis()).ok(),
            request_timeout_ms: u64::try_from(writer.request_timeout.as_millis()).ok(),
        }
    }
}

fn string_arg(d: &mut Dispenser) -> Result<String, ConfigError> {
    if !d.next_arg() {
        return Err(d.arg_err());
    }
    Ok(d.val().to_owned())
}

fn integer_arg(d: &mut Dispenser) -> Result<i64, ConfigError> {
    let option = d.val().to_owned();
    if !d.next_arg() {
        return Err(d.arg_err());
    }
    let value: i64 = d.val().parse().map_err(|_| ConfigError::InvalidInteger {
        option,
        token: d.val().to_owned(),
        location: d.location(),
    })?;
    if d.next_arg() {
        return Err(d.unexpected_arg_err());
    }
    Ok(value)
}

fn validate_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEndpoint {
        endpoint: endpoint.to_owned(),
        reason,
    };
    let url = Url::parse(endpoint).map_err(|err| invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme '{other}'"))),
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".into()));
    }
    Ok(())
}

fn ensure_positive(field: &'static str, value: Option<i64>) -> Result<Option<u64>, ConfigError> {
    match value {
        None => Ok(None),
        Some(v) if v > 0 => Ok(u64::try_from(v).ok()),
        Some(v) => Err(ConfigError::NonPositive { field, value: v }),
    }
}

fn timeout_or(
    field: &'static str,
    value: Option<u64>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match value {
        None => Ok(default),
        Some(0) => Err(ConfigError::NonPositive { field, value: 0 }),
        Some(ms) => Ok(Duration::from_millis(ms)),
    }
}
