//! Payload extraction for formatted log lines.
//!
//! The upstream formatter emits one record per line, terminated by `\n`, with
//! five tab-separated fields: timestamp, level, logger name, log type and the
//! application payload. Only the payload is forwarded. Lines that do not
//! match that layout are forwarded verbatim.
//!
//! Extraction is purely positional. A payload containing tab bytes changes the
//! field count and therefore falls back to the whole line.

/// Byte terminating each record.
pub const RECORD_DELIMITER: u8 = b'\n';
/// Byte separating structured fields.
pub const FIELD_SEPARATOR: u8 = b'\t';
/// Number of fields in the structured layout.
pub const STRUCTURED_FIELD_COUNT: usize = 5;

/// Remove a single trailing record delimiter, if present.
pub fn strip_record_delimiter(line: &[u8]) -> &[u8] {
    line.strip_suffix(&[RECORD_DELIMITER]).unwrap_or(line)
}

/// Return the bytes to use as the request body for `line`.
pub fn extract_payload(line: &[u8]) -> &[u8] {
    let stripped = strip_record_delimiter(line);
    StructuredLine::parse(stripped).map_or(stripped, |fields| fields.payload)
}

/// Borrowed view of a line in the five-field layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuredLine<'a> {
    pub timestamp: &'a [u8],
    pub level: &'a [u8],
    pub logger: &'a [u8],
    pub log_type: &'a [u8],
    pub payload: &'a [u8],
}

impl<'a> StructuredLine<'a> {
    /// Split `line` into its five fields.
    ///
    /// Returns `None` unless the line splits into exactly
    /// [`STRUCTURED_FIELD_COUNT`] fields. The record delimiter is not
    /// stripped here.
    pub fn parse(line: &'a [u8]) -> Option<Self> {
        let mut fields = line.split(|b| *b == FIELD_SEPARATOR);
        let parsed = Self {
            timestamp: fields.next()?,
            level: fields.next()?,
            logger: fields.next()?,
            log_type: fields.next()?,
            payload: fields.next()?,
        };
        match fields.next() {
            Some(_) => None,
            None => Some(parsed),
        }
    }
}
