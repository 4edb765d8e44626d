//! Local fallback for lines a remote writer could not deliver.

use std::{fmt, sync::Arc, time::Duration};

use log::warn;

use crate::{
    rate_limited_warner::{DEFAULT_WARN_INTERVAL, RateLimitedWarner},
    writer::{SendError, SendReport, TransportError, WriterChannel},
};

/// Channel that diverts transport failures to a secondary sink.
///
/// - A [`TransportError`] from the primary sends the same line to the
///   fallback and returns the fallback's report.
/// - A rejection by the endpoint is only reported: the endpoint did receive
///   the line, so it is not duplicated locally. The primary's report is
///   returned unchanged.
///
/// Both cases emit warnings, rate limited per kind.
pub struct FallbackChannel {
    label: String,
    primary: Arc<dyn WriterChannel>,
    fallback: Arc<dyn WriterChannel>,
    diverted: RateLimitedWarner,
    rejected: RateLimitedWarner,
}

impl FallbackChannel {
    /// Wrap `primary`, diverting to `fallback`. `label` names the primary in
    /// warnings.
    pub fn new(
        label: impl Into<String>,
        primary: Arc<dyn WriterChannel>,
        fallback: Arc<dyn WriterChannel>,
    ) -> Self {
        Self::with_warn_interval(label, primary, fallback, DEFAULT_WARN_INTERVAL)
    }

    /// As [`FallbackChannel::new`] with a custom warning interval.
    pub fn with_warn_interval(
        label: impl Into<String>,
        primary: Arc<dyn WriterChannel>,
        fallback: Arc<dyn WriterChannel>,
        interval: Duration,
    ) -> Self {
        Self {
            label: label.into(),
            primary,
            fallback,
            diverted: RateLimitedWarner::new(interval),
            rejected: RateLimitedWarner::new(interval),
        }
    }

    /// Emit any warnings still held back by rate limiting.
    pub fn flush_warnings(&self) {
        let label = &self.label;
        self.diverted.flush(|count| {
            warn!("{label}: {count} line(s) diverted to the fallback writer");
        });
        self.rejected.flush(|count| {
            warn!("{label}: {count} line(s) rejected by the endpoint");
        });
    }

    fn divert(&self, line: &[u8], err: &TransportError) -> SendReport {
        let label = &self.label;
        self.diverted.record_drop();
        self.diverted.warn_if_due(|count| {
            warn!("{label}: {count} line(s) diverted to the fallback writer; last error: {err}");
        });
        let report = self.fallback.send(line);
        if let Some(fallback_err) = report.transport_error() {
            warn!("{label}: fallback writer failed as well: {fallback_err}");
        }
        report
    }
}

impl WriterChannel for FallbackChannel {
    fn send(&self, line: &[u8]) -> SendReport {
        let report = self.primary.send(line);
        let Some(error) = report.error.as_ref() else {
            return report;
        };
        match error {
            SendError::Transport(err) => self.divert(line, err),
            SendError::Rejected(rejection) => {
                let label = &self.label;
                self.rejected.record_drop();
                self.rejected.warn_if_due(|count| {
                    warn!(
                        "{label}: {count} line(s) rejected by the endpoint; last response:\n{}",
                        rejection.dump
                    );
                });
                report
            }
        }
    }

    fn close(&self) -> Result<(), TransportError> {
        self.flush_warnings();
        let primary = self.primary.close();
        let fallback = self.fallback.close();
        primary.and(fallback)
    }
}

impl fmt::Debug for FallbackChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackChannel")
            .field("label", &self.label)
            .field("diverted", &self.diverted.pending())
            .field("rejected", &self.rejected.pending())
            .finish()
    }
}
