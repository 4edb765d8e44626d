//! A channel that records every line it receives for later inspection.
//!
//! Shared across unit and integration tests so each test module does not need
//! its own copy of the same boilerplate.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::writer::{SendReport, TransportError, WriterChannel};

/// Scripted behaviour for the next sends.
#[derive(Clone, Debug)]
pub enum Outcome {
    Deliver,
    Fail(TransportError),
    Reject(u16),
}

/// Channel storing every line and replying with scripted outcomes.
///
/// Once the script is exhausted every send is delivered.
#[derive(Clone, Debug, Default)]
pub struct CollectingChannel {
    lines: Arc<Mutex<Vec<Vec<u8>>>>,
    script: Arc<Mutex<Vec<Outcome>>>,
    closed: Arc<Mutex<usize>>,
}

impl CollectingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to the next sends with `outcomes`, in order.
    pub fn scripted(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        let channel = Self::default();
        let mut script: Vec<_> = outcomes.into_iter().collect();
        script.reverse();
        *channel.script.lock() = script;
        channel
    }

    /// Snapshot of every line received so far.
    pub fn collected(&self) -> Vec<Vec<u8>> {
        self.lines.lock().clone()
    }

    /// Number of times `close` was called.
    pub fn close_count(&self) -> usize {
        *self.closed.lock()
    }
}

impl WriterChannel for CollectingChannel {
    fn send(&self, line: &[u8]) -> SendReport {
        let outcome = self.script.lock().pop().unwrap_or(Outcome::Deliver);
        match outcome {
            Outcome::Deliver => {
                self.lines.lock().push(line.to_vec());
                SendReport::delivered(line.len())
            }
            Outcome::Fail(err) => SendReport::failed(err),
            Outcome::Reject(status) => {
                self.lines.lock().push(line.to_vec());
                SendReport::rejected(
                    line.len(),
                    crate::writer::DeliveryRejectedError {
                        status,
                        dump: format!("HTTP/1.1 {status}"),
                    },
                )
            }
        }
    }

    fn close(&self) -> Result<(), TransportError> {
        *self.closed.lock() += 1;
        Ok(())
    }
}
