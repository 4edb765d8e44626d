//! Writers that copy log lines to the process's standard streams.
//!
//! Used as the local sink behind [`FallbackChannel`](crate::pipeline::FallbackChannel)
//! and as the `stderr` / `stdout` writer kinds.

use std::{
    fmt,
    io::{self, Write},
    sync::Arc,
};

use parking_lot::Mutex;

use crate::{
    config::{ConfigError, Dispenser},
    writer::{SendReport, TransportError, WriterChannel, WriterOpener},
};

/// Standard stream a [`StreamWriter`] targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamTarget {
    Stdout,
    Stderr,
}

impl StreamTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamTarget::Stdout => "stdout",
            StreamTarget::Stderr => "stderr",
        }
    }
}

/// Writer descriptor for a standard stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamWriter {
    target: StreamTarget,
}

impl StreamWriter {
    pub fn stdout() -> Self {
        Self {
            target: StreamTarget::Stdout,
        }
    }

    pub fn stderr() -> Self {
        Self {
            target: StreamTarget::Stderr,
        }
    }

    pub fn target(&self) -> StreamTarget {
        self.target
    }

    /// Parse a `stderr` or `stdout` directive. Neither takes arguments or a
    /// block.
    pub fn from_directives(d: &mut Dispenser, target: StreamTarget) -> Result<Self, ConfigError> {
        while d.next() {
            if d.next_arg() {
                return Err(d.unexpected_arg_err());
            }
            let nesting = d.nesting();
            if d.next_block(nesting) {
                return Err(d.unrecognized_err());
            }
        }
        Ok(Self { target })
    }
}

impl fmt::Display for StreamWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.target.as_str())
    }
}

impl WriterOpener for StreamWriter {
    fn writer_key(&self) -> String {
        format!("std:{}", self.target.as_str())
    }

    fn open_writer(self: Arc<Self>) -> Result<Arc<dyn WriterChannel>, TransportError> {
        let channel = match self.target {
            StreamTarget::Stdout => StreamChannel::new(io::stdout(), "stdout"),
            StreamTarget::Stderr => StreamChannel::new(io::stderr(), "stderr"),
        };
        Ok(Arc::new(channel))
    }
}

/// Channel writing each line verbatim to an `io::Write` sink.
///
/// Writes are serialised through a mutex so concurrent lines never
/// interleave.
pub struct StreamChannel {
    label: &'static str,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl StreamChannel {
    /// Wrap an arbitrary writer. `label` names it in errors.
    pub fn new<W>(sink: W, label: &'static str) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            label,
            sink: Mutex::new(Box::new(sink)),
        }
    }
}

impl WriterChannel for StreamChannel {
    fn send(&self, line: &[u8]) -> SendReport {
        let mut sink = self.sink.lock();
        match sink.write_all(line).and_then(|()| sink.flush()) {
            Ok(()) => SendReport::delivered(line.len()),
            Err(err) => {
                SendReport::failed(TransportError::Stream(format!("{}: {err}", self.label)))
            }
        }
    }

    fn close(&self) -> Result<(), TransportError> {
        self.sink
            .lock()
            .flush()
            .map_err(|err| TransportError::Stream(format!("{}: {err}", self.label)))
    }
}

impl fmt::Debug for StreamChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamChannel")
            .field("label", &self.label)
            .finish()
    }
}
