//! Builder for [`StreamWriter`].
//!
//! Stream writers take no options beyond their target; the builder exists so
//! they can be assembled next to HTTP writers through [`WriterBuilderTrait`].

use std::sync::Arc;

use crate::{
    config::Replacer,
    stream_writer::{StreamTarget, StreamWriter},
    writer::WriterOpener,
};

use super::{BuildError, WriterBuilderTrait};

/// Builder for constructing [`StreamWriter`] instances.
#[derive(Clone, Copy, Debug)]
pub struct StreamWriterBuilder {
    target: StreamTarget,
}

impl StreamWriterBuilder {
    /// Create a builder targeting `stdout`.
    pub fn stdout() -> Self {
        Self {
            target: StreamTarget::Stdout,
        }
    }

    /// Create a builder targeting `stderr`.
    pub fn stderr() -> Self {
        Self {
            target: StreamTarget::Stderr,
        }
    }

    pub fn build(&self) -> StreamWriter {
        match self.target {
            StreamTarget::Stdout => StreamWriter::stdout(),
            StreamTarget::Stderr => StreamWriter::stderr(),
        }
    }
}

impl Default for StreamWriterBuilder {
    fn default() -> Self {
        Self::stderr()
    }
}

impl WriterBuilderTrait for StreamWriterBuilder {
    fn build_opener(&self, _replacer: &Replacer) -> Result<Arc<dyn WriterOpener>, BuildError> {
        Ok(Arc::new(self.build()))
    }
}
