//! Mapping from writer kind names to the factories that parse them.

use std::{collections::HashMap, fmt, sync::Arc};

use log::debug;

use crate::{
    config::{ConfigError, Dispenser, Replacer},
    http_writer::HttpWriterConfig,
    stream_writer::{StreamTarget, StreamWriter},
    writer::WriterOpener,
};

/// Parses one writer block and provisions the resulting descriptor.
///
/// The dispenser is positioned before the block's first token, the kind name.
pub type WriterFactory = Box<
    dyn Fn(&mut Dispenser, &Replacer) -> Result<Arc<dyn WriterOpener>, ConfigError> + Send + Sync,
>;

/// Registry of writer kinds available to a pipeline.
#[derive(Default)]
pub struct WriterRegistry {
    factories: HashMap<String, WriterFactory>,
}

impl WriterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the `http`, `stderr` and `stdout` kinds.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register("http", |d, replacer| {
            let writer = HttpWriterConfig::from_directives(d)?.provision(replacer)?;
            Ok(Arc::new(writer) as Arc<dyn WriterOpener>)
        });
        registry.register("stderr", |d, _| {
            let writer = StreamWriter::from_directives(d, StreamTarget::Stderr)?;
            Ok(Arc::new(writer) as Arc<dyn WriterOpener>)
        });
        registry.register("stdout", |d, _| {
            let writer = StreamWriter::from_directives(d, StreamTarget::Stdout)?;
            Ok(Arc::new(writer) as Arc<dyn WriterOpener>)
        });
        registry
    }

    /// Register `factory` under `kind`, replacing any previous factory.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&mut Dispenser, &Replacer) -> Result<Arc<dyn WriterOpener>, ConfigError>
            + Send
            + Sync
            + 'static,
    {
        let kind = kind.into();
        debug!("WriterRegistry: registered writer kind '{kind}'");
        self.factories.insert(kind, Box::new(factory));
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered kind names in sorted order.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<_> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Parse a single writer block. The block's first token selects the kind.
    pub fn parse_writer(
        &self,
        mut segment: Dispenser,
        replacer: &Replacer,
    ) -> Result<Arc<dyn WriterOpener>, ConfigError> {
        let mut head = segment.clone();
        if !head.next() {
            return Err(head.arg_err());
        }
        let factory = self
            .factories
            .get(head.val())
            .ok_or_else(|| ConfigError::UnknownWriter {
                token: head.val().to_owned(),
                location: head.location(),
            })?;
        factory(&mut segment, replacer)
    }

    /// Parse every top-level writer block in `text`.
    ///
    /// Fails on the first block that does not parse or provision.
    pub fn parse_writers(
        &self,
        source: &str,
        text: &str,
        replacer: &Replacer,
    ) -> Result<Vec<Arc<dyn WriterOpener>>, ConfigError> {
        let mut dispenser = Dispenser::new(source, text)?;
        let mut writers = Vec::new();
        while let Some(segment) = dispenser.next_segment() {
            let writer = self.parse_writer(segment, replacer)?;
            debug!("WriterRegistry: parsed writer {writer}");
            writers.push(writer);
        }
        Ok(writers)
    }
}

impl fmt::Debug for WriterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
