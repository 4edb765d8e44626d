//! Writer builders and associated traits.
//!
//! Provides a fluent API for constructing writers from Rust code without
//! going through the directive syntax. Each builder implements
//! [`WriterBuilderTrait`] which returns a shared [`WriterOpener`] ready to be
//! handed to a pipeline.

use std::sync::Arc;

use thiserror::Error;

use crate::{
    config::{ConfigError, Replacer},
    writer::WriterOpener,
};

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

pub(crate) use option_setter;

pub mod http_builder;
pub mod stream_builder;

pub use http_builder::HttpWriterBuilder;
pub use stream_builder::StreamWriterBuilder;

/// Errors that may occur while building a writer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Invalid user supplied configuration caught by the builder itself.
    #[error("invalid writer configuration: {0}")]
    InvalidConfig(String),
    /// The assembled configuration failed to provision.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Trait implemented by all writer builders.
pub trait WriterBuilderTrait: Send + Sync {
    /// Build the writer, resolving placeholders through `replacer`.
    fn build_opener(&self, replacer: &Replacer) -> Result<Arc<dyn WriterOpener>, BuildError>;
}
