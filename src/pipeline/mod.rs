//! Pipeline-side plumbing around writers.
//!
//! A host turns configuration text into writer descriptors through a
//! [`WriterRegistry`], shares one channel per distinct writer through a
//! [`ChannelCache`] and may wrap a remote channel in a [`FallbackChannel`] so
//! lines that cannot be delivered still reach a local sink.

mod cache;
mod fallback;
mod registry;

pub use cache::ChannelCache;
pub use fallback::FallbackChannel;
pub use registry::{WriterFactory, WriterRegistry};
