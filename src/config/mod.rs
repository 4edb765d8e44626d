//! Configuration front-ends shared by every writer kind.
//!
//! [`directive`] tokenises the block-structured writer syntax and hands out
//! tokens through a [`Dispenser`]. [`placeholder`] resolves `{name}`
//! placeholders in configured values before they are validated.

pub mod directive;
pub mod placeholder;
mod types;

pub use directive::{Dispenser, Location, Token};
pub use placeholder::{PlaceholderError, Replacer};
pub use types::ConfigError;
