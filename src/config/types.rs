//! Errors raised while parsing or validating writer configuration.

use thiserror::Error;

use super::{directive::Location, placeholder::PlaceholderError};

/// Errors that may occur while parsing or provisioning a writer.
///
/// Every variant is fatal to the writer it describes: a pipeline must refuse
/// to start with a configuration that produced one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A directive expected another argument on the same line.
    #[error("{location}: wrong argument count or unexpected line ending after '{token}'")]
    MissingArgument { token: String, location: Location },
    /// A directive received more arguments than it accepts.
    #[error("{location}: unexpected argument '{token}'")]
    UnexpectedArgument { token: String, location: Location },
    /// A block contained an option the writer does not understand.
    #[error("{location}: unrecognized directive '{token}'")]
    UnrecognizedDirective { token: String, location: Location },
    /// An integer option received a value that is not an integer.
    #[error("{location}: invalid int for '{option}': {token}")]
    InvalidInteger {
        option: String,
        token: String,
        location: Location,
    },
    /// The token stream is malformed (unterminated quote, unbalanced brace).
    #[error("{location}: {message}")]
    Syntax { message: String, location: Location },
    /// No writer factory is registered under this name.
    #[error("{location}: unknown writer kind '{token}'")]
    UnknownWriter { token: String, location: Location },
    /// A placeholder in a configured value could not be resolved.
    #[error("cannot resolve '{template}': {reason}")]
    Placeholder {
        template: String,
        #[source]
        reason: PlaceholderError,
    },
    /// The resolved endpoint is not a usable absolute URL.
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    /// The JSON form of a configuration could not be deserialised.
    #[error("invalid JSON configuration: {0}")]
    Json(String),
    /// A numeric option must be strictly positive.
    #[error("{field} must be greater than zero (got {value})")]
    NonPositive { field: &'static str, value: i64 },
}
