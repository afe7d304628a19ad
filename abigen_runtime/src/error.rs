//! Error types for generated bindings

use thiserror::Error;

/// Errors surfaced by generated bindings and the subscription machinery
#[derive(Error, Debug)]
pub enum BindError {
    /// The backend rejected or failed an operation
    #[error("Backend error: {0}")]
    Backend(String),

    /// A token did not have the shape the binding expected
    #[error("Cannot decode {expected} from {found}")]
    Decode {
        /// The Rust-side type being decoded
        expected: &'static str,
        /// What was actually found
        found: String,
    },

    /// A token sequence had the wrong number of values
    #[error("Expected {expected} values, found {found}")]
    Arity { expected: usize, found: usize },

    /// The underlying log subscription failed
    #[error("Subscription error: {0}")]
    Subscription(String),

    /// A subscription producer stopped without reporting an outcome
    #[error("Subscription producer terminated unexpectedly")]
    ProducerGone,

    /// The consumer dropped the receiving half of the sink
    #[error("Event sink closed")]
    SinkClosed,

    /// Bytecode references a library placeholder that was not found
    #[error("Library placeholder {pattern} not present in bytecode")]
    Link { pattern: String },

    /// Deployment bytecode is not valid hex
    #[error("Invalid bytecode: {0}")]
    Bytecode(String),
}

impl BindError {
    pub(crate) fn decode(expected: &'static str, found: impl Into<String>) -> Self {
        BindError::Decode {
            expected,
            found: found.into(),
        }
    }
}

/// Result type alias for convenience
pub type Result<T, E = BindError> = std::result::Result<T, E>;
