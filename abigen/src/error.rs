use abigen_types::AbiError;
use thiserror::Error;

/// Fatal generation errors
#[derive(Error, Debug)]
pub enum GenError {
    /* Input ABI could not be loaded */
    #[error("Failed to load ABI for contract '{contract}'")]
    Abi {
        contract: String,
        #[source]
        source: AbiError,
    },

    /* A tuple type was mapped before a struct was synthesized for it */
    #[error("No struct synthesized for tuple shape {shape}")]
    MissingStruct { shape: String },

    /* An ABI type with no Rust representation */
    #[error("Unsupported ABI type '{0}'")]
    UnsupportedType(String),

    /* Two generated symbols would share one name */
    #[error("Generated name '{name}' collides in {scope}")]
    NameCollision { scope: String, name: String },

    /* The emitted source failed to parse */
    #[error("Generated code is not valid Rust: {0}")]
    InvalidOutput(String),

    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

impl GenError {
    pub(crate) fn collision(scope: impl Into<String>, name: impl Into<String>) -> Self {
        GenError::NameCollision {
            scope: scope.into(),
            name: name.into(),
        }
    }
}

pub type Result<T, E = GenError> = std::result::Result<T, E>;
