use thiserror::Error;

/// Errors raised while loading an ABI document.
#[derive(Error, Debug)]
pub enum AbiError {
    /// The document is not valid JSON or does not have the ABI shape
    #[error("Malformed ABI JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A declaration carries a `type` tag we do not know
    #[error("Unknown declaration kind '{0}'")]
    UnknownKind(String),

    /// A parameter type string could not be parsed
    #[error("Unknown ABI type '{0}'")]
    UnknownType(String),

    /// A tuple type was declared without components
    #[error("Tuple parameter '{0}' has no components")]
    MissingComponents(String),

    /// A state mutability string we do not know
    #[error("Unknown state mutability '{0}'")]
    UnknownMutability(String),
}

pub type Result<T, E = AbiError> = std::result::Result<T, E>;
