//! Contract ABI Definitions
//!
//! This crate contains the declaration model consumed by the binding
//! generator: typed parameters, functions, events and the special
//! constructor/fallback/receive entries. It also knows how to load the
//! standard JSON ABI format and how to derive selectors and library link
//! patterns. It carries no code generation logic.

pub mod error;
pub mod json;
pub mod types;

// Re-export commonly used types at the crate root
pub use error::*;
pub use json::*;
pub use types::*;
