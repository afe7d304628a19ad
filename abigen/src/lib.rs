//! Contract binding generator
//!
//! Turns one or more contract ABIs (plus optional bytecode and library link
//! references) into a single Rust module of typed bindings on top of
//! `abigen_runtime`. Generation is a pure function of its inputs: the same
//! contracts always render byte-identical source.
//!
//! The pipeline runs in fixed order: tuple structs are synthesized for the
//! whole unit, declarations are normalized per contract, and the emitter
//! renders every section against the finished struct table.

pub mod bind;
pub mod codegen;
pub mod error;
pub mod model;

pub use bind::{BindOptions, ContractInput, bind, build_unit};
pub use error::{GenError, Result};
pub use model::GenerationUnit;
