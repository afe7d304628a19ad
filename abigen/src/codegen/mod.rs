pub mod emit;
pub mod helpers;
pub mod normalize;
pub mod structs;
pub mod types;
pub mod watcher;

use crate::error::{GenError, Result};
use crate::model::GenerationUnit;
use tracing::debug;

/* Banner placed above every generated module */
pub const HEADER: &str = "// Code generated - DO NOT EDIT.\n\
// This file is a generated binding and any manual changes will be lost.\n\n";

/* Render a unit to Rust source.
 *
 * The emitted text is always parsed with syn; with `format` set it is
 * printed back through prettyplease. The banner is added last since the
 * printer keeps doc comments but drops line comments. */
pub fn render(unit: &GenerationUnit, format: bool) -> Result<String> {
    let source = emit::emit_unit(unit)?;
    let file =
        syn::parse_file(&source).map_err(|err| GenError::InvalidOutput(err.to_string()))?;
    debug!(bytes = source.len(), items = file.items.len(), "generated bindings parsed");

    let body = if format {
        prettyplease::unparse(&file)
    } else {
        source
    };
    Ok(format!("{}{}", HEADER, body))
}
