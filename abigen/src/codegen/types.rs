/* ABI type -> Rust type mapping */

use crate::error::{GenError, Result};
use crate::model::StructTable;
use abigen_types::{AbiType, Param};

/* Structural key of a tuple: ordered `(name:type)` pairs, nested tuples inlined */
pub fn shape_key(components: &[Param]) -> String {
    let parts: Vec<String> = components
        .iter()
        .map(|component| format!("{}:{}", component.name, type_key(&component.ty)))
        .collect();
    format!("({})", parts.join(","))
}

fn type_key(ty: &AbiType) -> String {
    match ty {
        AbiType::Tuple(components) => shape_key(components),
        AbiType::Array(inner, len) => format!("{}[{}]", type_key(inner), len),
        AbiType::Slice(inner) => format!("{}[]", type_key(inner)),
        other => other.to_string(),
    }
}

/* Map one ABI type to the Rust type used in generated signatures.
 * Tuples resolve to their synthesized struct and are never inlined. */
pub fn map_type(ty: &AbiType, structs: &StructTable) -> Result<String> {
    let mapped = match ty {
        AbiType::Uint(bits @ (8 | 16 | 32 | 64 | 128)) => format!("u{}", bits),
        AbiType::Uint(_) => "rt::U256".to_string(),
        AbiType::Int(bits @ (8 | 16 | 32 | 64 | 128)) => format!("i{}", bits),
        AbiType::Int(_) => "rt::I256".to_string(),
        AbiType::Bool => "bool".to_string(),
        AbiType::Address => "rt::Address".to_string(),
        AbiType::FixedBytes(size) => format!("rt::FixedBytes<{}>", size),
        AbiType::Bytes => "rt::Bytes".to_string(),
        AbiType::String => "String".to_string(),
        AbiType::Function => "rt::FixedBytes<24>".to_string(),
        AbiType::Fixed { .. } => return Err(GenError::UnsupportedType(ty.to_string())),
        AbiType::Array(inner, len) => format!("[{}; {}]", map_type(inner, structs)?, len),
        AbiType::Slice(inner) => format!("Vec<{}>", map_type(inner, structs)?),
        AbiType::Tuple(components) => {
            let shape = shape_key(components);
            match structs.get(&shape) {
                Some(spec) => spec.name.clone(),
                None => return Err(GenError::MissingStruct { shape }),
            }
        }
    };
    Ok(mapped)
}

/* Event record fields: indexed dynamic values only exist as their topic hash */
pub fn map_event_field_type(param: &Param, structs: &StructTable) -> Result<String> {
    if param.indexed && param.ty.is_hashed_in_topic() {
        Ok("rt::B256".to_string())
    } else {
        map_type(&param.ty, structs)
    }
}
