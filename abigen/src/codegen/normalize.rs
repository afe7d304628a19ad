/* Method and event normalization
 *
 * Produces the Rust-facing names for a declaration. Parameter names are
 * snake_case, keyword-escaped and unique within the generated signature;
 * outputs are made unique against the inputs as well. */

use crate::codegen::helpers::{
    assign_names, disambiguate, escape_ident, library_param_name, reserved_params, to_pascal,
    to_snake,
};
use crate::error::{GenError, Result};
use crate::model::{ContractSpec, EntryKind, EventSpec, MethodSpec};
use abigen_types::{Event, Function, Param};
use std::collections::{BTreeMap, BTreeSet};

/* Normalize a function (or constructor/fallback/receive stand-in).
 * `extra_reserved` lists parameter names already used by the wrapper. */
pub fn normalize_method(function: &Function, extra_reserved: &[String]) -> MethodSpec {
    let mut taken = reserved_params();
    taken.extend(extra_reserved.iter().cloned());

    let inputs = rename(&function.inputs, "arg", &mut taken);
    let outputs = rename(&function.outputs, "ret", &mut taken);

    let normalized = Function {
        name: method_name(function),
        raw_name: function.raw_name.clone(),
        inputs,
        outputs,
        state_mutability: function.state_mutability,
    };

    MethodSpec {
        original: function.clone(),
        normalized,
        structured: function.outputs.len() > 1,
    }
}

pub fn normalize_event(event: &Event) -> EventSpec {
    let mut taken = reserved_params();
    let inputs = rename(&event.inputs, "arg", &mut taken);

    let accessor = match to_snake(&event.name) {
        snake if snake.is_empty() => "unnamed".to_string(),
        snake => snake,
    };

    let normalized = Event {
        name: escape_ident(&to_pascal(&event.name)),
        raw_name: event.raw_name.clone(),
        inputs,
        anonymous: event.anonymous,
    };

    EventSpec {
        original: event.clone(),
        normalized,
        accessor,
    }
}

/* Deploy parameters carrying library addresses, as (link pattern, name) */
pub fn library_params(libraries: &BTreeMap<String, String>) -> Vec<(String, String)> {
    let mut taken = reserved_params();
    libraries
        .iter()
        .map(|(pattern, library)| {
            let param = disambiguate(&library_param_name(library), &taken);
            taken.insert(param.clone());
            (pattern.clone(), param)
        })
        .collect()
}

/* Two entry points with one name cannot coexist on a binding type */
pub fn check_entry_points(contract: &ContractSpec) -> Result<()> {
    let mut seen: BTreeMap<String, EntryKind> = BTreeMap::new();
    for (name, kind) in contract.entry_points() {
        if let Some(previous) = seen.insert(name.clone(), kind) {
            tracing::debug!(?previous, ?kind, %name, "entry point collision");
            return Err(GenError::collision(&contract.type_name, name));
        }
    }
    Ok(())
}

fn method_name(function: &Function) -> String {
    let snake = to_snake(&function.name);
    if snake.is_empty() {
        format!("func_{}", function.selector_hex())
    } else {
        escape_ident(&snake)
    }
}

fn rename(params: &[Param], prefix: &str, taken: &mut BTreeSet<String>) -> Vec<Param> {
    let names = assign_names(params, prefix, taken);
    params
        .iter()
        .zip(names)
        .map(|(param, name)| Param {
            name,
            ..param.clone()
        })
        .collect()
}
