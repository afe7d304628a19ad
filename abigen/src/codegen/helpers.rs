/* Identifier helpers shared by every generation stage */

use abigen_types::Param;
use heck::{ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use std::collections::BTreeSet;

/* Rust reserved keywords that need to be escaped with r# */
const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use", "where",
    "while", "async", "await", "dyn", "abstract", "become", "box", "do", "final", "macro",
    "override", "priv", "typeof", "unsized", "virtual", "yield", "try", "gen",
];

/* Keywords that cannot be raw identifiers */
const NON_RAW_KEYWORDS: &[&str] = &["self", "Self", "super", "crate"];

/* Type names the generated module must not shadow */
pub const RESERVED_TYPE_NAMES: &[&str] = &[
    "Option", "Result", "Vec", "String", "Box", "Some", "None", "Ok", "Err", "Send", "Sync",
    "Sized", "Copy", "Clone", "Default", "Drop", "Fn", "FnMut", "FnOnce", "Iterator", "Into",
    "From", "ToString", "ToOwned", "PartialEq", "Eq", "PartialOrd", "Ord", "Debug",
];

/* Parameter names used by the emitted wrappers themselves */
pub const RESERVED_PARAM_NAMES: &[&str] =
    &["opts", "sink", "instance", "forward", "backend", "bytecode"];

pub fn escape_ident(name: &str) -> String {
    if NON_RAW_KEYWORDS.contains(&name) {
        format!("{}_", name)
    } else if RUST_KEYWORDS.contains(&name) {
        format!("r#{}", name)
    } else {
        name.to_string()
    }
}

pub fn to_snake(name: &str) -> String {
    name.to_snake_case()
}

pub fn to_pascal(name: &str) -> String {
    name.to_upper_camel_case()
}

pub fn to_upper_snake(name: &str) -> String {
    name.to_shouty_snake_case()
}

/* First free `base`, `base_1`, `base_2`, ... */
pub fn disambiguate(base: &str, taken: &BTreeSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{}_{}", base, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

/* Assign unique snake_case names to a parameter list.
 *
 * Unnamed parameters become `{prefix}{index}`. Every chosen name is added
 * to `taken`, so a later list can be disambiguated against this one. The
 * returned names are keyword-escaped. */
pub fn assign_names(params: &[Param], prefix: &str, taken: &mut BTreeSet<String>) -> Vec<String> {
    params
        .iter()
        .enumerate()
        .map(|(index, param)| {
            let snake = to_snake(&param.name);
            let base = if snake.is_empty() {
                format!("{}{}", prefix, index)
            } else {
                snake
            };
            let name = disambiguate(&base, taken);
            taken.insert(name.clone());
            escape_ident(&name)
        })
        .collect()
}

pub fn reserved_params() -> BTreeSet<String> {
    RESERVED_PARAM_NAMES.iter().map(|name| name.to_string()).collect()
}

/* `struct Pool.Position[]` -> `Position` */
pub fn struct_name_from_internal(internal_type: &str) -> Option<String> {
    let declared = internal_type.strip_prefix("struct ")?;
    let declared = declared.split('[').next().unwrap_or(declared);
    let short = declared.rsplit('.').next().unwrap_or(declared);
    let name = to_pascal(short);
    if name.is_empty() { None } else { Some(escape_ident(&name)) }
}

/* Rust type name for a contract, e.g. `erc20_token` -> `Erc20Token` */
pub fn contract_type_name(name: &str) -> String {
    escape_ident(&to_pascal(name))
}

/* Module name for the generated package */
pub fn sanitize_package(name: &str) -> String {
    let snake = to_snake(name);
    if snake.is_empty() {
        return "bindings".to_string();
    }
    if snake.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("bindings_{}", snake);
    }
    escape_ident(&snake)
}

/* Deploy-function parameter carrying a library address */
pub fn library_param_name(library: &str) -> String {
    format!("{}_address", to_snake(library))
}
