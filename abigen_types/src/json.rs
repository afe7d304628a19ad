/* Loader for the standard Solidity JSON ABI format */

use crate::error::{AbiError, Result};
use crate::types::{
    Abi, AbiType, Constructor, Event, Fallback, Function, Param, Receive, StateMutability,
};
use serde::Deserialize;
use std::collections::BTreeSet;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    #[serde(rename = "type", default = "default_entry_kind")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<RawParam>,
    #[serde(default)]
    outputs: Vec<RawParam>,
    #[serde(default)]
    state_mutability: Option<String>,
    /* Pre-0.5 compilers only emit these two flags */
    #[serde(default)]
    constant: Option<bool>,
    #[serde(default)]
    payable: Option<bool>,
    #[serde(default)]
    anonymous: bool,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    components: Vec<RawParam>,
    #[serde(default)]
    indexed: bool,
    #[serde(default)]
    internal_type: Option<String>,
}

fn default_entry_kind() -> String {
    "function".to_string()
}

impl Abi {
    /// Parses a JSON ABI array. Overloaded functions and events receive
    /// unique names (`foo`, `foo0`, `foo1`, ...) in declaration order.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<RawEntry> = serde_json::from_str(json)?;
        let mut abi = Abi::default();
        let mut function_names = BTreeSet::new();
        let mut event_names = BTreeSet::new();

        for entry in entries {
            match entry.kind.as_str() {
                "function" => {
                    let name = overloaded_name(&entry.name, &mut function_names);
                    abi.functions.push(Function {
                        name,
                        state_mutability: mutability(&entry)?,
                        inputs: parse_params(&entry.inputs)?,
                        outputs: parse_params(&entry.outputs)?,
                        raw_name: entry.name,
                    });
                }
                "event" => {
                    let name = overloaded_name(&entry.name, &mut event_names);
                    abi.events.push(Event {
                        name,
                        inputs: parse_params(&entry.inputs)?,
                        anonymous: entry.anonymous,
                        raw_name: entry.name,
                    });
                }
                "constructor" => {
                    abi.constructor = Some(Constructor {
                        inputs: parse_params(&entry.inputs)?,
                        state_mutability: mutability(&entry)?,
                    });
                }
                "fallback" => {
                    abi.fallback = Some(Fallback {
                        state_mutability: mutability(&entry)?,
                    });
                }
                "receive" => {
                    abi.receive = Some(Receive {
                        state_mutability: StateMutability::Payable,
                    });
                }
                /* Custom errors have no binding surface */
                "error" => {}
                other => return Err(AbiError::UnknownKind(other.to_string())),
            }
        }

        Ok(abi)
    }
}

fn overloaded_name(raw: &str, taken: &mut BTreeSet<String>) -> String {
    let mut name = raw.to_string();
    let mut index = 0;
    while taken.contains(&name) {
        name = format!("{raw}{index}");
        index += 1;
    }
    taken.insert(name.clone());
    name
}

fn mutability(entry: &RawEntry) -> Result<StateMutability> {
    if let Some(value) = &entry.state_mutability {
        return match value.as_str() {
            "pure" => Ok(StateMutability::Pure),
            "view" => Ok(StateMutability::View),
            "nonpayable" => Ok(StateMutability::NonPayable),
            "payable" => Ok(StateMutability::Payable),
            other => Err(AbiError::UnknownMutability(other.to_string())),
        };
    }
    if entry.constant == Some(true) {
        Ok(StateMutability::View)
    } else if entry.payable == Some(true) {
        Ok(StateMutability::Payable)
    } else {
        Ok(StateMutability::NonPayable)
    }
}

fn parse_params(raw: &[RawParam]) -> Result<Vec<Param>> {
    raw.iter().map(parse_param).collect()
}

fn parse_param(raw: &RawParam) -> Result<Param> {
    Ok(Param {
        name: raw.name.clone(),
        ty: parse_type(&raw.ty, &raw.components, &raw.name)?,
        indexed: raw.indexed,
        internal_type: raw.internal_type.clone(),
    })
}

/// Parses a type string such as `uint256`, `bytes32[4][]` or `tuple[]`.
/// `components` is only consulted for tuple bases.
fn parse_type(ty: &str, components: &[RawParam], owner: &str) -> Result<AbiType> {
    if let Some(stripped) = ty.strip_suffix(']') {
        let open = stripped
            .rfind('[')
            .ok_or_else(|| AbiError::UnknownType(ty.to_string()))?;
        let inner = parse_type(&stripped[..open], components, owner)?;
        let dimension = &stripped[open + 1..];
        if dimension.is_empty() {
            return Ok(AbiType::Slice(Box::new(inner)));
        }
        let len = dimension
            .parse::<usize>()
            .map_err(|_| AbiError::UnknownType(ty.to_string()))?;
        return Ok(AbiType::Array(Box::new(inner), len));
    }

    match ty {
        "tuple" => {
            if components.is_empty() {
                return Err(AbiError::MissingComponents(owner.to_string()));
            }
            Ok(AbiType::Tuple(parse_params(components)?))
        }
        "address" => Ok(AbiType::Address),
        "bool" => Ok(AbiType::Bool),
        "string" => Ok(AbiType::String),
        "bytes" => Ok(AbiType::Bytes),
        "function" => Ok(AbiType::Function),
        "uint" => Ok(AbiType::Uint(256)),
        "int" => Ok(AbiType::Int(256)),
        "fixed" | "ufixed" => Ok(AbiType::Fixed {
            signed: ty == "fixed",
            bits: 128,
            decimals: 18,
        }),
        _ => parse_sized(ty).ok_or_else(|| AbiError::UnknownType(ty.to_string())),
    }
}

fn parse_sized(ty: &str) -> Option<AbiType> {
    if let Some(bits) = ty.strip_prefix("uint") {
        return integer_bits(bits).map(AbiType::Uint);
    }
    if let Some(bits) = ty.strip_prefix("int") {
        return integer_bits(bits).map(AbiType::Int);
    }
    if let Some(size) = ty.strip_prefix("bytes") {
        let size = size.parse::<usize>().ok()?;
        return (1..=32).contains(&size).then_some(AbiType::FixedBytes(size));
    }
    let (signed, rest) = if let Some(rest) = ty.strip_prefix("ufixed") {
        (false, rest)
    } else {
        (true, ty.strip_prefix("fixed")?)
    };
    let (bits, decimals) = rest.split_once('x')?;
    Some(AbiType::Fixed {
        signed,
        bits: integer_bits(bits)?,
        decimals: decimals.parse::<usize>().ok().filter(|d| *d <= 80)?,
    })
}

fn integer_bits(bits: &str) -> Option<usize> {
    let bits = bits.parse::<usize>().ok()?;
    (bits > 0 && bits <= 256 && bits % 8 == 0).then_some(bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    const POOL_ABI: &str = r#"[
        {"type":"constructor","inputs":[{"name":"owner","type":"address"}],"stateMutability":"nonpayable"},
        {"type":"function","name":"swap","inputs":[{"name":"amount","type":"uint256"}],"outputs":[],"stateMutability":"nonpayable"},
        {"type":"function","name":"swap","inputs":[{"name":"amount","type":"uint256"},{"name":"to","type":"address"}],"outputs":[],"stateMutability":"payable"},
        {"type":"function","name":"positions","constant":true,"inputs":[],"outputs":[
            {"name":"","type":"tuple[]","internalType":"struct Pool.Position[]","components":[
                {"name":"owner","type":"address"},
                {"name":"liquidity","type":"uint128"}
            ]}
        ]},
        {"type":"event","name":"Swap","anonymous":false,"inputs":[
            {"name":"sender","type":"address","indexed":true},
            {"name":"amount","type":"int256","indexed":false}
        ]},
        {"type":"error","name":"Unauthorized","inputs":[]},
        {"type":"fallback","stateMutability":"payable"},
        {"type":"receive","stateMutability":"payable"}
    ]"#;

    #[test]
    fn loads_every_declaration_kind() {
        let abi = Abi::from_json(POOL_ABI).expect("parse");
        assert_eq!(abi.constructor.as_ref().map(|c| c.inputs.len()), Some(1));
        assert_eq!(abi.functions.len(), 3);
        assert_eq!(abi.events.len(), 1);
        assert!(abi.fallback.is_some());
        assert!(abi.receive.is_some());
    }

    #[test]
    fn overloads_get_unique_names() {
        let abi = Abi::from_json(POOL_ABI).expect("parse");
        let names: Vec<&str> = abi.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["swap", "swap0", "positions"]);
        assert_eq!(abi.functions[1].raw_name, "swap");
        assert_eq!(abi.functions[1].signature(), "swap(uint256,address)");
    }

    #[test]
    fn legacy_constant_flag_means_view() {
        let abi = Abi::from_json(POOL_ABI).expect("parse");
        assert_eq!(abi.functions[2].state_mutability, StateMutability::View);
    }

    #[test]
    fn tuple_slices_keep_components() {
        let abi = Abi::from_json(POOL_ABI).expect("parse");
        let output = &abi.functions[2].outputs[0];
        assert_eq!(output.ty.to_string(), "(address,uint128)[]");
        assert_eq!(
            output.internal_type.as_deref(),
            Some("struct Pool.Position[]")
        );
        match &output.ty {
            AbiType::Slice(inner) => match inner.as_ref() {
                AbiType::Tuple(components) => assert_eq!(components[1].name, "liquidity"),
                other => panic!("expected tuple, got {other:?}"),
            },
            other => panic!("expected slice, got {other:?}"),
        }
    }

    #[test]
    fn parses_nested_dimensions() {
        let ty = parse_type("bytes32[4][]", &[], "x").expect("parse");
        assert_eq!(
            ty,
            AbiType::Slice(Box::new(AbiType::Array(
                Box::new(AbiType::FixedBytes(32)),
                4
            )))
        );
    }

    #[test]
    fn parses_fixed_point() {
        let ty = parse_type("ufixed64x10", &[], "x").expect("parse");
        assert_eq!(
            ty,
            AbiType::Fixed {
                signed: false,
                bits: 64,
                decimals: 10
            }
        );
    }

    #[test]
    fn rejects_garbage_types() {
        for bad in ["uint7", "bytes33", "int512", "mapping", "uint256[x]"] {
            assert!(
                matches!(parse_type(bad, &[], "x"), Err(AbiError::UnknownType(_))),
                "should reject {bad}"
            );
        }
    }

    #[test]
    fn rejects_tuple_without_components() {
        let json = r#"[{"type":"function","name":"f","inputs":[{"name":"p","type":"tuple"}],"outputs":[]}]"#;
        assert!(matches!(
            Abi::from_json(json),
            Err(AbiError::MissingComponents(name)) if name == "p"
        ));
    }
}
