use alloy_primitives::keccak256;
use serde::Serialize;
use std::fmt;

#[derive(Serialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub enum AbiType {
    Uint(usize),
    Int(usize),
    Bool,
    Address,
    FixedBytes(usize),
    Bytes,
    String,
    /// 24-byte address + selector pair
    Function,
    /// Declared by the ABI grammar but without any binding representation
    Fixed {
        signed: bool,
        bits: usize,
        decimals: usize,
    },
    Array(Box<AbiType>, usize),
    Slice(Box<AbiType>),
    Tuple(Vec<Param>),
}

impl AbiType {
    /// Types whose indexed event topic holds a hash instead of the value.
    pub fn is_hashed_in_topic(&self) -> bool {
        matches!(
            self,
            AbiType::Bytes
                | AbiType::String
                | AbiType::Array(..)
                | AbiType::Slice(_)
                | AbiType::Tuple(_)
        )
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Uint(bits) => write!(f, "uint{bits}"),
            AbiType::Int(bits) => write!(f, "int{bits}"),
            AbiType::Bool => f.write_str("bool"),
            AbiType::Address => f.write_str("address"),
            AbiType::FixedBytes(size) => write!(f, "bytes{size}"),
            AbiType::Bytes => f.write_str("bytes"),
            AbiType::String => f.write_str("string"),
            AbiType::Function => f.write_str("function"),
            AbiType::Fixed {
                signed,
                bits,
                decimals,
            } => {
                let prefix = if *signed { "fixed" } else { "ufixed" };
                write!(f, "{prefix}{bits}x{decimals}")
            }
            AbiType::Array(inner, len) => write!(f, "{inner}[{len}]"),
            AbiType::Slice(inner) => write!(f, "{inner}[]"),
            AbiType::Tuple(components) => {
                f.write_str("(")?;
                for (i, component) in components.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", component.ty)?;
                }
                f.write_str(")")
            }
        }
    }
}

#[derive(Serialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: AbiType,
    pub indexed: bool,
    /// Solidity-level type name, e.g. `struct Pool.Position[]`
    pub internal_type: Option<String>,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: AbiType) -> Self {
        Self {
            name: name.into(),
            ty,
            indexed: false,
            internal_type: None,
        }
    }

    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }
}

#[derive(Serialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StateMutability {
    Pure,
    View,
    #[default]
    NonPayable,
    Payable,
}

impl StateMutability {
    pub fn is_read_only(self) -> bool {
        matches!(self, StateMutability::Pure | StateMutability::View)
    }
}

#[derive(Serialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Function {
    /// Unique name inside the ABI (`transfer`, `transfer0`, ...)
    pub name: String,
    /// Name as declared in Solidity
    pub raw_name: String,
    pub inputs: Vec<Param>,
    pub outputs: Vec<Param>,
    pub state_mutability: StateMutability,
}

impl Function {
    /// Canonical signature, e.g. `transfer(address,uint256)`.
    pub fn signature(&self) -> String {
        canonical_signature(&self.raw_name, &self.inputs)
    }

    /// First four bytes of the keccak-256 hash of the signature.
    pub fn selector(&self) -> [u8; 4] {
        let hash = keccak256(self.signature().as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    pub fn selector_hex(&self) -> String {
        hex::encode(self.selector())
    }
}

#[derive(Serialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Event {
    pub name: String,
    pub raw_name: String,
    pub inputs: Vec<Param>,
    pub anonymous: bool,
}

impl Event {
    pub fn signature(&self) -> String {
        canonical_signature(&self.raw_name, &self.inputs)
    }

    pub fn indexed_inputs(&self) -> impl Iterator<Item = &Param> {
        self.inputs.iter().filter(|input| input.indexed)
    }
}

#[derive(Serialize, Debug, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct Constructor {
    pub inputs: Vec<Param>,
    pub state_mutability: StateMutability,
}

#[derive(Serialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub struct Fallback {
    pub state_mutability: StateMutability,
}

#[derive(Serialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub struct Receive {
    pub state_mutability: StateMutability,
}

/// A parsed interface, declarations kept in document order.
#[derive(Serialize, Debug, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct Abi {
    pub constructor: Option<Constructor>,
    pub functions: Vec<Function>,
    pub events: Vec<Event>,
    pub fallback: Option<Fallback>,
    pub receive: Option<Receive>,
}

fn canonical_signature(name: &str, inputs: &[Param]) -> String {
    let types: Vec<String> = inputs.iter().map(|input| input.ty.to_string()).collect();
    format!("{}({})", name, types.join(","))
}

/// Placeholder solc leaves in bytecode for an unlinked library, given its
/// fully qualified name (`path/to/File.sol:Library`).
pub fn library_link_pattern(fully_qualified_name: &str) -> String {
    let hash = hex::encode(keccak256(fully_qualified_name.as_bytes()));
    format!("__${}$__", &hash[..34])
}
