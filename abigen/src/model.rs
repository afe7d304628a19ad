/* Binding data model shared by the synthesizer, normalizer and emitter */

use abigen_types::{AbiType, Event, Function};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

/* Synthesized structs keyed by tuple shape, in first-seen order */
pub type StructTable = IndexMap<String, StructSpec>;

/// Everything rendered into one output module
#[derive(Serialize, Debug, Clone)]
pub struct GenerationUnit {
    pub package: String,
    pub contracts: BTreeMap<String, ContractSpec>,
    /* Link pattern -> library name */
    pub libraries: BTreeMap<String, String>,
    pub structs: StructTable,
}

#[derive(Serialize, Debug, Clone)]
pub struct ContractSpec {
    pub type_name: String,
    /* Compact JSON, embedded verbatim in the bindings */
    pub input_abi: String,
    pub input_bin: Option<String>,
    /* Canonical signature -> hex selector */
    pub func_sigs: BTreeMap<String, String>,
    pub constructor: MethodSpec,
    /* Keyed by generated method name */
    pub calls: BTreeMap<String, MethodSpec>,
    pub transacts: BTreeMap<String, MethodSpec>,
    pub fallback: Option<MethodSpec>,
    pub receive: Option<MethodSpec>,
    /* Keyed by resolved event name */
    pub events: BTreeMap<String, EventSpec>,
    /* Libraries this bytecode links against */
    pub libraries: BTreeMap<String, String>,
    pub library: bool,
}

impl ContractSpec {
    pub fn deployable(&self) -> bool {
        self.input_bin.is_some() && !self.library
    }
}

/// A declaration with its generated names
#[derive(Serialize, Debug, Clone)]
pub struct MethodSpec {
    pub original: Function,
    /* Same shape as `original`; names are Rust identifiers */
    pub normalized: Function,
    /* Outputs are packed into one generated struct */
    pub structured: bool,
}

#[derive(Serialize, Debug, Clone)]
pub struct EventSpec {
    pub original: Event,
    /* `name` is the record suffix, parameter names are Rust identifiers */
    pub normalized: Event,
    /* snake_case stem of `filter_*` / `watch_*` */
    pub accessor: String,
}

impl EventSpec {
    pub fn filter_name(&self) -> String {
        format!("filter_{}", self.accessor)
    }

    pub fn watch_name(&self) -> String {
        format!("watch_{}", self.accessor)
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct FieldSpec {
    pub ty: String,
    pub name: String,
    pub sol_kind: AbiType,
}

#[derive(Serialize, Debug, Clone)]
pub struct StructSpec {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

/* Closed set of generated entry points on a binding type */
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /* `new` and `address` */
    Builtin,
    Call,
    Transact,
    Fallback,
    Receive,
    /* `filter_*` and `watch_*` accessors */
    Event,
}

impl ContractSpec {
    /* Every method name the binding type exposes, in emission order */
    pub fn entry_points(&self) -> Vec<(String, EntryKind)> {
        let mut points = vec![
            ("new".to_string(), EntryKind::Builtin),
            ("address".to_string(), EntryKind::Builtin),
        ];
        for method in self.calls.values() {
            points.push((method.normalized.name.clone(), EntryKind::Call));
        }
        for method in self.transacts.values() {
            points.push((method.normalized.name.clone(), EntryKind::Transact));
        }
        if self.fallback.is_some() {
            points.push(("fallback".to_string(), EntryKind::Fallback));
        }
        if self.receive.is_some() {
            points.push(("receive".to_string(), EntryKind::Receive));
        }
        for event in self.events.values() {
            points.push((event.filter_name(), EntryKind::Event));
            points.push((event.watch_name(), EntryKind::Event));
        }
        points
    }
}
