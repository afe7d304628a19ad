/* Library entry point: contract inputs -> GenerationUnit -> source text */

use crate::codegen;
use crate::codegen::emit::{deploy_fn_name, event_record_name, output_struct_name, watcher_name};
use crate::codegen::helpers::{
    RESERVED_TYPE_NAMES, contract_type_name, escape_ident, to_pascal, to_upper_snake,
};
use crate::codegen::normalize::{
    check_entry_points, library_params, normalize_event, normalize_method,
};
use crate::codegen::structs::synthesize;
use crate::error::{GenError, Result};
use crate::model::{ContractSpec, GenerationUnit};
use abigen_types::{Abi, AbiError, Function};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// One contract to generate bindings for
#[derive(Debug, Clone)]
pub struct ContractInput {
    pub name: String,
    /// JSON ABI document
    pub abi: String,
    /// Hex deployment bytecode; contracts without it get no deploy function
    pub bytecode: Option<String>,
}

impl ContractInput {
    pub fn new(name: impl Into<String>, abi: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            abi: abi.into(),
            bytecode: None,
        }
    }

    pub fn with_bytecode(mut self, bytecode: impl Into<String>) -> Self {
        self.bytecode = Some(bytecode.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct BindOptions {
    /// Name of the generated module
    pub package: String,
    /// Pretty-print the output
    pub format: bool,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            package: "bindings".to_string(),
            format: true,
        }
    }
}

/// Generate bindings for `inputs` as a single Rust module.
///
/// `libraries` maps library link patterns to library names.
pub fn bind(
    inputs: &[ContractInput],
    libraries: &BTreeMap<String, String>,
    options: &BindOptions,
) -> Result<String> {
    let unit = build_unit(inputs, libraries, &options.package)?;
    codegen::render(&unit, options.format)
}

/// Parse, synthesize and normalize every input into one unit.
pub fn build_unit(
    inputs: &[ContractInput],
    libraries: &BTreeMap<String, String>,
    package: &str,
) -> Result<GenerationUnit> {
    let mut parsed: BTreeMap<String, (&ContractInput, Abi)> = BTreeMap::new();
    for input in inputs {
        let type_name = contract_type_name(&input.name);
        if type_name.is_empty() {
            return Err(GenError::InvalidOutput(format!(
                "contract name '{}' is not a valid type name",
                input.name
            )));
        }
        let abi = Abi::from_json(&input.abi).map_err(|source| GenError::Abi {
            contract: input.name.clone(),
            source,
        })?;
        if parsed.insert(type_name.clone(), (input, abi)).is_some() {
            return Err(GenError::collision("package", type_name));
        }
    }

    let reserved = reserved_type_names(&parsed);
    let structs = synthesize(parsed.values().map(|(_, abi)| abi), &reserved)?;

    let mut contracts = BTreeMap::new();
    for (type_name, (input, abi)) in &parsed {
        let contract = build_contract(type_name, input, abi, libraries)?;
        check_entry_points(&contract)?;
        debug!(
            contract = %type_name,
            calls = contract.calls.len(),
            transacts = contract.transacts.len(),
            events = contract.events.len(),
            "normalized contract"
        );
        contracts.insert(type_name.clone(), contract);
    }

    let unit = GenerationUnit {
        package: codegen::helpers::sanitize_package(package),
        contracts,
        libraries: libraries.clone(),
        structs,
    };
    check_unit_names(&unit)?;
    Ok(unit)
}

/* Type names the struct synthesizer must leave to the contracts */
fn reserved_type_names(parsed: &BTreeMap<String, (&ContractInput, Abi)>) -> BTreeSet<String> {
    let mut reserved: BTreeSet<String> = RESERVED_TYPE_NAMES.iter().map(|s| s.to_string()).collect();
    for (type_name, (_, abi)) in parsed {
        reserved.insert(type_name.clone());
        reserved.insert(watcher_name(type_name));
        for event in &abi.events {
            reserved.insert(event_record_name(
                type_name,
                &escape_ident(&to_pascal(&event.name)),
            ));
        }
        for function in &abi.functions {
            if function.state_mutability.is_read_only() && function.outputs.len() > 1 {
                reserved.insert(output_struct_name(type_name, &function.name));
            }
        }
    }
    reserved
}

fn build_contract(
    type_name: &str,
    input: &ContractInput,
    abi: &Abi,
    libraries: &BTreeMap<String, String>,
) -> Result<ContractSpec> {
    let input_abi = serde_json::from_str::<serde_json::Value>(&input.abi)
        .map(|value| value.to_string())
        .map_err(|err| GenError::Abi {
            contract: input.name.clone(),
            source: AbiError::Json(err),
        })?;

    let input_bin = input
        .bytecode
        .as_deref()
        .map(str::trim)
        .map(|bin| bin.strip_prefix("0x").unwrap_or(bin))
        .filter(|bin| !bin.is_empty())
        .map(str::to_string);

    let linked: BTreeMap<String, String> = match &input_bin {
        Some(bin) => libraries
            .iter()
            .filter(|(pattern, _)| bin.contains(pattern.as_str()))
            .map(|(pattern, name)| (pattern.clone(), name.clone()))
            .collect(),
        None => BTreeMap::new(),
    };
    if let Some(bin) = &input_bin {
        let unresolved = linked
            .keys()
            .fold(bin.clone(), |rest, pattern| rest.replace(pattern.as_str(), ""));
        if unresolved.contains("__$") {
            warn!(contract = %type_name, "bytecode references libraries missing from the link map");
        }
    }

    let library = libraries
        .values()
        .any(|name| *name == input.name || contract_type_name(name) == type_name);

    let func_sigs = abi
        .functions
        .iter()
        .map(|function| (function.signature(), function.selector_hex()))
        .collect();

    let constructor_params: Vec<String> =
        library_params(&linked).into_iter().map(|(_, param)| param).collect();
    let constructor = normalize_method(
        &stand_in(
            "constructor",
            abi.constructor
                .as_ref()
                .map(|constructor| constructor.inputs.clone())
                .unwrap_or_default(),
            abi.constructor
                .as_ref()
                .map(|constructor| constructor.state_mutability)
                .unwrap_or_default(),
        ),
        &constructor_params,
    );

    let mut calls = BTreeMap::new();
    let mut transacts = BTreeMap::new();
    for function in &abi.functions {
        let method = normalize_method(function, &[]);
        let key = method.normalized.name.clone();
        if calls.contains_key(&key) || transacts.contains_key(&key) {
            return Err(GenError::collision(type_name, key));
        }
        if function.state_mutability.is_read_only() {
            calls.insert(key, method);
        } else {
            transacts.insert(key, method);
        }
    }

    let fallback = abi.fallback.map(|fallback| {
        normalize_method(
            &stand_in("fallback", vec![], fallback.state_mutability),
            &[],
        )
    });
    let receive = abi.receive.map(|receive| {
        normalize_method(&stand_in("receive", vec![], receive.state_mutability), &[])
    });

    let events = abi
        .events
        .iter()
        .map(|event| (event.name.clone(), normalize_event(event)))
        .collect();

    Ok(ContractSpec {
        type_name: type_name.to_string(),
        input_abi,
        input_bin,
        func_sigs,
        constructor,
        calls,
        transacts,
        fallback,
        receive,
        events,
        libraries: linked,
        library,
    })
}

/* Function-shaped placeholder for constructor, fallback and receive */
fn stand_in(
    name: &str,
    inputs: Vec<abigen_types::Param>,
    state_mutability: abigen_types::StateMutability,
) -> Function {
    Function {
        name: name.to_string(),
        raw_name: name.to_string(),
        inputs,
        outputs: vec![],
        state_mutability,
    }
}

/* Module-level items must be unique across the whole unit */
fn check_unit_names(unit: &GenerationUnit) -> Result<()> {
    let mut types: BTreeSet<String> = unit.structs.values().map(|spec| spec.name.clone()).collect();
    let mut values = BTreeSet::new();

    for contract in unit.contracts.values() {
        let name = &contract.type_name;
        let mut contract_types = vec![name.clone()];
        if !contract.events.is_empty() {
            contract_types.push(watcher_name(name));
        }
        for event in contract.events.values() {
            contract_types.push(event_record_name(name, &event.normalized.name));
        }
        for method in contract.calls.values().filter(|method| method.structured) {
            contract_types.push(output_struct_name(name, &method.original.name));
        }
        for ty in contract_types {
            if RESERVED_TYPE_NAMES.contains(&ty.as_str()) || !types.insert(ty.clone()) {
                return Err(GenError::collision(&unit.package, ty));
            }
        }

        let prefix = to_upper_snake(name);
        let mut contract_values = vec![format!("{}_ABI", prefix), format!("{}_FUNC_SIGS", prefix)];
        if contract.input_bin.is_some() {
            contract_values.push(format!("{}_BIN", prefix));
        }
        if contract.deployable() {
            contract_values.push(deploy_fn_name(name));
        }
        for value in contract_values {
            if !values.insert(value.clone()) {
                return Err(GenError::collision(&unit.package, value));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const VAULT: &str = r#"[
        {"type":"constructor","inputs":[{"name":"owner","type":"address"}],"stateMutability":"nonpayable"},
        {"type":"function","name":"balance","inputs":[],"outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"},
        {"type":"function","name":"deposit","inputs":[],"outputs":[],"stateMutability":"payable"},
        {"type":"event","name":"Deposited","inputs":[{"name":"from","type":"address","indexed":true},{"name":"amount","type":"uint256","indexed":false}],"anonymous":false},
        {"type":"receive","stateMutability":"payable"}
    ]"#;

    fn vault() -> ContractInput {
        ContractInput::new("Vault", VAULT).with_bytecode(" 0x6080 \n")
    }

    #[test]
    fn splits_calls_and_transacts() {
        let unit = build_unit(&[vault()], &BTreeMap::new(), "vaults").unwrap();
        let contract = &unit.contracts["Vault"];

        assert_eq!(contract.calls.keys().collect::<Vec<_>>(), vec!["balance"]);
        assert_eq!(contract.transacts.keys().collect::<Vec<_>>(), vec!["deposit"]);
        assert!(contract.receive.is_some());
        assert!(contract.fallback.is_none());
        assert_eq!(contract.input_bin.as_deref(), Some("6080"));
        assert_eq!(contract.func_sigs["balance()"], "b69ef8a8");
        assert!(contract.deployable());
        assert!(!contract.input_abi.contains('\n'));
    }

    #[test]
    fn empty_bytecode_is_absent() {
        let input = ContractInput::new("Vault", VAULT).with_bytecode("0x");
        let unit = build_unit(&[input], &BTreeMap::new(), "vaults").unwrap();
        assert!(unit.contracts["Vault"].input_bin.is_none());
        assert!(!unit.contracts["Vault"].deployable());
    }

    #[test]
    fn duplicate_contract_names_collide() {
        let result = build_unit(&[vault(), vault()], &BTreeMap::new(), "vaults");
        assert_matches!(result, Err(GenError::NameCollision { name, .. }) if name == "Vault");
    }

    #[test]
    fn abi_errors_name_the_contract() {
        let input = ContractInput::new("Broken", "{ not json");
        let result = build_unit(&[input], &BTreeMap::new(), "vaults");
        assert_matches!(result, Err(GenError::Abi { contract, .. }) if contract == "Broken");
    }

    #[test]
    fn library_contracts_are_not_deployable() {
        let pattern = abigen_types::library_link_pattern("lib/Math.sol:Math");
        let math = ContractInput::new("Math", "[]").with_bytecode("6080");
        let user = ContractInput::new("Vault", VAULT).with_bytecode(format!("6080{}00", pattern));
        let libraries: BTreeMap<String, String> = [(pattern.clone(), "Math".to_string())].into();

        let unit = build_unit(&[math, user], &libraries, "vaults").unwrap();
        assert!(unit.contracts["Math"].library);
        assert!(!unit.contracts["Math"].deployable());
        assert_eq!(unit.contracts["Vault"].libraries.get(&pattern).map(String::as_str), Some("Math"));
        assert_eq!(
            unit.contracts["Vault"].constructor.normalized.inputs[0].name,
            "owner"
        );
    }

    #[test]
    fn options_default_to_formatted_bindings() {
        let options = BindOptions::default();
        assert_eq!(options.package, "bindings");
        assert!(options.format);
    }
}
