//! End-to-end generation tests
//!
//! Bindings are generated from the ABI fixtures and inspected through syn,
//! so the assertions hold for both formatted and unformatted output.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use abigen::{BindOptions, ContractInput, GenError, bind};
use abigen_types::library_link_pattern;
use assert_matches::assert_matches;

fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("{}: {}", path.display(), err))
}

fn token() -> ContractInput {
    ContractInput::new("Token", fixture("token.abi.json")).with_bytecode(fixture("token.bin"))
}

fn exchange() -> ContractInput {
    ContractInput::new("Exchange", fixture("exchange.abi.json"))
}

fn generate(inputs: &[ContractInput]) -> String {
    bind(inputs, &BTreeMap::new(), &BindOptions::default()).unwrap()
}

fn unformatted(inputs: &[ContractInput]) -> String {
    let options = BindOptions {
        format: false,
        ..BindOptions::default()
    };
    bind(inputs, &BTreeMap::new(), &options).unwrap()
}

fn module_items(code: &str) -> Vec<syn::Item> {
    let file = syn::parse_file(code).expect("bindings must parse");
    file.items
        .into_iter()
        .find_map(|item| match item {
            syn::Item::Mod(module) => module.content.map(|(_, items)| items),
            _ => None,
        })
        .expect("bindings must contain a module")
}

fn struct_names(items: &[syn::Item]) -> BTreeSet<String> {
    items
        .iter()
        .filter_map(|item| match item {
            syn::Item::Struct(item) => Some(item.ident.to_string()),
            _ => None,
        })
        .collect()
}

fn fn_names(items: &[syn::Item]) -> BTreeSet<String> {
    items
        .iter()
        .filter_map(|item| match item {
            syn::Item::Fn(item) => Some(item.sig.ident.to_string()),
            _ => None,
        })
        .collect()
}

fn const_names(items: &[syn::Item]) -> BTreeSet<String> {
    items
        .iter()
        .filter_map(|item| match item {
            syn::Item::Const(item) => Some(item.ident.to_string()),
            _ => None,
        })
        .collect()
}

fn self_type_name(ty: &syn::Type) -> Option<String> {
    match ty {
        syn::Type::Path(path) => path.path.segments.last().map(|seg| seg.ident.to_string()),
        _ => None,
    }
}

/// Inherent methods of the named type
fn methods(items: &[syn::Item], ty: &str) -> BTreeSet<String> {
    items
        .iter()
        .filter_map(|item| match item {
            syn::Item::Impl(block) if block.trait_.is_none() => Some(block),
            _ => None,
        })
        .filter(|block| self_type_name(&block.self_ty).as_deref() == Some(ty))
        .flat_map(|block| block.items.iter())
        .filter_map(|item| match item {
            syn::ImplItem::Fn(method) => Some(method.sig.ident.to_string()),
            _ => None,
        })
        .collect()
}

fn fn_params(items: &[syn::Item], name: &str) -> Vec<String> {
    items
        .iter()
        .find_map(|item| match item {
            syn::Item::Fn(item) if item.sig.ident == name => Some(&item.sig),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no function {}", name))
        .inputs
        .iter()
        .filter_map(|arg| match arg {
            syn::FnArg::Typed(typed) => match typed.pat.as_ref() {
                syn::Pat::Ident(ident) => Some(ident.ident.to_string()),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

fn struct_fields(items: &[syn::Item], name: &str) -> Vec<String> {
    items
        .iter()
        .find_map(|item| match item {
            syn::Item::Struct(item) if item.ident == name => Some(item),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no struct {}", name))
        .fields
        .iter()
        .filter_map(|field| field.ident.as_ref().map(ToString::to_string))
        .collect()
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[test]
fn test_token_binding_surface() {
    let code = generate(&[token()]);
    assert!(code.starts_with("// Code generated - DO NOT EDIT."));
    let items = module_items(&code);

    assert_eq!(
        struct_names(&items),
        set(&[
            "Position",
            "Token",
            "TokenMemo",
            "TokenPositionOutput",
            "TokenTransfer",
            "TokenWatcher",
        ])
    );
    assert_eq!(
        const_names(&items),
        set(&["TOKEN_ABI", "TOKEN_BIN", "TOKEN_FUNC_SIGS"])
    );
    assert_eq!(
        methods(&items, "Token"),
        set(&[
            "new",
            "address",
            "balance_of",
            "position",
            "r#type",
            "transfer",
            "transfer0",
            "open",
            "fallback",
            "receive",
            "filter_transfer",
            "watch_transfer",
            "filter_memo",
            "watch_memo",
        ])
    );
    assert_eq!(
        fn_params(&items, "deploy_token"),
        vec!["opts", "backend", "name", "supply"]
    );
}

#[test]
fn test_output_names_avoid_input_names() {
    let items = module_items(&generate(&[token()]));
    assert_eq!(
        struct_fields(&items, "TokenPositionOutput"),
        vec!["owner_1", "pos"]
    );
}

#[test]
fn test_func_sigs_table() {
    let code = unformatted(&[token()]);
    assert!(code.contains(r#"("balanceOf(address)", "70a08231"),"#));
    assert!(code.contains(r#"("transfer(address,uint256)", "a9059cbb"),"#));
    assert!(code.contains(r#"("transfer(address,uint256,bytes)", "#));
}

#[test]
fn test_indexed_dynamic_event_field_is_topic_hash() {
    let code = unformatted(&[token()]);
    assert!(code.contains("pub note: rt::B256,"));
    assert!(code.contains("pub from: rt::Address,"));
    assert!(code.contains("note: Vec<String>"));
}

#[test]
fn test_shared_tuple_shape_yields_one_struct() {
    let items = module_items(&generate(&[token(), exchange()]));
    let names = struct_names(&items);

    assert!(names.contains("Position"));
    assert!(!names.iter().any(|name| name.starts_with("Position") && name != "Position"));
    assert!(names.contains("ExchangeQuoteOutput"));
    assert_eq!(struct_fields(&items, "Position"), vec!["size", "entry"]);
}

#[test]
fn test_output_is_deterministic() {
    let first = generate(&[token(), exchange()]);
    let again = generate(&[token(), exchange()]);
    let reordered = generate(&[exchange(), token()]);

    assert_eq!(first, again);
    assert_eq!(first, reordered);
}

#[test]
fn test_watchers_expose_event_methods() {
    let math = ContractInput::new("Math", fixture("math.abi.json"));
    let items = module_items(&generate(&[token(), exchange(), math]));

    assert_eq!(
        methods(&items, "TokenWatcher"),
        set(&["new", "contracts", "watch_transfer", "watch_memo"])
    );
    assert_eq!(
        methods(&items, "ExchangeWatcher"),
        set(&["new", "contracts", "watch_settled"])
    );
    assert!(!struct_names(&items).contains("MathWatcher"));
}

#[test]
fn test_watcher_fans_out_through_runtime() {
    let code = unformatted(&[token()]);
    assert!(code.contains("rt::watch_all(&self.contracts, sink,"));
    assert!(code.contains("instance.watch_transfer(opts, forward"));
}

#[test]
fn test_libraries_are_linked_not_deployed() {
    let pattern = library_link_pattern("contracts/Math.sol:Math");
    let math = ContractInput::new("Math", fixture("math.abi.json")).with_bytecode("6080");
    let user = exchange().with_bytecode(format!("6080{}6000", pattern));
    let libraries: BTreeMap<String, String> = [(pattern.clone(), "Math".to_string())].into();
    let options = BindOptions {
        format: false,
        ..BindOptions::default()
    };

    let code = bind(&[math, user], &libraries, &options).unwrap();
    let items = module_items(&code);

    let deploys = fn_names(&items);
    assert!(deploys.contains("deploy_exchange"));
    assert!(!deploys.contains("deploy_math"));
    assert_eq!(
        fn_params(&items, "deploy_exchange"),
        vec!["opts", "backend", "math_address"]
    );
    assert!(code.contains(&format!("rt::link_bytecode(&bytecode, {:?}, math_address)", pattern)));
}

#[test]
fn test_missing_bytecode_means_no_deploy() {
    let items = module_items(&generate(&[exchange()]));
    assert!(fn_names(&items).is_empty());
    assert!(!const_names(&items).contains("EXCHANGE_BIN"));
}

#[test]
fn test_unformatted_output_parses() {
    let options = BindOptions {
        package: "My-Bindings".to_string(),
        format: false,
    };
    let code = bind(&[token(), exchange()], &BTreeMap::new(), &options).unwrap();

    assert!(code.contains("pub mod my_bindings {"));
    module_items(&code);
}

#[test]
fn test_fixed_point_types_are_rejected() {
    let abi = r#"[{"type":"function","name":"rate","inputs":[{"name":"r","type":"ufixed128x18"}],"outputs":[],"stateMutability":"nonpayable"}]"#;
    let result = bind(
        &[ContractInput::new("Rates", abi)],
        &BTreeMap::new(),
        &BindOptions::default(),
    );
    assert_matches!(result, Err(GenError::UnsupportedType(ty)) if ty == "ufixed128x18");
}

#[test]
fn test_method_shadowing_event_accessor_collides() {
    let abi = r#"[
        {"type":"function","name":"watchTransfer","inputs":[],"outputs":[],"stateMutability":"nonpayable"},
        {"type":"event","name":"Transfer","inputs":[],"anonymous":false}
    ]"#;
    let result = bind(
        &[ContractInput::new("Token", abi)],
        &BTreeMap::new(),
        &BindOptions::default(),
    );
    assert_matches!(
        result,
        Err(GenError::NameCollision { scope, name }) if scope == "Token" && name == "watch_transfer"
    );
}

#[test]
fn test_invalid_abi_names_contract() {
    let result = bind(
        &[ContractInput::new("broken", "[{\"type\":\"function\"")],
        &BTreeMap::new(),
        &BindOptions::default(),
    );
    assert_matches!(result, Err(GenError::Abi { contract, .. }) if contract == "broken");
}
