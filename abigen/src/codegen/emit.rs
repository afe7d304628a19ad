/* Binding emitter
 *
 * Renders a GenerationUnit section by section: the module prelude, the
 * synthesized tuple structs, then per contract its constants, deploy
 * function, output and event records, binding type and watcher. Rendering
 * has no side effects and iterates only ordered maps, so one unit always
 * yields the same text. */

use crate::codegen::helpers::{to_pascal, to_snake, to_upper_snake};
use crate::codegen::normalize::library_params;
use crate::codegen::types::{map_event_field_type, map_type};
use crate::codegen::watcher::emit_watcher;
use crate::error::Result;
use crate::model::{
    ContractSpec, EntryKind, EventSpec, GenerationUnit, MethodSpec, StructSpec, StructTable,
};
use abigen_types::{Param, StateMutability};
use std::fmt::Write;

const MODULE_LINTS: &str = "#[allow(dead_code, unused_imports, unused_mut, unused_variables, \
     non_camel_case_types, non_snake_case, clippy::all)]";

pub fn watcher_name(type_name: &str) -> String {
    format!("{}Watcher", type_name)
}

pub fn event_record_name(type_name: &str, event_name: &str) -> String {
    format!("{}{}", type_name, event_name)
}

pub fn output_struct_name(type_name: &str, function_name: &str) -> String {
    format!("{}{}Output", type_name, to_pascal(function_name))
}

pub fn deploy_fn_name(type_name: &str) -> String {
    format!("deploy_{}", to_snake(type_name))
}

fn const_prefix(type_name: &str) -> String {
    to_upper_snake(type_name)
}

pub fn emit_unit(unit: &GenerationUnit) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "{}", MODULE_LINTS)?;
    writeln!(out, "pub mod {} {{", unit.package)?;
    writeln!(out, "    use ::abigen_runtime as rt;")?;

    for spec in unit.structs.values() {
        emit_tuple_struct(&mut out, spec)?;
    }
    for contract in unit.contracts.values() {
        emit_contract(&mut out, contract, &unit.structs)?;
    }

    writeln!(out, "}}")?;
    Ok(out)
}

fn emit_tuple_struct(out: &mut String, spec: &StructSpec) -> Result<()> {
    let tuple: Vec<String> = spec.fields.iter().map(|field| field.sol_kind.to_string()).collect();
    let fields: Vec<(String, String)> = spec
        .fields
        .iter()
        .map(|field| (field.name.clone(), field.ty.clone()))
        .collect();

    writeln!(out)?;
    writeln!(
        out,
        "    /// {} is an auto generated struct for the `({})` tuple.",
        spec.name,
        tuple.join(",")
    )?;
    emit_record(out, &spec.name, &fields)?;

    writeln!(out, "    impl rt::Tokenizable for {} {{", spec.name)?;
    writeln!(
        out,
        "        fn from_token(token: rt::Token) -> rt::Result<Self> {{"
    )?;
    writeln!(out, "            let mut reader = rt::TokenReader::from_tuple(token)?;")?;
    emit_reader_tail(out, &fields)?;
    writeln!(out, "        }}")?;
    writeln!(out, "        fn into_token(self) -> rt::Token {{")?;
    let components: Vec<String> = fields
        .iter()
        .map(|(name, _)| format!("rt::Tokenizable::into_token(self.{})", name))
        .collect();
    writeln!(
        out,
        "            rt::Token::Tuple(vec![{}])",
        components.join(", ")
    )?;
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;
    Ok(())
}

/* `#[derive]`d plain struct with public fields */
fn emit_record(out: &mut String, name: &str, fields: &[(String, String)]) -> Result<()> {
    writeln!(out, "    #[derive(Debug, Clone, PartialEq, Eq)]")?;
    writeln!(out, "    pub struct {} {{", name)?;
    for (field, ty) in fields {
        writeln!(out, "        pub {}: {},", field, ty)?;
    }
    writeln!(out, "    }}")?;
    Ok(())
}

/* Body of a decoder once `reader` is in scope */
fn emit_reader_tail(out: &mut String, fields: &[(String, String)]) -> Result<()> {
    writeln!(out, "            let value = Self {{")?;
    for (field, _) in fields {
        writeln!(out, "                {}: reader.read()?,", field)?;
    }
    writeln!(out, "            }};")?;
    writeln!(out, "            reader.finish()?;")?;
    writeln!(out, "            Ok(value)")?;
    Ok(())
}

fn emit_from_tokens(out: &mut String, name: &str, fields: &[(String, String)]) -> Result<()> {
    writeln!(out, "    impl rt::FromTokens for {} {{", name)?;
    writeln!(
        out,
        "        fn from_tokens(tokens: Vec<rt::Token>) -> rt::Result<Self> {{"
    )?;
    writeln!(out, "            let mut reader = rt::TokenReader::new(tokens);")?;
    emit_reader_tail(out, fields)?;
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;
    Ok(())
}

fn emit_contract(out: &mut String, contract: &ContractSpec, structs: &StructTable) -> Result<()> {
    emit_constants(out, contract)?;

    if contract.deployable() {
        emit_deploy(out, contract, structs)?;
    }
    for method in contract.calls.values().filter(|method| method.structured) {
        emit_output_struct(out, contract, method, structs)?;
    }
    for event in contract.events.values() {
        emit_event_record(out, contract, event, structs)?;
    }

    emit_binding_type(out, contract, structs)?;

    if !contract.events.is_empty() {
        emit_watcher(out, contract, structs)?;
    }
    Ok(())
}

fn emit_constants(out: &mut String, contract: &ContractSpec) -> Result<()> {
    let name = &contract.type_name;
    let prefix = const_prefix(name);

    writeln!(out)?;
    writeln!(out, "    /// JSON ABI of the `{}` contract.", name)?;
    writeln!(out, "    pub const {}_ABI: &str = {:?};", prefix, contract.input_abi)?;

    if let Some(bin) = &contract.input_bin {
        writeln!(out, "    /// Deployment bytecode of the `{}` contract.", name)?;
        writeln!(out, "    pub const {}_BIN: &str = {:?};", prefix, bin)?;
    }

    writeln!(
        out,
        "    /// `(signature, selector)` pairs of every function declared by `{}`.",
        name
    )?;
    writeln!(out, "    pub const {}_FUNC_SIGS: &[(&str, &str)] = &[", prefix)?;
    for (signature, selector) in &contract.func_sigs {
        writeln!(out, "        ({:?}, {:?}),", signature, selector)?;
    }
    writeln!(out, "    ];")?;
    Ok(())
}

fn emit_deploy(out: &mut String, contract: &ContractSpec, structs: &StructTable) -> Result<()> {
    let name = &contract.type_name;
    let prefix = const_prefix(name);
    let libraries = library_params(&contract.libraries);
    let constructor = &contract.constructor.normalized;

    let mut params = String::new();
    for (_, param) in &libraries {
        write!(params, ", {}: rt::Address", param)?;
    }
    params.push_str(&render_params(&constructor.inputs, structs)?);

    writeln!(out)?;
    writeln!(
        out,
        "    /// Deploys a new `{}` contract and binds an instance of it.",
        name
    )?;
    writeln!(
        out,
        "    pub async fn {}<B: rt::ContractBackend>(opts: &rt::TransactOpts, backend: ::std::sync::Arc<B>{}) -> rt::Result<(rt::Address, rt::TxHash, {}<B>)> {{",
        deploy_fn_name(name),
        params,
        name
    )?;
    writeln!(out, "        let bytecode = String::from({}_BIN);", prefix)?;
    for (pattern, param) in &libraries {
        writeln!(
            out,
            "        let bytecode = rt::link_bytecode(&bytecode, {:?}, {})?;",
            pattern, param
        )?;
    }
    writeln!(
        out,
        "        let (address, tx) = rt::deploy_contract(&*backend, opts, {}_ABI, &bytecode, {}).await?;",
        prefix,
        render_tokens(&constructor.inputs)
    )?;
    writeln!(out, "        Ok((address, tx, {}::new(address, backend)))", name)?;
    writeln!(out, "    }}")?;
    Ok(())
}

fn emit_output_struct(
    out: &mut String,
    contract: &ContractSpec,
    method: &MethodSpec,
    structs: &StructTable,
) -> Result<()> {
    let name = output_struct_name(&contract.type_name, &method.original.name);
    let fields = typed_fields(&method.normalized.outputs, structs, map_type_of)?;

    writeln!(out)?;
    writeln!(
        out,
        "    /// Values returned by `{}` on the `{}` contract.",
        method.original.signature(),
        contract.type_name
    )?;
    emit_record(out, &name, &fields)?;
    emit_from_tokens(out, &name, &fields)
}

fn emit_event_record(
    out: &mut String,
    contract: &ContractSpec,
    event: &EventSpec,
    structs: &StructTable,
) -> Result<()> {
    let name = event_record_name(&contract.type_name, &event.normalized.name);
    let fields = typed_fields(&event.normalized.inputs, structs, map_event_field_type)?;

    writeln!(out)?;
    writeln!(
        out,
        "    /// {} represents a `{}` event raised by the `{}` contract.",
        name,
        event.original.signature(),
        contract.type_name
    )?;
    emit_record(out, &name, &fields)?;
    emit_from_tokens(out, &name, &fields)
}

fn emit_binding_type(out: &mut String, contract: &ContractSpec, structs: &StructTable) -> Result<()> {
    let name = &contract.type_name;
    let prefix = const_prefix(name);

    writeln!(out)?;
    writeln!(
        out,
        "    /// {} is an auto generated binding around the `{}` contract.",
        name, name
    )?;
    writeln!(out, "    pub struct {}<B> {{", name)?;
    writeln!(out, "        contract: rt::BoundContract<B>,")?;
    writeln!(out, "    }}")?;

    writeln!(out, "    impl<B> Clone for {}<B> {{", name)?;
    writeln!(out, "        fn clone(&self) -> Self {{")?;
    writeln!(out, "            Self {{ contract: self.contract.clone() }}")?;
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;

    writeln!(out, "    impl<B: rt::ContractBackend> {}<B> {{", name)?;
    writeln!(
        out,
        "        /// Binds an instance of `{}` deployed at `address`.",
        name
    )?;
    writeln!(
        out,
        "        pub fn new(address: rt::Address, backend: ::std::sync::Arc<B>) -> Self {{"
    )?;
    writeln!(
        out,
        "            Self {{ contract: rt::BoundContract::new(address, {}_ABI, backend) }}",
        prefix
    )?;
    writeln!(out, "        }}")?;
    writeln!(out, "        pub fn address(&self) -> rt::Address {{")?;
    writeln!(out, "            self.contract.address()")?;
    writeln!(out, "        }}")?;

    for method in contract.calls.values() {
        emit_method(out, contract, method, EntryKind::Call, structs)?;
    }
    for method in contract.transacts.values() {
        emit_method(out, contract, method, EntryKind::Transact, structs)?;
    }
    if let Some(method) = &contract.fallback {
        emit_method(out, contract, method, EntryKind::Fallback, structs)?;
    }
    if let Some(method) = &contract.receive {
        emit_method(out, contract, method, EntryKind::Receive, structs)?;
    }
    for event in contract.events.values() {
        emit_event_accessors(out, contract, event, structs)?;
    }

    writeln!(out, "    }}")?;
    Ok(())
}

fn emit_method(
    out: &mut String,
    contract: &ContractSpec,
    method: &MethodSpec,
    kind: EntryKind,
    structs: &StructTable,
) -> Result<()> {
    let function = &method.normalized;
    let signature = method.original.signature();
    let params = render_params(&function.inputs, structs)?;
    let args = render_tokens(&function.inputs);

    match kind {
        EntryKind::Call => {
            let ret = call_return_type(contract, method, structs)?;
            writeln!(
                out,
                "        /// Calls `{}` ({}).",
                signature,
                mutability_label(function.state_mutability)
            )?;
            writeln!(
                out,
                "        pub async fn {}(&self, opts: &rt::CallOpts{}) -> rt::Result<{}> {{",
                function.name, params, ret
            )?;
            let call = format!(
                "self.contract.call(opts, {:?}, {}).await?",
                signature, args
            );
            match function.outputs.len() {
                0 => writeln!(out, "            rt::TokenReader::new({}).finish()", call)?,
                1 => writeln!(out, "            rt::TokenReader::new({}).single()", call)?,
                _ => writeln!(
                    out,
                    "            <{} as rt::FromTokens>::from_tokens({})",
                    ret, call
                )?,
            }
        }
        EntryKind::Transact => {
            writeln!(
                out,
                "        /// Submits a `{}` transaction ({}).",
                signature,
                mutability_label(function.state_mutability)
            )?;
            writeln!(
                out,
                "        pub async fn {}(&self, opts: &rt::TransactOpts{}) -> rt::Result<rt::TxHash> {{",
                function.name, params
            )?;
            writeln!(
                out,
                "            self.contract.transact(opts, {:?}, {}).await",
                signature, args
            )?;
        }
        EntryKind::Fallback => {
            writeln!(
                out,
                "        /// Sends `calldata` to the fallback function ({}).",
                mutability_label(function.state_mutability)
            )?;
            writeln!(
                out,
                "        pub async fn fallback(&self, opts: &rt::TransactOpts, calldata: rt::Bytes) -> rt::Result<rt::TxHash> {{"
            )?;
            writeln!(out, "            self.contract.raw_transact(opts, calldata).await")?;
        }
        EntryKind::Receive => {
            writeln!(out, "        /// Sends plain value to the receive function.")?;
            writeln!(
                out,
                "        pub async fn receive(&self, opts: &rt::TransactOpts) -> rt::Result<rt::TxHash> {{"
            )?;
            writeln!(out, "            self.contract.transfer(opts).await")?;
        }
        /* Emitted by their own sections */
        EntryKind::Builtin | EntryKind::Event => return Ok(()),
    }

    writeln!(out, "        }}")?;
    Ok(())
}

fn emit_event_accessors(
    out: &mut String,
    contract: &ContractSpec,
    event: &EventSpec,
    structs: &StructTable,
) -> Result<()> {
    let record = event_record_name(&contract.type_name, &event.normalized.name);
    let signature = event.original.signature();
    let indexed: Vec<&Param> = event.normalized.indexed_inputs().collect();
    let filters = render_filter_params(&indexed, structs)?;
    let topics = render_topics(&indexed);

    writeln!(
        out,
        "        /// Retrieves logged `{}` events, matching any of the given indexed values.",
        signature
    )?;
    writeln!(
        out,
        "        pub async fn {}(&self, opts: &rt::FilterOpts{}) -> rt::Result<Vec<{}>> {{",
        event.filter_name(),
        filters,
        record
    )?;
    writeln!(
        out,
        "            self.contract.filter_logs(opts, {:?}, {}).await",
        signature, topics
    )?;
    writeln!(out, "        }}")?;

    writeln!(
        out,
        "        /// Streams live `{}` events into `sink`, matching any of the given indexed values.",
        signature
    )?;
    writeln!(
        out,
        "        pub async fn {}(&self, opts: &rt::WatchOpts, sink: rt::mpsc::Sender<{}>{}) -> rt::Result<rt::Subscription> {{",
        event.watch_name(),
        record,
        filters
    )?;
    writeln!(
        out,
        "            self.contract.watch_logs(opts, {:?}, {}, sink).await",
        signature, topics
    )?;
    writeln!(out, "        }}")?;
    Ok(())
}

fn call_return_type(
    contract: &ContractSpec,
    method: &MethodSpec,
    structs: &StructTable,
) -> Result<String> {
    let outputs = &method.normalized.outputs;
    if method.structured {
        return Ok(output_struct_name(&contract.type_name, &method.original.name));
    }
    match outputs.first() {
        Some(output) => map_type(&output.ty, structs),
        None => Ok("()".to_string()),
    }
}

fn map_type_of(param: &Param, structs: &StructTable) -> Result<String> {
    map_type(&param.ty, structs)
}

fn typed_fields(
    params: &[Param],
    structs: &StructTable,
    mapper: fn(&Param, &StructTable) -> Result<String>,
) -> Result<Vec<(String, String)>> {
    params
        .iter()
        .map(|param| Ok((param.name.clone(), mapper(param, structs)?)))
        .collect()
}

/* `, name: Type` for each parameter */
pub(crate) fn render_params(params: &[Param], structs: &StructTable) -> Result<String> {
    let mut rendered = String::new();
    for param in params {
        write!(rendered, ", {}: {}", param.name, map_type(&param.ty, structs)?)?;
    }
    Ok(rendered)
}

/* `, name: Vec<Type>` for each indexed filter argument */
pub(crate) fn render_filter_params(indexed: &[&Param], structs: &StructTable) -> Result<String> {
    let mut rendered = String::new();
    for param in indexed {
        write!(rendered, ", {}: Vec<{}>", param.name, map_type(&param.ty, structs)?)?;
    }
    Ok(rendered)
}

fn render_tokens(params: &[Param]) -> String {
    let tokens: Vec<String> = params
        .iter()
        .map(|param| format!("rt::Tokenizable::into_token({})", param.name))
        .collect();
    format!("vec![{}]", tokens.join(", "))
}

fn render_topics(indexed: &[&Param]) -> String {
    let topics: Vec<String> = indexed
        .iter()
        .map(|param| {
            format!(
                "{}.into_iter().map(rt::Tokenizable::into_token).collect::<Vec<_>>()",
                param.name
            )
        })
        .collect();
    format!("vec![{}]", topics.join(", "))
}

fn mutability_label(mutability: StateMutability) -> &'static str {
    match mutability {
        StateMutability::Pure => "pure",
        StateMutability::View => "view",
        StateMutability::NonPayable => "nonpayable",
        StateMutability::Payable => "payable",
    }
}
