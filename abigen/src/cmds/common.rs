/* Common utilities shared between bind and selectors commands */

use abigen::ContractInput;
use abigen_types::library_link_pattern;
use anyhow::{Context, bail};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/* Load ABI and bytecode files as contract inputs.
 *
 * Bytecode files and type names pair with the ABI files by position; any
 * of them may be shorter than the ABI list, none may be longer. */
pub fn load_inputs(
  abi: &[PathBuf],
  bin: &[PathBuf],
  types: &[String],
) -> anyhow::Result<Vec<ContractInput>> {
  if bin.len() > abi.len() {
    bail!("{} bytecode files given for {} ABI files", bin.len(), abi.len());
  }
  if types.len() > abi.len() {
    bail!("{} type names given for {} ABI files", types.len(), abi.len());
  }

  let mut inputs = Vec::with_capacity(abi.len());
  for (index, abi_path) in abi.iter().enumerate() {
    let name = match types.get(index) {
      Some(name) => name.clone(),
      None => contract_name_from_path(abi_path)?,
    };
    let json = fs::read_to_string(abi_path)
      .with_context(|| format!("Failed to read ABI file {}", abi_path.display()))?;

    let mut input = ContractInput::new(name, json);
    if let Some(bin_path) = bin.get(index) {
      let bytecode = fs::read_to_string(bin_path)
        .with_context(|| format!("Failed to read bytecode file {}", bin_path.display()))?;
      input = input.with_bytecode(bytecode);
    }

    debug!(
      contract = %input.name,
      abi = %abi_path.display(),
      bytecode = input.bytecode.is_some(),
      "loaded contract"
    );
    inputs.push(input);
  }

  Ok(inputs)
}

/* `path/to/token.abi.json` -> `token` */
fn contract_name_from_path(path: &Path) -> anyhow::Result<String> {
  let name = path
    .file_name()
    .and_then(|name| name.to_str())
    .and_then(|name| name.split('.').next())
    .filter(|name| !name.is_empty())
    .with_context(|| format!("Cannot derive a contract name from {}", path.display()))?;
  Ok(name.to_string())
}

/* Map every library's link pattern to its short name */
pub fn library_map(libs: &[String]) -> anyhow::Result<BTreeMap<String, String>> {
  let mut map = BTreeMap::new();
  for fq_name in libs {
    let name = match fq_name.rsplit_once(':') {
      Some((_, name)) if !name.is_empty() => name,
      _ => bail!("Library '{}' is not of the form path/to/File.sol:Name", fq_name),
    };
    map.insert(library_link_pattern(fq_name), name.to_string());
  }
  Ok(map)
}
