/* Selectors command - print function selectors of contract ABIs */

use super::common::load_inputs;
use abigen_types::Abi;
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::PathBuf;

/* Contract name -> canonical signature -> hex selector */
pub type SelectorTable = BTreeMap<String, BTreeMap<String, String>>;

/* Execute the selectors command */
pub fn run(abi: Vec<PathBuf>, types: Vec<String>, json: bool) -> anyhow::Result<()> {
  let table = collect(&abi, &types)?;

  if json {
    println!("{}", serde_json::to_string_pretty(&table)?);
    return Ok(());
  }

  for (contract, selectors) in &table {
    println!("{}:", contract);
    for (signature, selector) in selectors {
      println!("  0x{}  {}", selector, signature);
    }
  }
  Ok(())
}

fn collect(abi: &[PathBuf], types: &[String]) -> anyhow::Result<SelectorTable> {
  let mut table = SelectorTable::new();
  for input in load_inputs(abi, &[], types)? {
    let parsed = Abi::from_json(&input.abi)
      .with_context(|| format!("Failed to parse ABI of {}", input.name))?;
    let selectors = parsed
      .functions
      .iter()
      .map(|function| (function.signature(), function.selector_hex()))
      .collect();
    table.insert(input.name, selectors);
  }
  Ok(table)
}
