/* Inspect command - dump the normalized generation unit */

use super::common::{library_map, load_inputs};
use abigen::{GenerationUnit, build_unit};
use anyhow::Context;
use std::path::PathBuf;

/* Execute the inspect command */
pub fn run(
  abi: Vec<PathBuf>,
  bin: Vec<PathBuf>,
  types: Vec<String>,
  libs: Vec<String>,
) -> anyhow::Result<()> {
  let unit = load_unit(&abi, &bin, &types, &libs)?;
  println!("{}", serde_json::to_string_pretty(&unit)?);
  Ok(())
}

fn load_unit(
  abi: &[PathBuf],
  bin: &[PathBuf],
  types: &[String],
  libs: &[String],
) -> anyhow::Result<GenerationUnit> {
  let inputs = load_inputs(abi, bin, types)?;
  let libraries = library_map(libs)?;
  build_unit(&inputs, &libraries, "bindings").context("Failed to normalize contracts")
}
