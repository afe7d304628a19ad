/* Bind command - generate bindings for a set of contracts */

use super::common::{library_map, load_inputs};
use abigen::{BindOptions, bind};
use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

pub struct BindArgs {
  pub abi: Vec<PathBuf>,
  pub bin: Vec<PathBuf>,
  pub types: Vec<String>,
  pub libs: Vec<String>,
  pub pkg: String,
  pub out: Option<PathBuf>,
  pub format: bool,
}

/* Execute the bind command */
pub fn run(args: BindArgs) -> anyhow::Result<()> {
  let inputs = load_inputs(&args.abi, &args.bin, &args.types)?;
  let libraries = library_map(&args.libs)?;
  let options = BindOptions {
    package: args.pkg,
    format: args.format,
  };

  let code = bind(&inputs, &libraries, &options).context("Failed to generate bindings")?;

  match &args.out {
    Some(path) => {
      if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
          .with_context(|| format!("Failed to create directory {}", parent.display()))?;
      }
      fs::write(path, &code).with_context(|| format!("Failed to write {}", path.display()))?;
      info!(
        contracts = inputs.len(),
        output = %path.display(),
        "wrote bindings"
      );
    }
    None => {
      let mut stdout = std::io::stdout().lock();
      stdout.write_all(code.as_bytes()).context("Failed to write bindings to stdout")?;
      stdout.flush()?;
    }
  }

  Ok(())
}
