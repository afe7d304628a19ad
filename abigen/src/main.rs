use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cmds;

#[derive(Parser)]
#[command(name = "abigen")]
#[command(about = "Contract binding generator for Rust", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /* Generate Rust bindings from contract ABIs */
    Bind {
        /* JSON ABI files, one per contract */
        #[arg(long = "abi", value_name = "FILE", required = true)]
        abi: Vec<PathBuf>,

        /* Bytecode files, paired with --abi in order */
        #[arg(long = "bin", value_name = "FILE")]
        bin: Vec<PathBuf>,

        /* Contract names, overriding the ABI file stems in order */
        #[arg(long = "type", value_name = "NAME")]
        types: Vec<String>,

        /* Fully qualified library names (path/to/File.sol:Library) */
        #[arg(long = "lib", value_name = "FQNAME")]
        libs: Vec<String>,

        /* Name of the generated module */
        #[arg(long = "pkg", value_name = "NAME", default_value = "bindings")]
        pkg: String,

        /* Output file, stdout when absent */
        #[arg(short = 'o', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /* Skip pretty-printing of the generated code */
        #[arg(long = "no-format")]
        no_format: bool,

        /* Enable verbose output */
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },

    /* Print the normalized generation unit as JSON */
    Inspect {
        /* JSON ABI files, one per contract */
        #[arg(long = "abi", value_name = "FILE", required = true)]
        abi: Vec<PathBuf>,

        /* Bytecode files, paired with --abi in order */
        #[arg(long = "bin", value_name = "FILE")]
        bin: Vec<PathBuf>,

        /* Contract names, overriding the ABI file stems in order */
        #[arg(long = "type", value_name = "NAME")]
        types: Vec<String>,

        /* Fully qualified library names (path/to/File.sol:Library) */
        #[arg(long = "lib", value_name = "FQNAME")]
        libs: Vec<String>,
    },

    /* Print the signature -> selector table of contract ABIs */
    Selectors {
        /* JSON ABI files */
        #[arg(long = "abi", value_name = "FILE", required = true)]
        abi: Vec<PathBuf>,

        /* Contract names, overriding the ABI file stems in order */
        #[arg(long = "type", value_name = "NAME")]
        types: Vec<String>,

        /* Print as JSON instead of a table */
        #[arg(long = "json")]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bind {
            abi,
            bin,
            types,
            libs,
            pkg,
            out,
            no_format,
            verbose,
        } => {
            init_logging(verbose);
            let args = cmds::bind::BindArgs {
                abi,
                bin,
                types,
                libs,
                pkg,
                out,
                format: !no_format,
            };
            cmds::bind::run(args)?;
        }

        Commands::Inspect {
            abi,
            bin,
            types,
            libs,
        } => {
            init_logging(false);
            cmds::inspect::run(abi, bin, types, libs)?;
        }

        Commands::Selectors { abi, types, json } => {
            init_logging(false);
            cmds::selectors::run(abi, types, json)?;
        }
    }

    Ok(())
}
