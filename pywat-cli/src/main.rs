use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use pywat_compiler::{compile, parse, ModuleOptions};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pywat")]
#[command(about = "Compile a tiny arithmetic language to WebAssembly text")]
struct Args {
    /// Path to the source file to compile, or `-` for stdin.
    /// Compiles a built-in sample when omitted.
    file: Option<PathBuf>,

    /// What to print
    #[arg(long, value_enum, default_value_t = Emit::Body)]
    emit: Emit,

    /// Import module name for the builtin functions (module output only)
    #[arg(long, default_value = "imports")]
    namespace: String,

    /// Export name of the generated function (module output only)
    #[arg(long, default_value = "exported_func")]
    entry: String,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Emit {
    /// Slot declarations and instructions, one per line
    Body,
    /// A complete module with imports and an exported function
    Module,
    /// The lowered statement list
    Ast,
    /// The compiled program as JSON
    Json,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_source(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) if path.as_os_str() == "-" => {
            let mut src = String::new();
            io::stdin()
                .read_to_string(&mut src)
                .context("failed to read source from stdin")?;
            Ok(src)
        }
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read file '{}'", path.display())),
        None => Ok(DEFAULT_SAMPLE.trim().to_string()),
    }
}

fn run(args: Args) -> Result<()> {
    let src = read_source(args.file.as_ref())?;
    debug!(bytes = src.len(), emit = ?args.emit, "compiling");

    match args.emit {
        Emit::Ast => {
            let program = parse(&src)?;
            for stmt in &program {
                println!("{stmt:?}");
            }
        }
        Emit::Body => {
            let compiled = compile(&src)?;
            println!("{}", compiled.wat_source());
        }
        Emit::Module => {
            let compiled = compile(&src)?;
            let options = ModuleOptions {
                namespace: args.namespace,
                entry: args.entry,
            };
            print!("{}", compiled.to_module(&options));
        }
        Emit::Json => {
            let compiled = compile(&src)?;
            let json = serde_json::to_string_pretty(&compiled)
                .context("failed to serialize compiled program")?;
            println!("{json}");
        }
    }
    Ok(())
}

const DEFAULT_SAMPLE: &str = r#"
x = 3
y = x + 4 * 2
z = pow(y, 2) - abs(-7)
print(max(z, min(x, y)))
"#;
