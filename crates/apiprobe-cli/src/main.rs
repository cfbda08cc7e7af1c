//! apiprobe CLI - derive HTTP test cases from an API definition

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use apiprobe_core::{Config, TestCase, generate_schema, to_http_file};
use apiprobe_runner::Suite;
use apiprobe_runner::preparator;

#[derive(Parser)]
#[command(name = "apiprobe")]
#[command(about = "Derive negative and positive HTTP test cases from an API definition")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate test cases
    Prepare {
        /// Config file (default: .apiprobe.toml)
        #[arg(short, long)]
        config: Option<String>,

        /// Run only this preparator (repeatable)
        #[arg(long)]
        only: Vec<String>,
    },

    /// Initialize config file
    Init,

    /// List preparators in run order
    Preparators,

    /// Export JSON Schema for the emitted test case list
    Schema,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Http,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(3)
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Prepare { config, only } => {
            let cfg = if let Some(path) = config {
                Config::load(Path::new(&path))?
            } else {
                Config::load_default()?
            };

            let suite = Suite::new(&cfg)?.only(&only)?;

            if cli.verbose {
                eprintln!("Config:");
                eprintln!("  definition:  {}", cfg.definition.display());
                eprintln!("  operations:  {}", suite.operations().len());
                eprintln!("  tokens:      {}", cfg.tokens.len());
                eprintln!("  preparators: {}", suite.preparator_names().join(", "));
                eprintln!();
            }
            for skipped in suite.skipped() {
                eprintln!("Warning: {skipped}");
            }

            let cases = suite.prepare()?;

            match cli.output {
                OutputFormat::Terminal => print_terminal(&cases),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&cases)?),
                OutputFormat::Http => print!("{}", to_http_file(&cases, "base_url")),
            }

            // Nothing to test usually means filters or definition are off
            if cases.is_empty() {
                eprintln!("Warning: no test cases were generated. Check definition and filters.");
                return Ok(1);
            }
            Ok(0)
        }

        Commands::Init => {
            let config_path = ".apiprobe.toml";
            if Path::new(config_path).exists() {
                eprintln!("{config_path} already exists");
                return Ok(1);
            }

            std::fs::write(config_path, Config::example())?;
            println!("Created {config_path}");
            println!("\nEdit the file to configure:");
            println!("  - definition: path to the normalized API definition");
            println!("  - filters: operations and preparators to include or exclude");
            println!("  - tokens: credentials for the 401/403 preparators");
            println!("  - preparators: per-preparator options");
            Ok(0)
        }

        Commands::Preparators => {
            for name in preparator::NAMES {
                println!("{name}");
            }
            Ok(0)
        }

        Commands::Schema => {
            println!("{}", generate_schema()?);
            Ok(0)
        }
    }
}

fn print_terminal(cases: &[TestCase]) {
    let mut current = "";
    for case in cases {
        if case.preparator != current {
            current = &case.preparator;
            println!("\n{current}:");
        }
        println!(
            "  {} {} -> {}  ({})",
            case.request.method, case.request.path, case.expected.status, case.name
        );
    }
    println!("\nTotal: {} test cases", cases.len());
}
