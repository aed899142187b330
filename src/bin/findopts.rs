//! findopts — build ORM find-options from a builder chain
//!
//! # Usage
//!
//! ```bash
//! # Print the options document
//! findopts 'select("id").where("age").gte(18).limit(5)'
//!
//! # Read the chain from stdin
//! echo 'where("id").in(1, 2)' | findopts -
//!
//! # Show how a chain is interpreted
//! findopts explain 'where({ role: "admin" }).order("name", "ASC")'
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use findopts::config::Config;
use findopts::operators::{OPERATORS, OperatorKind};
use findopts::prelude::*;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "findopts")]
#[command(version)]
#[command(about = "Build ORM find-options documents from a fluent builder chain", long_about = None)]
#[command(after_help = "EXAMPLES:
    findopts 'select(\"id\").where(\"status\", \"active\").limit(10)'
    findopts 'where(\"age\").gte(18).lt(65)' --compact
    findopts explain 'where({ role: \"admin\" }).order(\"name\", \"ASC\")'")]
struct Cli {
    /// The builder chain to evaluate ("-" reads stdin)
    chain: Option<String>,

    /// Print the document on a single line
    #[arg(short, long)]
    compact: bool,

    /// Fail on operator calls made before any where(field)
    #[arg(short, long)]
    strict: bool,

    /// Config file path
    #[arg(long, env = "FINDOPTS_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the parsed calls and the resulting document
    Explain {
        /// The builder chain to explain
        chain: String,
    },
    /// Show the operator reference
    Operators,
}

/// Settings resolved from flags and the config file.
struct Settings {
    pretty: bool,
    strict: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "findopts=debug" } else { "findopts=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).context("failed to load config")?;
    let settings = Settings {
        pretty: config.output.pretty && !cli.compact,
        strict: config.builder.strict || cli.strict,
    };

    match &cli.command {
        Some(Commands::Explain { chain }) => explain_chain(&read_chain(chain)?, &settings),
        Some(Commands::Operators) => {
            show_operators();
            Ok(())
        }
        None => match &cli.chain {
            Some(chain) => build_chain(&read_chain(chain)?, &settings),
            None => {
                println!("{}", "findopts — ORM find-options builder".cyan().bold());
                println!();
                println!("Usage: findopts <CHAIN> [OPTIONS]");
                println!();
                println!("Try: findopts --help");
                Ok(())
            }
        },
    }
}

fn read_chain(arg: &str) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read chain from stdin")?;
    Ok(input)
}

fn render(opts: &FindOptions, pretty: bool) -> Result<String> {
    let json = if pretty {
        opts.to_json_pretty()?
    } else {
        opts.to_json()?
    };
    Ok(json)
}

fn build_chain(input: &str, settings: &Settings) -> Result<()> {
    let opts = findopts::parse(input)?.build(settings.strict)?;
    println!("{}", render(&opts, settings.pretty)?);
    Ok(())
}

fn explain_chain(input: &str, settings: &Settings) -> Result<()> {
    println!("{}", "findopts Chain Explanation".cyan().bold());
    println!();
    println!("{} {}", "Chain:".dimmed(), input.trim().yellow());
    println!();

    let chain = findopts::parse(input)?;

    println!("{}", "Calls:".green().bold());
    for (i, call) in chain.calls().iter().enumerate() {
        let args: Vec<String> = call.args.iter().map(Value::to_string).collect();
        let note = match Operator::from_method(&call.method) {
            Some(op) => format!("→ {}", op.marker()).cyan(),
            None => String::new().normal(),
        };
        println!(
            "  {:>2}. {}({}) {}",
            i + 1,
            call.method.white(),
            args.join(", ").yellow(),
            note
        );
    }

    let builder = chain.apply(QueryBuilder::new(), settings.strict)?;

    println!();
    match builder.context() {
        Some(field) => println!("{} {}", "Active field:".dimmed(), field.white()),
        None => println!("{} {}", "Active field:".dimmed(), "(none)".dimmed()),
    }

    let opts = builder.build();
    println!();
    println!("{}", "Options:".green().bold());
    if opts.is_empty() {
        println!("  {}", "(empty)".dimmed());
    } else {
        println!("{}", render(&opts, settings.pretty)?);
    }
    Ok(())
}

fn show_operators() {
    println!("{}", "findopts Operator Reference".cyan().bold());
    println!();

    println!(
        "{:12} {:14} {:14} {}",
        "Method".white().bold(),
        "Rust method".white().bold(),
        "Marker".white().bold(),
        "Arguments".white().bold()
    );
    println!("{}", "─".repeat(60).dimmed());

    for def in OPERATORS.iter() {
        let args = match def.kind {
            OperatorKind::Comparator => "one value",
            OperatorKind::Array => "list of values",
        };
        println!(
            "{:12} {:14} {:14} {}",
            def.method.cyan().bold(),
            def.rust_method.yellow(),
            def.marker.white(),
            args.dimmed()
        );
    }
}
