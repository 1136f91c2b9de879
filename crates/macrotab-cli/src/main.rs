//! macrotab CLI
//!
//! Generates C lookup tables from `#define` families in system headers.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use macrotab_core::{Config, EntryOrder, TableShape, TableTarget};
use macrotab_gen::{Pipeline, RunOptions, TargetOutcome, WriteStatus};
use macrotab_header::HeaderResolver;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "macrotab")]
#[command(author, version, about = "C macro table generator", long_about = None)]
struct Cli {
    /// Configuration file (YAML or JSON); built-in targets when omitted
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Resolve and render, but do not write output files
    #[arg(long, global = true)]
    dry_run: bool,

    /// Log more (repeat for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the path the compiler uses for #include <HEADER>
    Resolve {
        /// Header as written between angle brackets
        #[arg(value_name = "HEADER")]
        header: String,

        /// pkg-config package providing search paths
        #[arg(short, long)]
        package: Option<String>,

        /// Additional include directory
        #[arg(short = 'I', long = "include", value_name = "DIR")]
        include: Vec<PathBuf>,
    },

    /// Generate the named targets
    Run {
        /// Target names (see `list`)
        #[arg(value_name = "TARGET", required = true)]
        targets: Vec<String>,
    },

    /// Generate every configured target
    All,

    /// List configured targets
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Generate a table for a header not in the configuration
    Generate(GenerateArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Header as written between angle brackets
    #[arg(long, value_name = "HEADER")]
    header: String,

    /// pkg-config package providing search paths
    #[arg(short, long)]
    package: Option<String>,

    /// Required macro-name prefix, stripped from emitted names
    #[arg(long, default_value = "")]
    prefix: String,

    /// Output file
    #[arg(short, long)]
    output: PathBuf,

    /// Struct type name (struct-array shape)
    #[arg(long, requires_all = ["value_type", "array"], conflicts_with = "flat_array")]
    struct_type: Option<String>,

    /// Value field type (struct-array shape)
    #[arg(long)]
    value_type: Option<String>,

    /// Array name (struct-array shape)
    #[arg(long)]
    array: Option<String>,

    /// Sort struct-array rows by value
    #[arg(long)]
    sorted: bool,

    /// Array name (flat-array shape)
    #[arg(long, value_name = "ARRAY")]
    flat_array: Option<String>,

    /// Stripped name of the macro bounding the flat array
    #[arg(long, requires = "flat_array")]
    bound: Option<String>,

    /// Provenance comment for the first line
    #[arg(long)]
    comment: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::default(),
    };
    debug!("{} targets configured", config.targets.len());
    let options = RunOptions {
        dry_run: cli.dry_run,
    };

    match cli.command {
        Commands::Resolve {
            header,
            package,
            include,
        } => {
            cmd_resolve(&config, &header, package.as_deref(), include)?;
        }
        Commands::Run { targets } => {
            cmd_run(&config, &targets, options)?;
        }
        Commands::All => {
            let names: Vec<String> = config.targets.iter().map(|t| t.name.clone()).collect();
            cmd_run(&config, &names, options)?;
        }
        Commands::List { format } => {
            cmd_list(&config, &format)?;
        }
        Commands::Generate(args) => {
            cmd_generate(&config, args, options)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolver(config: &Config) -> Result<HeaderResolver> {
    HeaderResolver::from_config(&config.toolchain).context("setting up the C toolchain")
}

fn cmd_resolve(config: &Config, header: &str, package: Option<&str>, include: Vec<PathBuf>) -> Result<()> {
    let mut resolver = resolver(config)?;
    for dir in include {
        resolver.add_include_path(dir);
    }

    let path = resolver
        .resolve(header, package)
        .with_context(|| format!("resolving <{}>", header))?;
    println!("{}", path.display());
    Ok(())
}

fn cmd_run(config: &Config, names: &[String], options: RunOptions) -> Result<()> {
    let mut targets = Vec::with_capacity(names.len());
    for name in names {
        match config.target(name) {
            Some(target) => targets.push(target),
            None => bail!(
                "unknown target '{}' (available: {})",
                name,
                target_names(config)
            ),
        }
    }

    let pipeline = Pipeline::new(resolver(config)?, options);
    for target in targets {
        let output = config.output_path(target);
        let outcome = pipeline
            .run(target, &output)
            .with_context(|| format!("generating target '{}'", target.name))?;
        print_outcome(&outcome);
    }

    Ok(())
}

fn cmd_list(config: &Config, format: &str) -> Result<()> {
    if format == "json" {
        let targets: Vec<_> = config
            .targets
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "header": t.header,
                    "package": t.package,
                    "prefix": t.prefix,
                    "array": t.shape.array_name(),
                    "output": config.output_path(t),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&targets)?);
        return Ok(());
    }

    for target in &config.targets {
        let shape = match &target.shape {
            TableShape::StructArray { .. } => "struct array",
            TableShape::FlatArray { .. } => "flat array",
        };
        println!(
            "{:<12} <{}> {}* -> {} ({}: {})",
            target.name,
            target.header,
            target.prefix,
            config.output_path(target).display(),
            shape,
            target.shape.array_name()
        );
    }
    Ok(())
}

fn cmd_generate(config: &Config, args: GenerateArgs, options: RunOptions) -> Result<()> {
    let shape = match (args.flat_array, args.struct_type) {
        (Some(array_name), None) => TableShape::FlatArray {
            array_name,
            bound: args.bound,
        },
        (None, Some(type_name)) => TableShape::StructArray {
            type_name,
            value_type: args.value_type.unwrap_or_default(),
            array_name: args.array.unwrap_or_default(),
            order: if args.sorted {
                EntryOrder::Ascending
            } else {
                EntryOrder::Encounter
            },
        },
        _ => bail!("choose exactly one of --flat-array or --struct-type"),
    };

    let mut target = TableTarget {
        name: "generate".to_string(),
        header: args.header,
        package: args.package,
        prefix: args.prefix,
        shape,
        output: args.output,
        comment: args.comment,
    };
    if target.comment.is_none() {
        target.comment = Some(adhoc_provenance(&target));
    }

    let pipeline = Pipeline::new(resolver(config)?, options);
    let outcome = pipeline
        .run(&target, &target.output)
        .with_context(|| format!("generating a table from <{}>", target.header))?;
    print_outcome(&outcome);
    Ok(())
}

/// Provenance line naming the exact command that produced an ad-hoc table
fn adhoc_provenance(target: &TableTarget) -> String {
    let mut command = format!("macrotab generate --header {}", target.header);
    if let Some(package) = &target.package {
        command.push_str(&format!(" --package {}", package));
    }
    if !target.prefix.is_empty() {
        command.push_str(&format!(" --prefix {}", target.prefix));
    }
    format!("// This file was generated by `{}`. Do not edit.", command)
}

fn target_names(config: &Config) -> String {
    config
        .targets
        .iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_outcome(outcome: &TargetOutcome) {
    let status = match outcome.status {
        WriteStatus::Written => "written",
        WriteStatus::Unchanged => "unchanged",
        WriteStatus::Skipped => "dry run, not written",
    };
    println!(
        "{}: {} entries, {} aliases ({} dropped) from {}",
        outcome.target,
        outcome.entries,
        outcome.aliases,
        outcome.unresolved,
        outcome.header.display()
    );
    println!("   {} ({})", outcome.output.display(), status);
}
