use std::path::PathBuf;

use argkit_core::{CommandSchema, Namespace, ParseMode};
use argkit_loader::load_schema;
use clap::{Args, Parser, Subcommand};
use tracing::debug;

/// Output encoding for parsed namespaces.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "argkit", version)]
#[command(about = "Validate argument schema documents and parse command lines against them")]
struct Cli {
    /// Log filter directive (e.g. `debug`, `argkit_core=trace`). RUST_LOG wins when set.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate one or more schema documents.
    Validate(ValidateArgs),
    /// Parse arguments against a schema document and print the namespace.
    Parse(ParseArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Schema documents (.yaml, .yml or .json).
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Schema document (.yaml, .yml or .json).
    #[arg(long)]
    schema: PathBuf,
    /// Shell-style command line to split and parse instead of TOKENS.
    #[arg(long, conflicts_with = "tokens")]
    line: Option<String>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Raw argument tokens, given after `--`.
    #[arg(last = true)]
    tokens: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.parse().unwrap_or_default()),
        )
        .init();

    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Parse(args) => run_parse(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let mut commands = 0;
    for path in &args.inputs {
        let schema = load_schema(path).map_err(|err| format!("'{}': {err}", path.display()))?;
        let count = count_commands(&schema);
        debug!(path = %path.display(), commands = count, "Validated schema document");
        commands += count;
    }
    println!(
        "Validated {} schema document(s) defining {} command(s).",
        args.inputs.len(),
        commands
    );
    Ok(())
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let schema = load_schema(&args.schema)
        .map_err(|err| format!("Failed to load '{}': {err}", args.schema.display()))?;

    let namespace = match &args.line {
        Some(line) => schema.parse_line(line),
        None => schema.parse_arguments(args.tokens),
    }
    .map_err(|err| err.to_string())?;

    println!("{}", format_namespace(&namespace, args.format)?);
    Ok(())
}

fn format_namespace(namespace: &Namespace, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(namespace)
            .map_err(|err| format!("Failed to serialize namespace: {err}")),
        CliOutputFormat::Yaml => serde_yaml::to_string(namespace)
            .map(|yaml| yaml.trim_end().to_string())
            .map_err(|err| format!("Failed to serialize namespace: {err}")),
    }
}

/// The command itself plus every command nested below it.
fn count_commands(command: &CommandSchema) -> usize {
    match command.parse_mode() {
        ParseMode::Command => 1 + command.subcommands().iter().map(count_commands).sum::<usize>(),
        ParseMode::Operand => 1,
    }
}
