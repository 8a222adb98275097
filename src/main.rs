use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nmstate_handler::diagnostics::{original_message, NormalizedMessage};
use nmstate_handler::state::{filter_out_with_stats, InterfaceFilter};
use nmstate_handler::Error;
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Filter a captured `nmstatectl show` document
    FilterState(FilterStateArgs),
    /// Format raw nmstatectl error output as an enactment status message
    FormatError(InputArgs),
    /// Print the original nmstatectl output attached to a status message
    DecodeError(InputArgs),
    /// Show version information
    Version,
}

#[derive(Parser, Debug)]
struct FilterStateArgs {
    /// Glob of interface names left out of the reported current state
    #[arg(long, env = "INTERFACES_FILTER")]
    interfaces_filter: String,

    #[command(flatten)]
    input: InputArgs,
}

#[derive(Parser, Debug)]
struct InputArgs {
    /// Input file; standard input when omitted
    #[arg(long, short)]
    input: Option<PathBuf>,
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    init_tracing(args.log_json);

    match args.command {
        Commands::Version => {
            println!("nmstate-handler v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::FilterState(args) => {
            // Compiled once; an invalid pattern aborts before any input is read
            let filter = InterfaceFilter::new(&args.interfaces_filter)?;
            debug!("Interfaces filter: {}", filter);

            let current_state = read_input(&args.input)?;
            let (filtered, stats) = filter_out_with_stats(&current_state, &filter)?;
            info!(
                interfaces_removed = stats.interfaces_removed,
                routes_removed = stats.routes_removed,
                volatile_fields_removed = stats.volatile_fields_removed,
                "Filtered current state"
            );
            write_output(&filtered)
        }
        Commands::FormatError(input) => {
            let raw = read_input(&input)?;
            let message = NormalizedMessage::from_raw(&raw);
            if message.is_empty() {
                info!("Error output contained no content lines");
            }
            write_output(&message.to_string())
        }
        Commands::DecodeError(input) => {
            let status_message = read_input(&input)?;
            write_output(&original_message(&status_message))
        }
    }
}

fn init_tracing(json: bool) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    // stdout carries command results only
    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(io::stderr))
            .init();
    }
}

fn read_input(args: &InputArgs) -> Result<String, Error> {
    match &args.input {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn write_output(text: &str) -> Result<(), Error> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
