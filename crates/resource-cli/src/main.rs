//! Concourse resource entry point.
//!
//! Concourse invokes resources with the step's working directory as the
//! only argument and the request JSON on stdin; the response JSON goes to
//! stdout and everything else to stderr. The container image installs this
//! one binary behind `/opt/resource/in` and `/opt/resource/out` shims.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use resource_core::{apply, fetch, APP_VERSION};
use wavefront_api::{HttpTransport, RetryPolicy, RetryTransport};

#[derive(Parser)]
#[command(
    name = "wavefront-resource",
    about = "Concourse resource for events in a Wavefront tenant",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch an existing event into the working directory (the `get` step)
    In {
        /// Directory the persisted event state is written to
        directory: PathBuf,
    },

    /// Create, start, or end an event (the `put` step)
    Out {
        /// Directory holding the step's inputs
        directory: PathBuf,
    },

    /// Print the resource version
    Version,
}

fn main() {
    let cli = Cli::parse();

    // stdout belongs to the resource protocol; all diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::In { directory } => run_in(&directory),
        Commands::Out { directory } => run_out(&directory),
        Commands::Version => {
            println!("{APP_VERSION}");
            Ok(())
        }
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn transport() -> anyhow::Result<RetryTransport<HttpTransport>> {
    Ok(RetryTransport::new(
        HttpTransport::new()?,
        RetryPolicy::default(),
    ))
}

fn run_in(directory: &Path) -> anyhow::Result<()> {
    eprintln!("{APP_VERSION}");

    let response = fetch::run(std::io::stdin().lock(), directory, transport()?)?;
    emit(&response)
}

fn run_out(directory: &Path) -> anyhow::Result<()> {
    eprintln!("{APP_VERSION}");

    let env = |name: &str| std::env::var(name).ok();
    let response = apply::run(std::io::stdin().lock(), directory, transport()?, &env)?;
    emit(&response)
}

fn emit(response: &resource_core::Response) -> anyhow::Result<()> {
    serde_json::to_writer(std::io::stdout().lock(), response)?;
    println!();
    Ok(())
}
