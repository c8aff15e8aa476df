//! statik CLI - stage Python modules for static linking into the runtime.

mod add;
mod colors;
mod list;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "statik")]
#[command(about = "Stage Python modules for static linking into the runtime")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Register modules and their dependencies in Modules/Setup
    Add(add::AddArgs),

    /// List the module registrations in Modules/Setup
    List {
        /// Runtime source tree containing Modules/
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Attach recovery hints to statik-core errors
    let format_error = |err: anyhow::Error| -> anyhow::Error {
        if let Some(statik_err) = err.downcast_ref::<statik_core::Error>() {
            anyhow::anyhow!("{}", statik_err.with_hint())
        } else {
            err
        }
    };

    match cli.command {
        Commands::Add(args) => add::execute(&args).map_err(format_error)?,
        Commands::List { root } => list::execute(&root).map_err(format_error)?,
    }

    Ok(())
}
