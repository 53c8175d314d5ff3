//! pimctl - Activate Azure PIM eligible roles from the command line
//!
//! This CLI enables engineers to:
//! - List the roles they are eligible for across every subscription
//! - See which roles are currently active
//! - Pick an eligible role and self-activate it for a limited time

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pimctl::commands;
use pimctl::commands::activate::ActivateArgs;
use pimctl::context::{AppContext, GlobalArgs};
use pimctl::error::CliResult;

/// pimctl - Azure Privileged Identity Management self-activation
#[derive(Parser)]
#[command(name = "pimctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Used when no subcommand is given
    #[command(flatten)]
    activate: ActivateArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick an eligible role and activate it (default)
    Activate(ActivateArgs),

    /// List eligible roles
    List(commands::list::ListArgs),

    /// Show currently active role assignments
    Status(commands::status::StatusArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Library-level tracing is opt-in through RUST_LOG.
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let ctx = AppContext::build(&cli.global)?;

    match cli.command {
        None => commands::activate::execute(cli.activate, &ctx).await,
        Some(Commands::Activate(args)) => commands::activate::execute(args, &ctx).await,
        Some(Commands::List(args)) => commands::list::execute(args, &ctx).await,
        Some(Commands::Status(args)) => commands::status::execute(args, &ctx).await,
    }
}
