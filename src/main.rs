use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use taskdeck::config::Config;

mod cmd;

#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(version, about = "Workspace-backed project and task board service")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Workspace root holding state/, projects/ and standup-latest.md.
    /// Defaults to TASKDECK_WORKSPACE or the current directory.
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the board server
    Serve {
        /// Port to serve on (default from taskdeck.toml or 4400)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print a summary of projects, boards and the review queue
    Status,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "taskdeck=debug,info" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Serve { port } => {
            let config = Config::load(cli.workspace, port, cli.verbose)?;
            cmd::cmd_serve(config).await
        }
        Commands::Status => {
            let config = Config::load(cli.workspace, None, cli.verbose)?;
            cmd::cmd_status(config)
        }
    }
}
