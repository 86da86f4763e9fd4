//! Skirmish Lobby - Command-line tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lobby-tools")]
#[command(about = "Lobby inspection and spawn file generation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print rank and launch readiness of a lobby
    Rank {
        /// Path to lobby file (RON)
        lobby: PathBuf,
    },
    /// Check whether a lobby can be launched
    Validate {
        /// Path to lobby file (RON)
        lobby: PathBuf,
    },
    /// Write spawn.ini and spawnmap.ini for a lobby
    Launch {
        /// Path to lobby file (RON)
        #[arg(long)]
        lobby: PathBuf,
        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// Override the lobby's seed
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn run(command: Commands) -> lobby_tools::Result<()> {
    match command {
        Commands::Rank { lobby } => {
            let session = lobby_tools::inspect::load_session(&lobby)?;
            let report = lobby_tools::inspect::inspect(&session);
            println!("{}", lobby_tools::inspect::report_json(&report)?);
        }
        Commands::Validate { lobby } => {
            let session = lobby_tools::inspect::load_session(&lobby)?;
            session.validate().map_err(lobby_core::error::LobbyError::from)?;
            tracing::info!("{} can be launched", lobby.display());
        }
        Commands::Launch { lobby, out, seed } => {
            let mut session = lobby_tools::inspect::load_session(&lobby)?;
            if let Some(seed) = seed {
                session.set_seed(seed);
            }
            let plan = lobby_tools::inspect::launch_offline(&mut session, &out, rand::random())?;
            tracing::info!("Launch files written to {} (seed {})", out.display(), plan.seed);
        }
    }
    Ok(())
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
