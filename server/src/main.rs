use clap::Parser;
use log::{error, info};
use server::layout::MazeLayout;
use server::network::{Server, ServerConfig, WorldMode};
use shared::DEFAULT_PORT;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Maximum number of simultaneous connections
    #[arg(short, long, default_value = "32")]
    max_clients: usize,

    /// Give every connection its own maze instead of one shared world
    #[arg(long)]
    isolated: bool,

    /// Leave a '*' trail on cells the player has left
    #[arg(long)]
    trail: bool,

    /// Load the starting maze from a text file
    #[arg(long, value_name = "FILE")]
    maze: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let layout = match &args.maze {
        Some(path) => {
            info!("Loading maze from {}", path.display());
            MazeLayout::load(path)?
        }
        None => MazeLayout::reference()?,
    };

    let config = ServerConfig {
        addr: format!("{}:{}", args.host, args.port),
        max_clients: args.max_clients,
        world: if args.isolated {
            WorldMode::Isolated
        } else {
            WorldMode::Shared
        },
        trail: args.trail,
        layout,
    };

    info!("Maze Server is running......");
    let server = Server::bind(config).await?;

    let shutdown = server.shutdown_signal();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, shutting down gracefully...");
                shutdown.trigger();
            }
            Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    server.run().await?;

    Ok(())
}
