//! CLI entry point for folio

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::Folio;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "A markdown blog engine with tag and search listings", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the search index
    Build,

    /// Export the static site
    #[command(alias = "g")]
    Generate,

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Rebuild the search index when posts change
        #[arg(short, long)]
        watch: bool,
    },

    /// List site information
    List {
        /// Type of content to list (post, tag)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio=debug,info"
    } else {
        "folio=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Build => {
            let folio = Folio::new(&base_dir)?;
            tracing::info!("Generating search data...");
            folio.build()?;
        }

        Commands::Generate => {
            let folio = Folio::new(&base_dir)?;
            tracing::info!("Generating static files...");
            folio.generate()?;
        }

        Commands::Server { port, ip, watch } => {
            let folio = Folio::new(&base_dir)?;

            // Clients fetch the exported index from public_dir
            folio.build()?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            folio::server::start(&folio, &ip, port, watch).await?;
        }

        Commands::List { r#type } => {
            let folio = Folio::new(&base_dir)?;
            folio::commands::list::run(&folio, &r#type)?;
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
