//! CLI entry point for folio

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_rs::{commands, server, Site};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Index a directory of markdown posts and publish it as a blog", long_about = None)]
struct Cli {
    /// Set the site directory (defaults to current directory)
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
    /// Build the static site into the public directory
    #[command(alias = "b")]
    Build {
        /// Rebuild when posts, static files or the config change
        #[arg(short, long)]
        watch: bool,
    },

    /// Start a local server that renders pages on request
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },

    /// List posts, newest first
    List,

    /// Print the slug of every post
    Routes,

    /// Show a single post
    Show {
        /// Slug of the post
        slug: String,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,
    },

    /// Remove the public directory
    Clean,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio_rs=debug,info"
    } else {
        "folio_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read the current directory")?,
    };
    let site = Site::new(&base_dir)?;

    match cli.command {
        Commands::Build { watch } => {
            tracing::info!("Building site...");
            site.build()?;
            println!("Generated successfully!");

            if watch {
                let site = site.clone();
                tokio::task::spawn_blocking(move || commands::build::watch(&site)).await??;
            }
        }

        Commands::Serve { port, ip, r#static } => {
            tracing::info!("Starting server at http://{}:{}", ip, port);
            server::start(&site, &ip, port, !r#static).await?;
        }

        Commands::List => commands::list::run(&site)?,

        Commands::Routes => commands::routes::run(&site)?,

        Commands::Show { slug } => commands::show::run(&site, &slug)?,

        Commands::New { title } => {
            tracing::info!("Creating new post with title: {}", title);
            site.new_post(&title)?;
        }

        Commands::Clean => {
            tracing::info!("Cleaning public folder...");
            site.clean()?;
            println!("Cleaned successfully!");
        }
    }

    Ok(())
}
