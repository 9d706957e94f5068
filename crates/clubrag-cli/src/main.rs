mod config;
mod input;
mod session;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clubrag_agent::{build_generator, RagEngine, RagEngineConfig};
use clubrag_core::{EventDetails, RagError};
use clubrag_memory::build_embedder;
use tracing_subscriber::EnvFilter;

use crate::config::ClubragConfig;
use crate::input::{split_hashtags, TrendFile};
use crate::session::{bootstrap, Bootstrap};

#[derive(Parser)]
#[command(
    name = "clubrag",
    about = "Knowledge store and social media content assistant for student clubs"
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "clubrag.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the knowledge base from the organization profile
    Ingest {
        /// Profile JSON file (overrides config)
        #[arg(long)]
        profile: Option<PathBuf>,
    },
    /// Manage trend signals
    Trends {
        #[command(subcommand)]
        action: TrendsAction,
    },
    /// Show the chunks closest to a query
    Search {
        query: String,
        /// Number of results
        #[arg(short, default_value_t = 3)]
        k: usize,
    },
    /// Draft social media content for an event
    Generate {
        #[arg(long)]
        name: String,
        #[arg(long)]
        about: String,
        #[arg(long, default_value = "")]
        date: String,
        #[arg(long, default_value = "")]
        time: String,
        #[arg(long, default_value = "")]
        venue: String,
        /// Comma-separated hashtags to include
        #[arg(long)]
        hashtags: Option<String>,
        /// JSON file of trending videos or hashtags
        #[arg(long)]
        trends: Option<PathBuf>,
    },
    /// Show knowledge base counters
    Status,
}

#[derive(Subcommand)]
enum TrendsAction {
    /// Append trending hashtags to the knowledge base
    Add {
        /// Comma-separated hashtags
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        hashtags: Option<String>,
        /// JSON file of hashtags or trending videos
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = ClubragConfig::load(&cli.config).await?;
    config.fill_api_keys(|name| std::env::var(name).ok());

    let engine = RagEngine::new(RagEngineConfig {
        embedder: build_embedder(&config.embedding)?,
        generator: build_generator(config.model.clone()),
        chunking: config.chunking,
    })?;

    match cli.command {
        Commands::Ingest { profile } => {
            let path = profile.unwrap_or_else(|| config.profile_path.clone());
            let count = engine.load_profile(&path).await?;
            engine.persist(&config.snapshot_path).await?;
            println!("Ingested {count} chunk(s) from {}", path.display());
        }
        Commands::Trends { action } => match action {
            TrendsAction::Add { hashtags, file } => {
                let tags = match (hashtags, file) {
                    (Some(raw), _) => split_hashtags(&raw),
                    (None, Some(path)) => TrendFile::load(&path).await?.hashtags(),
                    (None, None) => Vec::new(),
                };
                if tags.is_empty() {
                    println!("No hashtags to add.");
                    return Ok(());
                }

                bootstrap(&engine, &config.profile_path, &config.snapshot_path).await?;
                let added = engine.add_trend_signals(&tags).await?;
                engine.persist(&config.snapshot_path).await?;
                println!(
                    "Added {} hashtag(s) in {added} chunk(s); knowledge base now holds {} chunk(s)",
                    tags.len(),
                    engine.len().await
                );
            }
        },
        Commands::Search { query, k } => {
            bootstrap(&engine, &config.profile_path, &config.snapshot_path).await?;
            let results = engine.search(&query, k).await?;
            if results.is_empty() {
                println!("No results.");
            }
            for (rank, r) in results.iter().enumerate() {
                println!(
                    "{}. [{:.4}] ({}) {}",
                    rank + 1,
                    r.distance,
                    r.chunk.section(),
                    r.chunk.content()
                );
            }
        }
        Commands::Generate {
            name,
            about,
            date,
            time,
            venue,
            hashtags,
            trends,
        } => {
            let mut tags = hashtags.as_deref().map(split_hashtags).unwrap_or_default();
            let trend_file = match trends {
                Some(path) => Some(TrendFile::load(&path).await?),
                None => None,
            };
            let items = trend_file.as_ref().map(TrendFile::items).unwrap_or_default();
            if let Some(file @ TrendFile::Hashtags(_)) = &trend_file {
                for tag in file.hashtags() {
                    if !tags.contains(&tag) {
                        tags.push(tag);
                    }
                }
            }

            bootstrap(&engine, &config.profile_path, &config.snapshot_path).await?;
            let event = EventDetails {
                name,
                about,
                date,
                time,
                venue,
            };
            match engine.generate_content(&event, &tags, items).await {
                Ok(text) => println!("{text}"),
                Err(e @ RagError::Generation(_)) => {
                    eprintln!("Content generation failed, please try again.");
                    return Err(e.into());
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Status => {
            let source = bootstrap(&engine, &config.profile_path, &config.snapshot_path).await?;
            let stats = engine.stats().await;
            match source {
                Bootstrap::Restored(n) => println!("Loaded from:      snapshot ({n} chunk(s))"),
                Bootstrap::Rebuilt(n) => println!("Loaded from:      profile ({n} chunk(s))"),
            }
            println!("Profile sections: {}", stats.profile_sections);
            println!("Chunks:           {}", stats.chunks);
            println!("Indexed rows:     {}", stats.indexed);
            match stats.dimension {
                Some(d) => println!("Dimension:        {d}"),
                None => println!("Dimension:        (no index)"),
            }
            println!("Snapshot:         {}", config.snapshot_path.display());
        }
    }

    Ok(())
}
