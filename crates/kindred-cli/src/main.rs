use anyhow::Result;
use clap::Parser;
use kindred_core::ContentDomain;
use kindred_etl::Config;
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "kindred", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the track catalog CSV (default: data/spotify_sample.csv)
    #[arg(long, global = true)]
    tracks: Option<PathBuf>,

    /// Path to the title catalog CSV (default: data/netflix_movies.csv)
    #[arg(long, global = true)]
    titles: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Find items similar to a given item
    ///
    /// Loads both catalogs, embeds them, and ranks every item in the chosen
    /// collection by cosine similarity to the item with the given id. The
    /// query item itself scores 100% and is not listed.
    ///
    /// Collections: spotify (tracks), netflix (titles).
    ///
    /// Example: kindred similar spotify spotify_12 --top-k 10
    Similar {
        /// Collection to search (spotify, netflix)
        collection: ContentDomain,
        /// Id of the query item, e.g. spotify_0 (see `kindred list`)
        id: String,
        /// Number of results, counting the query item (default from config)
        #[arg(long, short = 'k')]
        top_k: Option<usize>,
        /// Exclude the query item and return top-k neighbours
        #[arg(long)]
        exclude_self: bool,
    },
    /// List item ids and titles in a collection
    List {
        /// Collection to list (spotify, netflix)
        collection: ContentDomain,
        /// Maximum number of items to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Cluster a collection and summarize each cluster
    ///
    /// Runs k-means over the collection's vectors, reports the silhouette
    /// score, and describes each cluster by its most common categories,
    /// average numeric fields, and a few sample items. With --points it
    /// prints each item's 2-D PCA coordinates as CSV instead, ready to plot.
    Clusters {
        /// Collection to cluster (spotify, netflix)
        collection: ContentDomain,
        /// Number of clusters (default from config); `auto` picks the k
        /// with the best silhouette score
        #[arg(long)]
        k: Option<ClusterCount>,
        /// Print `id,cluster,x,y` for every item instead of summaries
        #[arg(long)]
        points: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults if it does not exist
    Init,
}

/// `--k` value: a fixed count or `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClusterCount {
    Fixed(usize),
    Auto,
}

impl std::str::FromStr for ClusterCount {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        s.parse()
            .map(Self::Fixed)
            .map_err(|_| format!("expected a number or 'auto', got {s:?}"))
    }
}

fn setup_logging(config: &Config) {
    match twyg::setup(config.logging.clone()) {
        Ok(_) => {}
        Err(error) => eprintln!("Could not set up logging: {error:?}"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?.with_paths(cli.tracks, cli.titles);
    setup_logging(&config);

    match cli.command {
        Commands::Similar {
            collection,
            id,
            top_k,
            exclude_self,
        } => {
            let top_k = top_k.unwrap_or(config.top_k);
            commands::similar::run(&config, collection, &id, top_k, exclude_self)?;
        }
        Commands::List { collection, limit } => {
            commands::list::run(&config, collection, limit)?;
        }
        Commands::Clusters {
            collection,
            k,
            points,
        } => {
            let k = match k {
                Some(ClusterCount::Fixed(k)) => Some(k),
                Some(ClusterCount::Auto) => None,
                None => Some(config.n_clusters),
            };
            commands::clusters::run(&config, collection, k, points)?;
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => commands::config::show_config()?,
            ConfigCommands::Path => commands::config::show_path()?,
            ConfigCommands::Example => commands::config::show_example()?,
            ConfigCommands::Init => commands::config::init_config()?,
        },
    }

    Ok(())
}
