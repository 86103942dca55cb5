use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for kindred.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (KINDRED_* prefix)
/// 3. Config file (~/.config/kindred/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the music track catalog (CSV).
    ///
    /// Can be set via:
    /// - CLI: --tracks /path/to/tracks.csv
    /// - ENV: KINDRED_TRACKS_PATH
    /// - Config: tracks_path = "/path/to/tracks.csv"
    /// - Default: data/spotify_sample.csv
    #[serde(default = "default_tracks_path")]
    pub tracks_path: PathBuf,

    /// Path to the movie/show catalog (CSV).
    ///
    /// Can be set via:
    /// - CLI: --titles /path/to/titles.csv
    /// - ENV: KINDRED_TITLES_PATH
    /// - Config: titles_path = "/path/to/titles.csv"
    /// - Default: data/netflix_movies.csv
    #[serde(default = "default_titles_path")]
    pub titles_path: PathBuf,

    /// Number of results for a similarity query, query item included.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Number of k-means clusters.
    #[serde(default = "default_n_clusters")]
    pub n_clusters: usize,

    /// Vocabulary size for title TF-IDF vectors.
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// Seed for clustering.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Logger settings, passed to twyg as-is.
    #[serde(default)]
    pub logging: twyg::Opts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracks_path: default_tracks_path(),
            titles_path: default_titles_path(),
            top_k: default_top_k(),
            n_clusters: default_n_clusters(),
            max_features: default_max_features(),
            seed: default_seed(),
            logging: twyg::Opts::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/kindred/config.toml
    /// Reads environment variables with KINDRED_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific file (if it exists) plus the
    /// environment.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut builder = Confygery::new()
            .context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path.to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder.add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("kindred");
        builder.add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build()
            .context("Failed to build configuration")?;

        Ok(config)
    }

    /// Apply CLI overrides for the catalog paths.
    #[must_use]
    pub fn with_paths(mut self, tracks: Option<PathBuf>, titles: Option<PathBuf>) -> Self {
        if let Some(tracks) = tracks {
            self.tracks_path = tracks;
        }
        if let Some(titles) = titles {
            self.titles_path = titles;
        }
        self
    }
}

fn default_tracks_path() -> PathBuf {
    PathBuf::from("data").join("spotify_sample.csv")
}

fn default_titles_path() -> PathBuf {
    PathBuf::from("data").join("netflix_movies.csv")
}

const fn default_top_k() -> usize {
    6
}

const fn default_n_clusters() -> usize {
    4
}

const fn default_max_features() -> usize {
    100
}

const fn default_seed() -> u64 {
    42
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/kindred/config.toml
/// - macOS: ~/Library/Application Support/kindred/config.toml
/// - Windows: %APPDATA%\kindred\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kindred")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Kindred Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (KINDRED_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Music track catalog (CSV with audio feature columns)
#
# Can also be set via:
# - CLI: kindred --tracks /path/to/tracks.csv list spotify
# - Environment: KINDRED_TRACKS_PATH=/path/to/tracks.csv
tracks_path = "data/spotify_sample.csv"

# Movie and show catalog (CSV with title, description, cast, ...)
#
# Can also be set via:
# - CLI: kindred --titles /path/to/titles.csv list netflix
# - Environment: KINDRED_TITLES_PATH=/path/to/titles.csv
titles_path = "data/netflix_movies.csv"

# Results per similarity query, counting the query item itself
top_k = 6

# Number of clusters for `kindred clusters`
n_clusters = 4

# Vocabulary size for title text vectors
max_features = 100

# Seed for cluster initialization
seed = 42
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    ensure_config_file_at(&config_file_path())
}

/// [`ensure_config_file`] for an explicit path.
pub fn ensure_config_file_at(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;
    }

    std::fs::write(config_path, example_config())
        .context("Failed to write config file")?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.top_k, 6);
        assert_eq!(config.n_clusters, 4);
        assert_eq!(config.max_features, 100);
        assert_eq!(config.seed, 42);
        assert!(config.tracks_path.ends_with("spotify_sample.csv"));
    }

    #[test]
    fn test_config_load() {
        // Should not fail even if config file doesn't exist
        let result = Config::load();
        assert!(result.is_ok());
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.top_k, 6);
        assert_eq!(config.titles_path, PathBuf::from("data/netflix_movies.csv"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "top_k = 3\ntracks_path = \"/tmp/tracks.csv\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.top_k, 3);
        assert_eq!(config.tracks_path, PathBuf::from("/tmp/tracks.csv"));
        assert_eq!(config.n_clusters, 4);
    }

    #[test]
    fn test_cli_paths_override() {
        let config = Config::default().with_paths(Some(PathBuf::from("/data/t.csv")), None);
        assert_eq!(config.tracks_path, PathBuf::from("/data/t.csv"));
        assert!(config.titles_path.ends_with("netflix_movies.csv"));
    }

    #[test]
    fn test_ensure_config_file_at() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert!(ensure_config_file_at(&path).unwrap());
        assert!(!ensure_config_file_at(&path).unwrap());
        assert!(std::fs::read_to_string(&path).unwrap().contains("top_k = 6"));
    }
}
