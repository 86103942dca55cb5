//! Clustering and projection of kindred embeddings.
//!
//! Groups a catalog's vectors with k-means, scores the grouping with the
//! silhouette coefficient, projects vectors to two dimensions with PCA,
//! and summarizes each cluster from record metadata. Nothing here is on
//! the similarity search path.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod analysis;
pub mod error;
pub mod kmeans;
pub mod pca;
pub mod quality;

pub use analysis::{cluster_catalog, ClusterProfile, ClusterReport, ClusterSummary};
pub use error::{ClusterError, Result};
pub use kmeans::{ClusterModel, KMeans};
pub use pca::project_2d;
pub use quality::{find_optimal_k, silhouette_score};
