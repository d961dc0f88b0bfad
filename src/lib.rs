//! poi-clusters: K-Means clustering of per-person financial records
//!
//! The pipeline loads a dict-of-dicts dataset, drops the aggregate outlier,
//! builds a feature table, rescales it to [0, 1], clusters it with K-Means and
//! plots the result.

pub mod cli;
pub mod data;
pub mod error;
pub mod features;
pub mod model;
pub mod scale;
pub mod viz;

// Re-export public items for easier access
pub use cli::Args;
pub use data::{field_range, load_dataset, Dataset, FieldRange, FieldValue, OUTLIER_KEY};
pub use error::Error;
pub use features::{feature_format, FeatureTable, MissingPolicy};
pub use model::{fit_kmeans, ClusterModel, ClusterParams};
pub use scale::{rescale, rescale_probe, FeatureScaler};
pub use viz::{draw_clusters, draw_features};

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
