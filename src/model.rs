//! K-Means clustering of rescaled features

use crate::error::Error;
use linfa::prelude::*;
use linfa_clustering::KMeans;
use linfa_nn::distance::L2Dist;
use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// K-Means settings
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterParams {
    /// Number of clusters to form
    pub n_clusters: usize,
    /// Maximum iterations per run
    pub max_iters: u64,
    /// Convergence tolerance on centroid movement
    pub tolerance: f64,
    /// Seed for centroid initialisation; entropy when `None`
    pub seed: Option<u64>,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            n_clusters: 2,
            max_iters: 300,
            tolerance: 1e-4,
            seed: None,
        }
    }
}

/// K-Means model wrapper with fitted parameters
#[derive(Debug)]
pub struct ClusterModel {
    /// Fitted K-Means model from linfa
    pub model: KMeans<f64, L2Dist>,
    /// Number of clusters
    pub n_clusters: usize,
    /// Cluster assignments for the fitted points
    pub labels: Array1<usize>,
    /// Cluster centroids in rescaled space
    pub centroids: Array2<f64>,
    /// Within-cluster sum of squares
    pub inertia: f64,
}

impl ClusterModel {
    /// Nearest centroid for a single point
    pub fn assign(&self, point: ArrayView1<f64>) -> crate::Result<usize> {
        if point.len() != self.centroids.ncols() {
            anyhow::bail!(
                "Point has {} dimensions, model has {}",
                point.len(),
                self.centroids.ncols()
            );
        }

        let mut best = (0, f64::INFINITY);
        for (cluster, centroid) in self.centroids.outer_iter().enumerate() {
            let distance = squared_distance(point, centroid);
            if distance < best.1 {
                best = (cluster, distance);
            }
        }
        Ok(best.0)
    }

    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_clusters];
        for &label in self.labels.iter() {
            sizes[label] += 1;
        }
        sizes
    }

    /// Number of flagged points (label value 1.0) in each cluster
    pub fn flagged_per_cluster(&self, flags: &Array1<f64>) -> Vec<usize> {
        let mut counts = vec![0; self.n_clusters];
        for (&label, &flag) in self.labels.iter().zip(flags.iter()) {
            if flag != 0.0 {
                counts[label] += 1;
            }
        }
        counts
    }

    /// Mean silhouette coefficient over all points
    ///
    /// Points alone in their cluster score 0. Returns 0 with fewer than two
    /// points or a single non-empty cluster.
    pub fn silhouette(&self, features: &Array2<f64>) -> f64 {
        let n = features.nrows();
        if n < 2 || self.cluster_sizes().iter().filter(|&&s| s > 0).count() < 2 {
            return 0.0;
        }

        let sizes = self.cluster_sizes();
        let mut total = 0.0;
        for i in 0..n {
            let own = self.labels[i];
            if sizes[own] < 2 {
                continue;
            }

            let mut sums = vec![0.0; self.n_clusters];
            for j in (0..n).filter(|&j| j != i) {
                sums[self.labels[j]] += squared_distance(features.row(i), features.row(j)).sqrt();
            }

            let a = sums[own] / (sizes[own] - 1) as f64;
            let b = (0..self.n_clusters)
                .filter(|&c| c != own && sizes[c] > 0)
                .map(|c| sums[c] / sizes[c] as f64)
                .fold(f64::INFINITY, f64::min);

            let max = a.max(b);
            if max > 0.0 {
                total += (b - a) / max;
            }
        }
        total / n as f64
    }
}

/// Fit K-Means on `features` and assign every row to a cluster
pub fn fit_kmeans(features: &Array2<f64>, params: &ClusterParams) -> crate::Result<ClusterModel> {
    if params.n_clusters == 0 {
        anyhow::bail!("Number of clusters must be at least 1");
    }
    if features.nrows() < params.n_clusters {
        return Err(Error::NotEnoughPoints {
            points: features.nrows(),
            clusters: params.n_clusters,
        }
        .into());
    }

    let rng = match params.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };

    let dataset = DatasetBase::from(features.clone());
    let model = KMeans::params_with(params.n_clusters, rng, L2Dist)
        .max_n_iterations(params.max_iters)
        .tolerance(params.tolerance)
        .fit(&dataset)?;

    let labels: Array1<usize> = model.predict(features);
    let centroids = model.centroids().to_owned();
    let inertia = compute_inertia(features, &labels, &centroids);

    log::debug!(
        "K-Means converged: {} clusters, inertia {:.4}",
        params.n_clusters,
        inertia
    );

    Ok(ClusterModel {
        model,
        n_clusters: params.n_clusters,
        labels,
        centroids,
        inertia,
    })
}

fn compute_inertia(features: &Array2<f64>, labels: &Array1<usize>, centroids: &Array2<f64>) -> f64 {
    features
        .outer_iter()
        .zip(labels.iter())
        .map(|(point, &cluster)| squared_distance(point, centroids.row(cluster)))
        .sum()
}

fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}
