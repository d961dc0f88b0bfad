//! Command-line interface definitions and argument parsing

use crate::features::MissingPolicy;
use crate::model::ClusterParams;
use clap::Parser;
use std::path::PathBuf;

/// Cluster people by salary and exercised stock options with K-Means
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the dataset (.pkl, .pickle or .json)
    #[arg(short, long, default_value = "../final_project/final_project_dataset.pkl")]
    pub input: PathBuf,

    /// Output path for the cluster plot (.svg, .png, .bmp, .jpg)
    #[arg(short, long, default_value = "clusters.svg")]
    pub output: PathBuf,

    /// Number of clusters for K-Means
    #[arg(short = 'k', long, default_value = "2")]
    pub clusters: usize,

    /// Comma-separated feature fields; the first two are plotted
    #[arg(short, long, value_delimiter = ',', default_value = "salary,exercised_stock_options")]
    pub features: Vec<String>,

    /// Boolean label field
    #[arg(long, default_value = "poi")]
    pub label: String,

    /// Field whose max and min are reported before clustering
    #[arg(long, default_value = "salary")]
    pub range_field: String,

    /// Dataset entry removed before anything else
    #[arg(long, default_value = "TOTAL")]
    pub outlier: String,

    /// Point rescaled alongside the features for display, one value per feature
    #[arg(long, value_delimiter = ',', default_value = "200000,1000000")]
    pub probe: Vec<f64>,

    /// Maximum iterations for K-Means algorithm
    #[arg(long, default_value = "300")]
    pub max_iters: u64,

    /// Tolerance for K-Means convergence
    #[arg(long, default_value = "1e-4")]
    pub tolerance: f64,

    /// Seed for centroid initialisation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Mark persons of interest with a red cross
    #[arg(long)]
    pub mark_poi: bool,

    /// Read missing values as zero instead of dropping the record
    #[arg(long)]
    pub zero_fill: bool,

    /// Also plot the raw features next to the cluster plot
    #[arg(long)]
    pub raw_plot: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Reject settings the pipeline cannot plot or cluster
    ///
    /// The scatter plot needs two feature axes, so fewer than two features is
    /// an error rather than a run that fails after clustering.
    pub fn validate(&self) -> crate::Result<()> {
        if self.features.len() < 2 {
            anyhow::bail!(
                "At least two features are required for plotting, got {}",
                self.features.len()
            );
        }
        if self.probe.len() != self.features.len() {
            anyhow::bail!(
                "Probe point must have one value per feature ({}), got {}",
                self.features.len(),
                self.probe.len()
            );
        }
        if self.clusters == 0 {
            anyhow::bail!("Number of clusters must be at least 1");
        }
        Ok(())
    }

    /// Label field followed by the feature fields
    pub fn fields(&self) -> Vec<&str> {
        std::iter::once(self.label.as_str())
            .chain(self.features.iter().map(String::as_str))
            .collect()
    }

    pub fn missing_policy(&self) -> MissingPolicy {
        if self.zero_fill {
            MissingPolicy::ZeroFill {
                remove_all_zeroes: true,
                remove_any_zeroes: false,
            }
        } else {
            MissingPolicy::DropIncomplete
        }
    }

    pub fn cluster_params(&self) -> ClusterParams {
        ClusterParams {
            n_clusters: self.clusters,
            max_iters: self.max_iters,
            tolerance: self.tolerance,
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["poi-clusters"]);

        assert_eq!(args.clusters, 2);
        assert_eq!(args.fields(), vec!["poi", "salary", "exercised_stock_options"]);
        assert_eq!(args.probe, vec![200_000.0, 1_000_000.0]);
        assert_eq!(args.output, PathBuf::from("clusters.svg"));
        assert_eq!(args.outlier, "TOTAL");
        assert_eq!(args.missing_policy(), MissingPolicy::DropIncomplete);
        assert_eq!(args.cluster_params(), ClusterParams::default());
    }

    #[test]
    fn test_three_features() {
        let args = Args::parse_from([
            "poi-clusters",
            "--features",
            "salary,exercised_stock_options,total_payments",
            "--probe",
            "1,2,3",
            "-k",
            "3",
            "--seed",
            "7",
            "--zero-fill",
        ]);

        assert_eq!(args.fields().len(), 4);
        assert_eq!(args.probe.len(), 3);
        assert_eq!(args.cluster_params().n_clusters, 3);
        assert_eq!(args.cluster_params().seed, Some(7));
        assert!(matches!(args.missing_policy(), MissingPolicy::ZeroFill { .. }));
    }

    #[test]
    fn test_validate() {
        assert!(Args::parse_from(["poi-clusters"]).validate().is_ok());

        let single = Args::parse_from(["poi-clusters", "--features", "salary", "--probe", "1"]);
        assert!(single.validate().is_err());

        let mismatch = Args::parse_from(["poi-clusters", "--probe", "1,2,3"]);
        assert!(mismatch.validate().is_err());

        let no_clusters = Args::parse_from(["poi-clusters", "-k", "0"]);
        assert!(no_clusters.validate().is_err());
    }

    #[test]
    fn test_invalid_probe() {
        assert!(Args::try_parse_from(["poi-clusters", "--probe", "1,abc"]).is_err());
    }
}
