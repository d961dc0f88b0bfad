//! poi-clusters: load the dataset, report the salary range, cluster the
//! rescaled features and plot the clusters.

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use ndarray::{Array1, Array2};
use poi_clusters::{
    feature_format, field_range, fit_kmeans, load_dataset, rescale_probe, viz, Args,
    ClusterModel, FeatureScaler,
};
use std::time::Instant;

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    run_pipeline(&args)
}

fn run_pipeline(args: &Args) -> Result<()> {
    args.validate()?;
    let start_time = Instant::now();

    // Step 1: Load the dataset and drop the aggregate row
    let dataset = load_dataset(&args.input)?.without(&args.outlier);

    let range = field_range(&dataset, &args.range_field);
    println!("max {}: {}", args.range_field, display_value(range.max));
    println!("min {}: {}", args.range_field, display_value(range.min));

    // Step 2: Build the feature table
    let fields = args.fields();
    let table = feature_format(&dataset, &fields, args.missing_policy())?;
    let (poi, features) = table.target_feature_split();
    let feature_names = table.feature_names();

    if args.raw_plot {
        let raw_path = viz::companion_path(&args.output, "raw");
        viz::draw_features(
            features.view(),
            &raw_path,
            &feature_names[0],
            &feature_names[1],
        )?;
    }

    // Step 3: Rescale and cluster
    let probe = rescale_probe(&features, &args.probe)?;
    println!("re-scaled probe point: {}", probe);

    let params = args.cluster_params();

    let model_start = Instant::now();
    let clustered = if features.nrows() < params.n_clusters {
        log::warn!(
            "Only {} usable records for {} clusters, skipping clustering",
            features.nrows(),
            params.n_clusters
        );
        None
    } else {
        let scaler = FeatureScaler::fit(&features)?;
        let scaled = scaler.transform(&features);
        let model = fit_kmeans(&scaled, &params)?;
        Some((scaler, scaled, model))
    };
    log::debug!("Clustering time: {:.2}s", model_start.elapsed().as_secs_f64());

    if let Some((scaler, scaled, model)) = &clustered {
        print_cluster_statistics(model, scaled, &poi);
        if args.verbose {
            let probe_cluster = model.assign(scaler.transform_point(&args.probe)?.view())?;
            log::debug!("Probe point falls in cluster {}", probe_cluster);
        }
    }

    // Step 4: Plot
    let (pred, points) = match &clustered {
        Some((_, scaled, model)) => (Some(model.labels.view()), scaled.view()),
        None => (None, features.view()),
    };
    let drawn = viz::draw_clusters(
        pred,
        points,
        args.mark_poi.then_some(&poi),
        &args.output,
        &feature_names[0],
        &feature_names[1],
    )?;

    if drawn {
        println!("Cluster plot saved to: {}", args.output.display());
    } else {
        println!("no cluster predictions found, no clusters to plot");
    }

    log::info!(
        "Total processing time: {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

fn print_cluster_statistics(model: &ClusterModel, scaled: &Array2<f64>, poi: &Array1<f64>) {
    let total = model.labels.len();
    let flagged = model.flagged_per_cluster(poi);

    println!("\n=== Cluster Statistics ===");
    for (i, &size) in model.cluster_sizes().iter().enumerate() {
        let percentage = (size as f64 / total as f64) * 100.0;
        println!(
            "Cluster {}: {} people ({:.1}%), {} POI",
            i, size, percentage, flagged[i]
        );
    }
    println!("Within-cluster sum of squares: {:.4}", model.inertia);
    println!("Silhouette score: {:.3}\n", model.silhouette(scaled));
}

fn display_value(value: Option<f64>) -> String {
    value.map_or_else(|| "None".to_string(), |v| v.to_string())
}

