//! Scatter plots of features and cluster assignments using Plotters

use crate::error::Error;
use ndarray::{Array1, ArrayView1, ArrayView2};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

/// Colors for the first clusters; later labels draw from `Palette99`
const CLUSTER_COLORS: [RGBColor; 5] = [BLUE, CYAN, BLACK, MAGENTA, GREEN];

const PLOT_SIZE: (u32, u32) = (800, 600);

/// Color used for a cluster label
pub fn cluster_color(label: usize) -> RGBAColor {
    match CLUSTER_COLORS.get(label) {
        Some(color) => color.to_rgba(),
        None => Palette99::pick(label).to_rgba(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageFormat {
    Svg,
    Bitmap,
}

fn image_format(path: &Path) -> crate::Result<ImageFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("svg") => Ok(ImageFormat::Svg),
        Some("png") | Some("bmp") | Some("jpg") | Some("jpeg") => Ok(ImageFormat::Bitmap),
        _ => Err(Error::UnsupportedImageFormat(path.to_path_buf()).into()),
    }
}

/// Everything needed to render one scatter plot
struct Scatter<'a> {
    points: ArrayView2<'a, f64>,
    labels: Option<ArrayView1<'a, usize>>,
    flags: Option<ArrayView1<'a, f64>>,
    x_name: &'a str,
    y_name: &'a str,
}

impl Scatter<'_> {
    fn save(&self, path: &Path) -> crate::Result<()> {
        if self.points.ncols() < 2 {
            anyhow::bail!("Scatter plot needs two feature columns, got {}", self.points.ncols());
        }
        match image_format(path)? {
            ImageFormat::Svg => self.render(SVGBackend::new(path, PLOT_SIZE).into_drawing_area()),
            ImageFormat::Bitmap => {
                self.render(BitMapBackend::new(path, PLOT_SIZE).into_drawing_area())
            }
        }
    }

    fn render<DB>(&self, root: DrawingArea<DB, Shift>) -> crate::Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let xs = self.points.column(0);
        let ys = self.points.column(1);
        let (x_min, x_max) = padded_bounds(xs);
        let (y_min, y_max) = padded_bounds(ys);

        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

        chart
            .configure_mesh()
            .x_desc(self.x_name)
            .y_desc(self.y_name)
            .axis_desc_style(("sans-serif", 15))
            .draw()?;

        let coords = xs.iter().copied().zip(ys.iter().copied());
        match &self.labels {
            Some(labels) => {
                chart.draw_series(
                    coords
                        .zip(labels.iter())
                        .map(|(point, &label)| Circle::new(point, 4, cluster_color(label).filled())),
                )?;
            }
            None => {
                chart.draw_series(coords.map(|point| Circle::new(point, 4, BLUE.filled())))?;
            }
        }

        if let Some(flags) = &self.flags {
            chart.draw_series(
                xs.iter()
                    .zip(ys.iter())
                    .zip(flags.iter())
                    .filter(|(_, flag)| **flag != 0.0)
                    .map(|((&x, &y), _)| Cross::new((x, y), 6, RED.stroke_width(2))),
            )?;
        }

        root.present()?;
        Ok(())
    }
}

/// Axis range around the values with a 5% margin on both sides
fn padded_bounds(values: ArrayView1<f64>) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if max > min { (max - min) * 0.05 } else { 0.5 };
    (min - pad, max + pad)
}

/// Draw points colored by cluster label and save the image to `output_path`
///
/// Returns `false` without writing anything when there are no predictions.
/// When `poi` is given, flagged points get a red cross on top.
pub fn draw_clusters<'a>(
    pred: Option<ArrayView1<'a, usize>>,
    points: ArrayView2<'a, f64>,
    poi: Option<&'a Array1<f64>>,
    output_path: &Path,
    x_name: &'a str,
    y_name: &'a str,
) -> crate::Result<bool> {
    let Some(labels) = pred else {
        return Ok(false);
    };
    if labels.len() != points.nrows() {
        anyhow::bail!(
            "{} cluster labels for {} points",
            labels.len(),
            points.nrows()
        );
    }

    Scatter {
        points,
        labels: Some(labels),
        flags: poi.map(|flags| flags.view()),
        x_name,
        y_name,
    }
    .save(output_path)?;

    log::info!("Cluster plot saved to {:?}", output_path);
    Ok(true)
}

/// Draw unclustered feature values in a single color
pub fn draw_features<'a>(
    points: ArrayView2<'a, f64>,
    output_path: &Path,
    x_name: &'a str,
    y_name: &'a str,
) -> crate::Result<()> {
    Scatter {
        points,
        labels: None,
        flags: None,
        x_name,
        y_name,
    }
    .save(output_path)?;

    log::info!("Feature plot saved to {:?}", output_path);
    Ok(())
}

/// `clusters.svg` -> `clusters_raw.svg`
pub fn companion_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("plot");
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_{}.{}", stem, suffix, ext),
        None => format!("{}_{}", stem, suffix),
    };
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tempfile::tempdir;

    #[test]
    fn test_draw_clusters_svg() {
        let points = array![[0.0, 0.0], [1.0, 1.0], [0.2, 0.1]];
        let labels = array![0usize, 1, 0];
        let poi = array![0.0, 1.0, 0.0];
        let dir = tempdir().unwrap();
        let path = dir.path().join("clusters.svg");

        let drawn = draw_clusters(
            Some(labels.view()),
            points.view(),
            Some(&poi),
            &path,
            "salary",
            "exercised_stock_options",
        )
        .unwrap();

        assert!(drawn);
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("salary"));
    }

    #[test]
    fn test_draw_clusters_png() {
        let points = array![[0.0, 0.5], [1.0, 0.0]];
        let labels = array![1usize, 0];
        let dir = tempdir().unwrap();
        let path = dir.path().join("clusters.png");

        assert!(draw_clusters(Some(labels.view()), points.view(), None, &path, "x", "y").unwrap());
        assert!(path.exists());
    }

    #[test]
    fn test_missing_predictions_draw_nothing() {
        let points = array![[0.0, 0.5], [1.0, 0.0]];
        let dir = tempdir().unwrap();
        let path = dir.path().join("clusters.svg");

        let drawn = draw_clusters(None, points.view(), None, &path, "x", "y").unwrap();
        assert!(!drawn);
        assert!(!path.exists());
    }

    #[test]
    fn test_pdf_is_rejected() {
        let points = array![[0.0, 0.5], [1.0, 0.0]];
        let labels = array![0usize, 1];
        let dir = tempdir().unwrap();
        let path = dir.path().join("clusters.pdf");

        let err = draw_clusters(Some(labels.view()), points.view(), None, &path, "x", "y")
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::UnsupportedImageFormat(_))
        ));
    }

    #[test]
    fn test_label_count_mismatch() {
        let points = array![[0.0, 0.5], [1.0, 0.0]];
        let labels = array![0usize];
        let dir = tempdir().unwrap();
        let path = dir.path().join("clusters.svg");
        assert!(draw_clusters(Some(labels.view()), points.view(), None, &path, "x", "y").is_err());
    }

    #[test]
    fn test_palette_has_no_cap() {
        assert_eq!(cluster_color(0).rgb(), BLUE.rgb());
        assert_eq!(cluster_color(4).rgb(), GREEN.rgb());

        let fixed: Vec<_> = CLUSTER_COLORS.iter().map(|c| c.rgb()).collect();
        for label in [5, 7, 12] {
            let color = cluster_color(label).rgb();
            assert_eq!(color, Palette99::pick(label).rgb());
            assert!(!fixed.contains(&color), "label {} reuses a fixed color", label);
        }
        assert_eq!(cluster_color(250).rgb(), Palette99::pick(250).rgb());
    }

    #[test]
    fn test_draw_features_constant_column() {
        let points = array![[3.0, 1.0], [3.0, 2.0]];
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw.svg");
        draw_features(points.view(), &path, "a", "b").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_companion_path() {
        assert_eq!(
            companion_path(Path::new("out/clusters.svg"), "raw"),
            PathBuf::from("out/clusters_raw.svg")
        );
        assert_eq!(companion_path(Path::new("plot"), "raw"), PathBuf::from("plot_raw"));
    }
}
