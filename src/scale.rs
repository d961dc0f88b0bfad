//! Min/max rescaling of feature columns into [0, 1]

use crate::error::Error;
use linfa::prelude::*;
use linfa_preprocessing::linear_scaling::LinearScaler;
use ndarray::{aview1, Array1, Array2, Axis};

/// Min/max scaler fitted on a feature matrix
///
/// Constant columns are not divided by their (zero) range: every value in such
/// a column maps to 0.0.
pub struct FeatureScaler {
    scaler: LinearScaler<f64>,
}

impl FeatureScaler {
    /// Learn per-column minimum and range from `features`
    pub fn fit(features: &Array2<f64>) -> crate::Result<Self> {
        if features.nrows() == 0 {
            return Err(Error::EmptyFeatures.into());
        }
        let dataset = DatasetBase::from(features.clone());
        let scaler = LinearScaler::min_max().fit(&dataset)?;
        Ok(Self { scaler })
    }

    pub fn transform(&self, features: &Array2<f64>) -> Array2<f64> {
        self.scaler.transform(features.clone())
    }

    /// Rescale a single point with the fitted parameters; it may land outside [0, 1]
    pub fn transform_point(&self, point: &[f64]) -> crate::Result<Array1<f64>> {
        let expected = self.scaler.offsets().len();
        if point.len() != expected {
            return Err(Error::ProbeDimension {
                expected,
                got: point.len(),
            }
            .into());
        }
        let row = aview1(point).insert_axis(Axis(0)).to_owned();
        Ok(self.scaler.transform(row).row(0).to_owned())
    }
}

/// Rescale every column of `features` so its minimum is 0.0 and maximum 1.0
pub fn rescale(features: &Array2<f64>) -> crate::Result<Array2<f64>> {
    let scaler = FeatureScaler::fit(features)?;
    Ok(scaler.transform(features))
}

/// Rescaled coordinates of `probe` when it is added to a copy of `features`
///
/// The probe only takes part in fitting the scaler for this call; `features`
/// is left untouched.
pub fn rescale_probe(features: &Array2<f64>, probe: &[f64]) -> crate::Result<Array1<f64>> {
    if probe.len() != features.ncols() {
        return Err(Error::ProbeDimension {
            expected: features.ncols(),
            got: probe.len(),
        }
        .into());
    }

    let mut augmented = features.clone();
    augmented.push_row(aview1(probe))?;
    let scaled = rescale(&augmented)?;

    Ok(scaled.row(scaled.nrows() - 1).to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_rescale_maps_extremes() {
        let features = array![[100.0, 200.0], [50.0, 50.0], [75.0, 125.0]];
        let scaled = rescale(&features).unwrap();

        assert_abs_diff_eq!(scaled[[0, 0]], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(scaled[[1, 0]], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(scaled[[2, 0]], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(scaled[[0, 1]], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(scaled[[1, 1]], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(scaled[[2, 1]], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_rescale_is_monotonic() {
        let features = array![[3.0, -1.0], [-7.5, 4.0], [12.0, 0.5], [0.0, 9.0], [5.5, 4.0]];
        let scaled = rescale(&features).unwrap();

        for col in 0..features.ncols() {
            for i in 0..features.nrows() {
                for j in 0..features.nrows() {
                    if features[[i, col]] > features[[j, col]] {
                        assert!(scaled[[i, col]] >= scaled[[j, col]]);
                    }
                }
            }
            assert!(scaled.column(col).iter().all(|&v| (-1e-12..=1.0 + 1e-12).contains(&v)));
        }
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let features = array![[4.0, 1.0], [4.0, 2.0], [4.0, 3.0]];
        let scaled = rescale(&features).unwrap();

        assert!(scaled.column(0).iter().all(|&v| v == 0.0));
        assert!(scaled.column(0).iter().all(|v| v.is_finite()));
        assert_abs_diff_eq!(scaled[[2, 1]], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rescale_empty_is_an_error() {
        let features = Array2::<f64>::zeros((0, 2));
        let err = rescale(&features).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::EmptyFeatures)));
    }

    #[test]
    fn test_probe_does_not_touch_features() {
        let features = array![[100.0, 200.0], [50.0, 50.0]];
        let probe = rescale_probe(&features, &[75.0, 350.0]).unwrap();

        assert_abs_diff_eq!(probe[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(probe[1], 1.0, epsilon = 1e-12);
        assert_eq!(features.nrows(), 2);
    }

    #[test]
    fn test_transform_point_uses_fitted_range() {
        let features = array![[0.0, 10.0], [10.0, 20.0]];
        let scaler = FeatureScaler::fit(&features).unwrap();
        let point = scaler.transform_point(&[5.0, 30.0]).unwrap();

        assert_abs_diff_eq!(point[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(point[1], 2.0, epsilon = 1e-12);
        assert!(scaler.transform_point(&[1.0]).is_err());
    }

    #[test]
    fn test_probe_dimension_mismatch() {
        let features = array![[1.0, 2.0], [3.0, 4.0]];
        let err = rescale_probe(&features, &[1.0]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::ProbeDimension { expected: 2, got: 1 })
        ));
    }
}
