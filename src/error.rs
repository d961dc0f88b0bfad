//! Error kinds callers may want to match on

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported dataset format for {0:?} (expected .pkl, .pickle or .json)")]
    UnsupportedDatasetFormat(PathBuf),

    #[error("unsupported image format for {0:?} (expected .svg, .png, .bmp, .jpg or .jpeg)")]
    UnsupportedImageFormat(PathBuf),

    #[error("need a label field and at least one feature field, got {0} field(s)")]
    TooFewFields(usize),

    #[error("field `{field}` of `{person}` is not numeric: {value:?}")]
    NonNumeric {
        person: String,
        field: String,
        value: String,
    },

    #[error("probe point has {got} coordinate(s) but the features have {expected}")]
    ProbeDimension { expected: usize, got: usize },

    #[error("no records left to rescale")]
    EmptyFeatures,

    #[error("cannot form {clusters} cluster(s) from {points} point(s)")]
    NotEnoughPoints { points: usize, clusters: usize },
}
