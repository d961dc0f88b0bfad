//! Dataset loading, outlier removal and the field range scan

use crate::error::Error;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Text sentinel the dataset uses for missing values
pub const MISSING_SENTINEL: &str = "NaN";

/// Key of the aggregate row that is not a person
pub const OUTLIER_KEY: &str = "TOTAL";

/// A single value in a person record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Null,
}

impl FieldValue {
    /// True for the `"NaN"` sentinel, null and a floating point NaN
    pub fn is_missing(&self) -> bool {
        match self {
            FieldValue::Text(text) => text == MISSING_SENTINEL,
            FieldValue::Real(value) => value.is_nan(),
            FieldValue::Null => true,
            _ => false,
        }
    }

    /// Numeric reading of the value; `None` for missing values and free text
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Flag(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            FieldValue::Integer(value) => Some(*value as f64),
            FieldValue::Real(value) if !value.is_nan() => Some(*value),
            _ => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(flag: bool) -> Self {
        FieldValue::Flag(flag)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Real(value)
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_string())
    }
}

/// Field name -> value for one person
pub type PersonRecord = BTreeMap<String, FieldValue>;

/// Person name -> record, iterated in sorted name order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    people: BTreeMap<String, PersonRecord>,
}

impl Dataset {
    pub fn new(people: BTreeMap<String, PersonRecord>) -> Self {
        Self { people }
    }

    /// Returns the dataset without `key`. Absent keys are not an error.
    pub fn without(mut self, key: &str) -> Self {
        if self.people.remove(key).is_some() {
            log::debug!("Removed outlier entry {:?}", key);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&PersonRecord> {
        self.people.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.people.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PersonRecord)> {
        self.people.iter()
    }
}

impl FromIterator<(String, PersonRecord)> for Dataset {
    fn from_iter<I: IntoIterator<Item = (String, PersonRecord)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Load a dict-of-dicts dataset from a pickle or JSON file
///
/// The format is picked from the file extension: `.pkl`/`.pickle` for Python
/// pickles (byte strings are decoded as UTF-8) and `.json` for JSON.
pub fn load_dataset<P: AsRef<Path>>(path: P) -> crate::Result<Dataset> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let is_pickle = match extension.as_deref() {
        Some("pkl") | Some("pickle") => true,
        Some("json") => false,
        _ => return Err(Error::UnsupportedDatasetFormat(path.to_path_buf()).into()),
    };

    let file = File::open(path).with_context(|| format!("Failed to open dataset {:?}", path))?;
    let reader = BufReader::new(file);

    let dataset: Dataset = if is_pickle {
        let options = serde_pickle::DeOptions::new().decode_strings();
        serde_pickle::from_reader(reader, options)
            .with_context(|| format!("Failed to decode pickle {:?}", path))?
    } else {
        serde_json::from_reader(reader).with_context(|| format!("Failed to decode JSON {:?}", path))?
    };

    log::info!("Loaded {} records from {:?}", dataset.len(), path);
    Ok(dataset)
}

/// Largest and smallest non-missing value seen for a field
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FieldRange {
    pub max: Option<f64>,
    pub min: Option<f64>,
}

/// Scan every record for the range of `field`
///
/// Missing values, absent fields and free text are skipped. Comparisons use
/// `>=` and `<=` so the last of several equal values is the one kept.
pub fn field_range(dataset: &Dataset, field: &str) -> FieldRange {
    let mut range = FieldRange::default();

    for (name, record) in dataset.iter() {
        let Some(value) = record.get(field) else {
            continue;
        };
        let Some(value) = value.as_f64() else {
            if !value.is_missing() {
                log::debug!("Skipping non-numeric {} of {}: {:?}", field, name, value);
            }
            continue;
        };

        if range.max.map_or(true, |max| value >= max) {
            range.max = Some(value);
        }
        if range.min.map_or(true, |min| value <= min) {
            range.min = Some(value);
        }
    }

    range
}
