//! Feature table construction from person records

use crate::data::{Dataset, FieldValue};
use crate::error::Error;
use ndarray::{s, Array1, Array2};

/// What to do with records that lack a value for a requested field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPolicy {
    /// Exclude any record with a missing requested value
    #[default]
    DropIncomplete,
    /// Read missing values as 0.0, then optionally exclude rows whose
    /// feature columns are all zero or contain any zero
    ZeroFill {
        remove_all_zeroes: bool,
        remove_any_zeroes: bool,
    },
}

/// Rectangular numeric table built from a dataset
///
/// Column 0 holds the label field, the remaining columns the features, in the
/// order they were requested.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    pub fields: Vec<String>,
    pub names: Vec<String>,
    pub rows: Array2<f64>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.nrows() == 0
    }

    /// Names of the feature columns (label excluded)
    pub fn feature_names(&self) -> &[String] {
        &self.fields[1..]
    }

    /// Split into the label column and the feature columns, keeping row order
    pub fn target_feature_split(&self) -> (Array1<f64>, Array2<f64>) {
        let labels = self.rows.column(0).to_owned();
        let features = self.rows.slice(s![.., 1..]).to_owned();
        (labels, features)
    }
}

/// Build a feature table for `fields` from every record of `dataset`
///
/// The first field is the label. Flags read as 1.0/0.0 and the `"NaN"`
/// sentinel, nulls and absent fields count as missing. Any other text is an
/// error.
pub fn feature_format(
    dataset: &Dataset,
    fields: &[&str],
    policy: MissingPolicy,
) -> crate::Result<FeatureTable> {
    if fields.len() < 2 {
        return Err(Error::TooFewFields(fields.len()).into());
    }

    let mut names = Vec::new();
    let mut values = Vec::with_capacity(dataset.len() * fields.len());

    'records: for (name, record) in dataset.iter() {
        let mut row = Vec::with_capacity(fields.len());
        for &field in fields {
            match read_value(name, field, record.get(field))? {
                Some(value) => row.push(value),
                None => match policy {
                    MissingPolicy::DropIncomplete => {
                        log::debug!("Excluding {}: missing {}", name, field);
                        continue 'records;
                    }
                    MissingPolicy::ZeroFill { .. } => row.push(0.0),
                },
            }
        }

        if let MissingPolicy::ZeroFill {
            remove_all_zeroes,
            remove_any_zeroes,
        } = policy
        {
            let features = &row[1..];
            let excluded = (remove_all_zeroes && features.iter().all(|&v| v == 0.0))
                || (remove_any_zeroes && features.iter().any(|&v| v == 0.0));
            if excluded {
                log::debug!("Excluding {}: zero features", name);
                continue;
            }
        }

        names.push(name.clone());
        values.extend(row);
    }

    let rows = Array2::from_shape_vec((names.len(), fields.len()), values)?;
    log::info!(
        "Feature table: {} of {} records kept for {:?}",
        rows.nrows(),
        dataset.len(),
        fields
    );

    Ok(FeatureTable {
        fields: fields.iter().map(|f| f.to_string()).collect(),
        names,
        rows,
    })
}

fn read_value(person: &str, field: &str, value: Option<&FieldValue>) -> crate::Result<Option<f64>> {
    let Some(value) = value else {
        return Ok(None);
    };
    if value.is_missing() {
        return Ok(None);
    }
    match value.as_f64() {
        Some(number) => Ok(Some(number)),
        None => Err(Error::NonNumeric {
            person: person.to_string(),
            field: field.to_string(),
            value: format!("{:?}", value),
        }
        .into()),
    }
}
