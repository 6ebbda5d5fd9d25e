//! In-memory regression datasets.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use csv::ReaderBuilder;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use tracing::debug;

use crate::error::{PersistError, Result};

/// Feature matrix and target vector held in memory.
///
/// Rows of `features()` are samples, columns are features.
#[derive(Clone, Debug, PartialEq)]
pub struct InMemoryDataset {
    x: Array2<f64>,
    y: Array1<f64>,
    feature_names: Vec<String>,
}

impl InMemoryDataset {
    /// Builds a dataset from row-major samples.
    ///
    /// # Errors
    /// [`PersistError::Dataset`] if `x` and `y` differ in length, the dataset is
    /// empty, or rows have different widths.
    pub fn new(x: Vec<Vec<f64>>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(PersistError::Dataset(format!(
                "x has {} rows but y has {} entries",
                x.len(),
                y.len()
            )));
        }
        let n_features = match x.first() {
            Some(row) => row.len(),
            None => return Err(PersistError::Dataset("dataset is empty".to_string())),
        };
        if !x.iter().all(|row| row.len() == n_features) {
            return Err(PersistError::Dataset(
                "all rows must have the same number of features".to_string(),
            ));
        }

        let n_samples = x.len();
        let data: Vec<f64> = x.into_iter().flatten().collect();
        let x = Array2::from_shape_vec((n_samples, n_features), data)
            .map_err(|e| PersistError::Dataset(e.to_string()))?;
        let feature_names = (0..n_features).map(|i| format!("x{}", i)).collect();

        Ok(Self {
            x,
            y: Array1::from(y),
            feature_names,
        })
    }

    /// Reads a headered CSV where every column is numeric.
    ///
    /// `target_column` names the column used as `y`; all other columns become
    /// features, in file order.
    pub fn from_csv<P: AsRef<Path>>(path: P, target_column: &str) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut rdr = ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(BufReader::new(file));

        let headers = rdr.headers()?.clone();
        let target_idx = headers
            .iter()
            .position(|h| h == target_column)
            .ok_or_else(|| {
                PersistError::Dataset(format!("no column named '{}'", target_column))
            })?;
        let feature_names: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != target_idx)
            .map(|(_, h)| h.to_string())
            .collect();

        let mut features = Vec::new();
        let mut target = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result?;
            let mut row = Vec::with_capacity(feature_names.len());
            for (i, field) in record.iter().enumerate() {
                let value: f64 = field.parse().map_err(|_| {
                    PersistError::Dataset(format!(
                        "record {}: column '{}' is not a number: '{}'",
                        line + 1,
                        &headers[i],
                        field
                    ))
                })?;
                if i == target_idx {
                    target.push(value);
                } else {
                    row.push(value);
                }
            }
            features.push(row);
        }

        let mut dataset = Self::new(features, target)?;
        dataset.feature_names = feature_names;
        debug!(
            n_samples = dataset.n_samples(),
            n_features = dataset.n_features(),
            target_column,
            "loaded csv dataset"
        );
        Ok(dataset)
    }

    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.x.view()
    }

    pub fn targets(&self) -> ArrayView1<'_, f64> {
        self.y.view()
    }

    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    /// Column names: the CSV header, or `x0, x1, ...` for datasets built with [`InMemoryDataset::new`].
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Consumes the dataset, returning `(X, y)`.
    pub fn into_arrays(self) -> (Array2<f64>, Array1<f64>) {
        (self.x, self.y)
    }
}
