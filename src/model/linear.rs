//! Ordinary least squares linear regression.
//!
//! - [`LinearRegression`] = `LinearModel<Unfitted>`: holds configuration only.
//! - [`LinearModel<Fitted>`]: holds learned coefficients and intercept, predicts
//!   `y = w·x + b` and can be persisted.
//!
//! The fitted model is free from training hyperparameters: only what is
//! needed for prediction is stored, so equality and persistence cover exactly
//! the coefficients and the intercept.
//!
//! ```rust
//! use ndarray::array;
//! use persist_rs::model::linear::LinearRegression;
//! use persist_rs::model::{Estimator, InferenceModel};
//!
//! // y = 2x + 1
//! let x = array![[0.0], [1.0], [2.0], [3.0]];
//! let y = array![1.0, 3.0, 5.0, 7.0];
//!
//! let fitted = LinearRegression::new().fit(&x, &y).unwrap();
//! assert!((fitted.coefficients()[0] - 2.0).abs() < 1e-10);
//! assert!((fitted.intercept() - 1.0).abs() < 1e-10);
//!
//! let pred = fitted.predict(&array![4.0]).unwrap();
//! assert!((pred - 9.0).abs() < 1e-10);
//! ```

use std::marker::PhantomData;

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::error::{PersistError, Result};
use crate::linalg::cholesky_solve;
use crate::metrics::r_squared;
pub use crate::model::{Estimator, Fitted, InferenceModel, Unfitted};

/// Training configuration of a linear regression.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearConfig {
    /// Whether to learn an intercept term. When false the intercept is 0.
    pub fit_intercept: bool,
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self {
            fit_intercept: true,
        }
    }
}

/// Serializable representation of fitted linear model parameters.
///
/// Stored as `f64` so that a save/load round trip is bit-exact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearParams {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// State-specific data carried by a [`LinearModel`].
pub trait LinearState {
    type Config: Clone + std::fmt::Debug + PartialEq;
}

/// Training configuration lives only on the unfitted model.
impl LinearState for Unfitted {
    type Config = LinearConfig;
}

impl LinearState for Fitted {
    type Config = ();
}

/// A linear model with state encoded at the type level.
///
/// - When `S = Unfitted`: implements [`Estimator`].
/// - When `S = Fitted`: implements [`InferenceModel`], `Serialize` and `Deserialize`.
///
/// This enforces, at compile time, that you cannot call `predict()` on an
/// untrained model.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearModel<S: LinearState> {
    config: S::Config,
    coefficients: Array1<f64>,
    intercept: f64,
    _state: PhantomData<S>,
}

/// Alias for an **unfitted** linear regression model.
pub type LinearRegression = LinearModel<Unfitted>;

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    /// Creates a new linear regression that fits an intercept.
    pub fn new() -> Self {
        Self {
            config: LinearConfig::default(),
            coefficients: Array1::zeros(0),
            intercept: 0.0,
            _state: PhantomData,
        }
    }

    /// Set whether to fit an intercept term.
    pub fn with_intercept(mut self, fit_intercept: bool) -> Self {
        self.config.fit_intercept = fit_intercept;
        self
    }

    pub fn config(&self) -> &LinearConfig {
        &self.config
    }

    fn validate(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let (n_samples, n_features) = x.dim();
        if n_samples == 0 {
            return Err(PersistError::InvalidInput(
                "cannot fit on zero samples".to_string(),
            ));
        }
        if n_samples != y.len() {
            return Err(PersistError::InvalidInput(format!(
                "X has {} rows but y has {} entries",
                n_samples,
                y.len()
            )));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(PersistError::InvalidInput(
                "training data contains NaN or infinite values".to_string(),
            ));
        }
        let unknowns = n_features + usize::from(self.config.fit_intercept);
        if n_samples < unknowns {
            return Err(PersistError::InvalidInput(format!(
                "{} samples cannot determine {} unknowns",
                n_samples, unknowns
            )));
        }
        Ok(())
    }
}

/// Solves the normal equations `(XᵀX) w = Xᵀy`.
///
/// With an intercept, features and target are centered first and the
/// intercept is recovered as `mean(y) - mean(X)·w`.
impl Estimator for LinearRegression {
    type Input = Array2<f64>;
    type Target = Array1<f64>;
    type Fitted = LinearModel<Fitted>;

    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<LinearModel<Fitted>> {
        self.validate(x, y)?;
        let (n_samples, n_features) = x.dim();

        let (coefficients, intercept) = if self.config.fit_intercept {
            let x_mean = x.mean_axis(Axis(0)).ok_or_else(|| {
                PersistError::InvalidInput("cannot fit on zero samples".to_string())
            })?;
            let y_mean = y.sum() / n_samples as f64;
            let xc = x - &x_mean;
            let yc = y - y_mean;
            let w = cholesky_solve(&xc.t().dot(&xc), &xc.t().dot(&yc))?;
            let b = y_mean - x_mean.dot(&w);
            (w, b)
        } else {
            let w = cholesky_solve(&x.t().dot(x), &x.t().dot(y))?;
            (w, 0.0)
        };

        debug!(n_samples, n_features, intercept, "fitted linear regression");
        Ok(LinearModel {
            config: (),
            coefficients,
            intercept,
            _state: PhantomData,
        })
    }
}

impl LinearModel<Fitted> {
    /// Creates a fitted model from explicit parameters.
    ///
    /// Useful for warm starts or models trained elsewhere; no validation is done.
    pub fn new(params: LinearParams) -> Self {
        Self {
            config: (),
            coefficients: Array1::from(params.coefficients),
            intercept: params.intercept,
            _state: PhantomData,
        }
    }

    /// Learned coefficients, one per feature.
    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    /// Learned intercept (0.0 when fitted without intercept).
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Number of features seen during fit.
    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// R² of the predictions on `x` against `y`.
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let pred = self.predict_batch(x)?;
        r_squared(&pred, y)
    }

    fn check_features(&self, got: usize) -> Result<()> {
        if got != self.n_features() {
            return Err(PersistError::FeatureMismatch {
                expected_features: self.n_features(),
                got_features: got,
            });
        }
        Ok(())
    }
}

/// Implements inference for a fitted linear model: `y = w·x + b`.
///
/// - Single-sample input: `Array1<f64>` → `f64`
/// - Batch input: `Array2<f64>` (rows are samples) → `Array1<f64>`
impl InferenceModel for LinearModel<Fitted> {
    type InputSingle = Array1<f64>;
    type OutputSingle = f64;
    type InputBatch = Array2<f64>;
    type OutputBatch = Array1<f64>;
    type ParamsRepr = LinearParams;

    fn predict(&self, input: &Array1<f64>) -> Result<f64> {
        self.check_features(input.len())?;
        Ok(self.coefficients.dot(input) + self.intercept)
    }

    fn predict_batch(&self, input: &Array2<f64>) -> Result<Array1<f64>> {
        self.check_features(input.ncols())?;
        Ok(input.dot(&self.coefficients) + self.intercept)
    }

    fn extract_params(&self) -> LinearParams {
        LinearParams {
            coefficients: self.coefficients.to_vec(),
            intercept: self.intercept,
        }
    }

    fn from_params(params: LinearParams) -> Result<Self> {
        if !params.intercept.is_finite() || params.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(PersistError::CorruptArtifact(
                "linear model parameters contain NaN or infinite values".to_string(),
            ));
        }
        Ok(Self::new(params))
    }
}

// A fitted model serializes as its parameters. `save_to_file`, `persist::dump`
// and `serialization::save` all record the same type name.
impl Serialize for LinearModel<Fitted> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.extract_params().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LinearModel<Fitted> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let params = LinearParams::deserialize(deserializer)?;
        Self::from_params(params).map_err(serde::de::Error::custom)
    }
}
