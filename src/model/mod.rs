//! Estimators with compile-time training state.
//!
//! Models carry their state in a type parameter: [`Unfitted`] models can only
//! be fitted, [`Fitted`] models can only predict and be persisted.

pub mod linear;
pub mod state;

pub use state::{Fitted, Unfitted};

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::persist::{self, LoadOptions, SaveOptions};

/// An unfitted model that learns parameters from `(X, y)` data.
pub trait Estimator {
    /// Feature data type.
    type Input;
    /// Target data type.
    type Target;
    /// The fitted model produced by [`Estimator::fit`].
    type Fitted: InferenceModel;

    /// Learn parameters from the training data.
    ///
    /// # Errors
    /// Returns an error if the data is empty, inconsistently shaped, contains
    /// non-finite values, or does not determine a unique solution.
    fn fit(&self, x: &Self::Input, y: &Self::Target) -> Result<Self::Fitted>;
}

/// A fitted model ready for prediction and persistence.
///
/// The model itself is the persisted value: `save_to_file` is
/// `persist::dump(self, ..)`, so files written either way load through
/// `load_from_file` and `persist::load::<Self>` alike.
///
/// # Guarantees
/// - `from_params(extract_params())` reproduces a model that predicts
///   bit-for-bit identically.
/// - `save_to_file` / `load_from_file` return a model equal to the saved one.
pub trait InferenceModel: Serialize + DeserializeOwned + Sized {
    type InputSingle;
    type OutputSingle;
    type InputBatch;
    type OutputBatch;
    /// Serializable representation of the learned parameters.
    type ParamsRepr: Serialize + DeserializeOwned;

    /// Predict on a single sample.
    fn predict(&self, input: &Self::InputSingle) -> Result<Self::OutputSingle>;

    /// Predict on a batch of samples.
    fn predict_batch(&self, input: &Self::InputBatch) -> Result<Self::OutputBatch>;

    /// Extract learned parameters as a serializable representation.
    fn extract_params(&self) -> Self::ParamsRepr;

    /// Reconstruct a fitted model from parameters.
    fn from_params(params: Self::ParamsRepr) -> Result<Self>;

    /// Save the model parameters to a file.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.save_to_file_with(path, &SaveOptions::default())
    }

    /// Save the model parameters to a file with explicit options.
    fn save_to_file_with<P: AsRef<Path>>(&self, path: P, options: &SaveOptions) -> Result<()> {
        persist::dump(self, path, options)
    }

    /// Load a model from a file written by [`InferenceModel::save_to_file`].
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_from_file_with(path, &LoadOptions::default())
    }

    /// Load a model with explicit options.
    fn load_from_file_with<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self> {
        persist::load_with(path, options)
    }
}
