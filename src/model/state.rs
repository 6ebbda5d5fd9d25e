/// A marker type indicating that a model is **not yet trained**.
///
/// Used as the state parameter of [`crate::model::linear::LinearModel`]:
/// - [`crate::model::Estimator::fit`] is only available on `Unfitted` models.
/// - Prediction and persistence are **not available** until fitting returns a `Fitted` model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Unfitted;

/// A marker type indicating that a model has been **fully trained**.
///
/// A `Fitted` model implements [`crate::model::InferenceModel`] and can be
/// saved, loaded and used for prediction. It holds **only inference
/// parameters** and exposes no way to change them; retraining produces a new
/// model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fitted;
