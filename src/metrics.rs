//! Regression metrics.

use ndarray::Array1;

use crate::error::{PersistError, Result};

fn check_lengths(y_pred: &Array1<f64>, y_true: &Array1<f64>) -> Result<()> {
    if y_pred.len() != y_true.len() {
        return Err(PersistError::InvalidInput(format!(
            "predictions have {} entries, targets have {}",
            y_pred.len(),
            y_true.len()
        )));
    }
    if y_true.is_empty() {
        return Err(PersistError::InvalidInput(
            "cannot score empty targets".to_string(),
        ));
    }
    Ok(())
}

/// Coefficient of determination R² = 1 - SS_res / SS_tot.
///
/// For a constant target, returns 1.0 on a perfect fit and 0.0 otherwise.
pub fn r_squared(y_pred: &Array1<f64>, y_true: &Array1<f64>) -> Result<f64> {
    check_lengths(y_pred, y_true)?;
    let mean = y_true.sum() / y_true.len() as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

/// Mean squared error.
pub fn mean_squared_error(y_pred: &Array1<f64>, y_true: &Array1<f64>) -> Result<f64> {
    check_lengths(y_pred, y_true)?;
    let sum: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    Ok(sum / y_true.len() as f64)
}
