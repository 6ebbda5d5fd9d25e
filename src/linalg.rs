//! Dense linear algebra helpers on top of `ndarray`.

use ndarray::{Array1, Array2};

use crate::error::{PersistError, Result};

/// Solves `A x = b` for a symmetric positive definite `A` via Cholesky
/// decomposition `A = L Lᵀ`.
///
/// A pivot that is not positive (relative to the largest diagonal entry of
/// `A`) means the system has no unique solution and yields
/// [`PersistError::SingularMatrix`].
pub fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
    let (rows, cols) = a.dim();
    if rows != cols {
        return Err(PersistError::InvalidInput(format!(
            "cholesky_solve needs a square matrix, got {}x{}",
            rows, cols
        )));
    }
    if rows != b.len() {
        return Err(PersistError::InvalidInput(format!(
            "matrix has {} rows but right-hand side has {} entries",
            rows,
            b.len()
        )));
    }

    let n = rows;
    let scale = a.diag().iter().fold(0.0_f64, |m, &d| m.max(d.abs()));
    let tol = scale * f64::EPSILON * (n.max(1) as f64) * 16.0;

    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag.is_nan() || diag <= tol {
                    return Err(PersistError::SingularMatrix);
                }
                l[[i, i]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L y = b
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Lᵀ x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Ok(x)
}
