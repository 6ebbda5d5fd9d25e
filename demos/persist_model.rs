//! Fit a linear regression, persist it, and check the reloaded model
//! predicts exactly like the original.
//!
//! Run with `RUST_LOG=info cargo run --example persist_model`.

use ndarray::{array, Array1, Array2};
use persist_rs::model::linear::{LinearModel, LinearRegression};
use persist_rs::model::{Estimator, Fitted, InferenceModel};
use persist_rs::{persist, Compression, SaveOptions};
use tracing_subscriber::EnvFilter;

fn main() -> persist_rs::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // y = 1.5 x0 - 0.5 x1 + 2 with a small deterministic wobble
    let n = 50;
    let mut x = Array2::<f64>::zeros((n, 2));
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let a = i as f64 / 10.0;
        let b = ((i * 7) % 13) as f64;
        x[[i, 0]] = a;
        x[[i, 1]] = b;
        y[i] = 1.5 * a - 0.5 * b + 2.0 + 0.01 * ((i % 3) as f64 - 1.0);
    }

    let model = LinearRegression::new().fit(&x, &y)?;
    println!("Coefficients: {}", model.coefficients());
    println!("Intercept: {}", model.intercept());
    println!("R^2 on training data: {:.6}", model.score(&x, &y)?);

    let dir = std::env::temp_dir().join("persist-rs-demo");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("linear_regression.model");

    let options = SaveOptions::new()
        .with_compression(Compression::Lz4)
        .with_description("linear regression demo");
    model.save_to_file_with(&path, &options)?;
    println!("Model saved to {}", path.display());

    let info = persist::inspect(&path)?;
    println!(
        "Artifact: {} v{} ({} bytes, {:?}, crc32 {:08x})",
        info.metadata.type_name,
        info.header.version,
        info.total_len,
        info.header.compression,
        info.checksum
    );

    let loaded = LinearModel::<Fitted>::load_from_file(&path)?;
    println!("Loaded coefficients: {}", loaded.coefficients());
    println!("Loaded intercept: {}", loaded.intercept());

    let probe = array![[1.0, 2.0], [3.5, -1.0]];
    let before = model.predict_batch(&probe)?;
    let after = loaded.predict_batch(&probe)?;
    println!("Predictions before: {}", before);
    println!("Predictions after:  {}", after);
    assert_eq!(before, after);

    Ok(())
}
