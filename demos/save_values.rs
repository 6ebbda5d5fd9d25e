//! Save a composite value to a file and read it back.
//!
//! Run with `RUST_LOG=debug cargo run --example save_values` to see the
//! artifact header being written and validated.

use std::fs::File;

use persist_rs::value::{Key, Value};
use tracing_subscriber::EnvFilter;

fn main() -> persist_rs::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let data = Value::dict([
        (
            "a",
            Value::list([1.into(), 2.0.into(), Value::tuple([3.into(), 4.into()])]),
        ),
        ("b", Value::set([Key::from(7), Key::from("hello")])),
    ]);

    let dir = std::env::temp_dir().join("persist-rs-demo");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("data.bin");

    persist_rs::save(&data, File::create(&path)?)?;
    println!("Saved data to {}", path.display());

    let loaded: Value = persist_rs::load(File::open(&path)?)?;
    println!("Loaded data: {}", loaded);
    assert_eq!(loaded, data);

    Ok(())
}
