//! # persist-rs
//!
//! Save and load in-memory values through a self-describing binary artifact,
//! with a typed linear-regression estimator whose fitted state survives the
//! round trip bit-for-bit.
//!
//! ## Core Design Principles
//!
//! - **Round-trip law**: for every supported value `v`, `load(save(v)) == v`.
//! - **Fail loudly**: a truncated, corrupted, foreign or wrong-typed artifact is
//!   an error, never a silently different value.
//! - **Stateful Type Safety**: models carry their training state in the type
//!   system (`Unfitted` vs `Fitted`), so an untrained model cannot be persisted
//!   or used for prediction.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::BTreeMap;
//!
//! let mut data = BTreeMap::new();
//! data.insert("a".to_string(), vec![1.0, 2.0]);
//!
//! let mut buf = Vec::new();
//! persist_rs::save(&data, &mut buf).unwrap();
//! let loaded: BTreeMap<String, Vec<f64>> = persist_rs::load(buf.as_slice()).unwrap();
//! assert_eq!(loaded, data);
//! ```
//!
//! ## Module Structure
//!
//! - `serialization`: stream facade (`save`/`load`) and the artifact envelope
//! - `persist`: file artifacts (`dump`/`load`/`inspect`)
//! - `value`: dynamically-typed value graphs
//! - `model`: estimators with compile-time state
//! - `linalg`, `metrics`: numerics backing the estimator
//! - `dataset`: in-memory and CSV datasets

pub mod dataset;
pub mod error;
pub mod linalg;
pub mod metrics;

/// Machine learning models with compile-time state safety.
pub mod model;

/// File-based artifact persistence.
pub mod persist;

/// Stream serialization and the artifact format.
pub mod serialization;

/// Dynamically-typed values.
pub mod value;

pub use error::{PersistError, Result};
pub use model::linear::{LinearModel, LinearParams, LinearRegression};
pub use model::{Estimator, Fitted, InferenceModel, Unfitted};
pub use serialization::{load, load_with, save, save_with, Compression, LoadOptions, SaveOptions};
pub use value::{Key, Object, Value};
