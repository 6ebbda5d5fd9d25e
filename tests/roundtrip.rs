//! Property-based tests for the save/load round trip.

use std::collections::BTreeMap;

use ndarray::{Array1, Array2};
use persist_rs::model::linear::{LinearModel, LinearRegression};
use persist_rs::model::{Estimator, Fitted, InferenceModel};
use persist_rs::serialization::{self, Compression, LoadOptions, SaveOptions};
use persist_rs::value::{Key, Object, Value};
use persist_rs::{persist, PersistError};
use proptest::prelude::*;

fn key_strategy() -> impl Strategy<Value = Key> {
    let leaf = prop_oneof![
        Just(Key::None),
        any::<bool>().prop_map(Key::Bool),
        any::<i64>().prop_map(Key::Int),
        "[a-z]{0,8}".prop_map(Key::Str),
        proptest::collection::vec(any::<u8>(), 0..8).prop_map(Key::Bytes),
    ];
    leaf.prop_recursive(2, 8, 3, |inner| {
        proptest::collection::vec(inner, 0..3).prop_map(Key::Tuple)
    })
}

// NaN is excluded because it never compares equal to itself.
fn float_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        -1e300f64..1e300,
        Just(0.0),
        Just(-0.0),
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
        Just(f64::MIN_POSITIVE),
    ]
}

fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::None),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        float_strategy().prop_map(Value::Float),
        ".{0,12}".prop_map(Value::Str),
        proptest::collection::vec(any::<u8>(), 0..16).prop_map(Value::Bytes),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..6).prop_map(Value::List),
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Tuple),
            proptest::collection::btree_map(key_strategy(), inner.clone(), 0..5)
                .prop_map(Value::Dict),
            proptest::collection::btree_set(key_strategy(), 0..5).prop_map(Value::Set),
            (
                "[A-Z][a-z]{0,6}",
                proptest::collection::btree_map("[a-z]{1,6}", inner, 0..4)
            )
                .prop_map(|(class, fields): (String, BTreeMap<String, Value>)| {
                    Value::Object(Object { class, fields })
                }),
        ]
    })
}

fn compression_strategy() -> impl Strategy<Value = Compression> {
    prop_oneof![Just(Compression::None), Just(Compression::Lz4)]
}

fn dataset_strategy() -> impl Strategy<Value = (Array2<f64>, Array1<f64>)> {
    (2usize..5).prop_flat_map(|n_features| {
        let n_samples = n_features + 6;
        (
            proptest::collection::vec(-100.0f64..100.0, n_samples * n_features),
            proptest::collection::vec(-100.0f64..100.0, n_samples),
        )
            .prop_map(move |(x, y)| {
                let x = Array2::from_shape_vec((n_samples, n_features), x)
                    .expect("Test data should be valid");
                (x, Array1::from(y))
            })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn value_roundtrip_preserves_equality(
        value in value_strategy(),
        compression in compression_strategy(),
    ) {
        let mut buf = Vec::new();
        let options = SaveOptions::new().with_compression(compression);
        serialization::save_with(&value, &mut buf, &options).unwrap();

        let restored: Value = serialization::load(buf.as_slice()).unwrap();
        prop_assert_eq!(restored, value);
    }

    #[test]
    fn value_save_is_deterministic(value in value_strategy()) {
        let a = serialization::to_bytes(&value).unwrap();
        let b = serialization::to_bytes(&value).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn truncated_artifact_never_loads(value in value_strategy(), cut in any::<prop::sample::Index>()) {
        let bytes = serialization::to_bytes(&value).unwrap();
        let len = cut.index(bytes.len());
        let result = serialization::from_bytes::<Value>(&bytes[..len]);
        prop_assert!(result.is_err());
    }

    #[test]
    fn flipped_bit_never_loads_silently(value in value_strategy(), pos in any::<prop::sample::Index>(), bit in 0u8..8) {
        let mut bytes = serialization::to_bytes(&value).unwrap();
        let i = pos.index(bytes.len());
        bytes[i] ^= 1 << bit;
        prop_assert!(serialization::from_bytes::<Value>(&bytes).is_err());
    }

    #[test]
    fn fitted_model_roundtrip_is_bit_exact((x, y) in dataset_strategy()) {
        let model = match LinearRegression::new().fit(&x, &y) {
            Ok(model) => model,
            // random designs can be numerically singular
            Err(PersistError::SingularMatrix) => return Ok(()),
            Err(e) => return Err(TestCaseError::fail(e.to_string())),
        };

        let bytes = serialization::to_bytes(&model).unwrap();
        let loaded: LinearModel<Fitted> = serialization::from_bytes(&bytes).unwrap();

        prop_assert_eq!(loaded.intercept().to_bits(), model.intercept().to_bits());
        for (a, b) in model.coefficients().iter().zip(loaded.coefficients()) {
            prop_assert_eq!(a.to_bits(), b.to_bits());
        }
        prop_assert_eq!(&loaded, &model);

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("model.bin");
        model.save_to_file(&path).unwrap();
        let from_file: LinearModel<Fitted> = persist::load(&path).unwrap();
        prop_assert_eq!(&from_file, &model);

        let before = model.predict_batch(&x).unwrap();
        let after = loaded.predict_batch(&x).unwrap();
        for (a, b) in before.iter().zip(after.iter()) {
            prop_assert_eq!(a.to_bits(), b.to_bits());
        }
    }
}

#[test]
fn model_file_roundtrip_through_inference_model() {
    let x = Array2::from_shape_vec((4, 1), vec![0.0, 1.0, 2.0, 3.0]).unwrap();
    let y = Array1::from(vec![1.0, 3.0, 5.0, 7.0]);
    let model = LinearRegression::new().fit(&x, &y).unwrap();

    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("linear_regression.model");
    model.save_to_file(&path).unwrap();

    let loaded = LinearModel::<Fitted>::load_from_file(&path).unwrap();
    assert_eq!(loaded, model);
    assert_eq!(
        loaded.predict_batch(&x).unwrap(),
        model.predict_batch(&x).unwrap()
    );
}

#[test]
fn value_artifact_cannot_be_loaded_as_model() {
    let value = Value::list([1.into(), 2.into()]);
    let bytes = serialization::to_bytes(&value).unwrap();

    let err = serialization::from_bytes::<LinearModel<Fitted>>(&bytes).unwrap_err();
    assert!(matches!(err, PersistError::TypeMismatch { .. }));

    // without the type check the payload is still rejected by the decoder
    let options = LoadOptions::new().with_verify_type(false);
    assert!(serialization::load_with::<LinearModel<Fitted>, _>(bytes.as_slice(), &options).is_err());
}
