//! Dynamically-typed value graphs.
//!
//! [`Value`] models the composite data a program typically wants to stash on
//! disk without declaring a dedicated struct: scalars, lists, tuples,
//! dictionaries, sets and objects with named fields. It implements
//! `Serialize`/`Deserialize`, so it goes through [`crate::serialization`]
//! like any other type.
//!
//! Dictionary keys and set members are restricted to [`Key`], the hashable
//! subset of values (no floats, lists, dicts or sets).
//!
//! ```rust
//! use persist_rs::value::{Key, Value};
//!
//! let data = Value::dict([
//!     ("a", Value::list([1.into(), 2.0.into(), Value::tuple([3.into(), 4.into()])])),
//!     ("b", Value::set([Key::from("hello"), Key::from(7)])),
//! ]);
//!
//! let bytes = persist_rs::serialization::to_bytes(&data).unwrap();
//! let restored: Value = persist_rs::serialization::from_bytes(&bytes).unwrap();
//! assert_eq!(restored, data);
//! assert_eq!(restored.to_string(), "{'a': [1, 2.0, (3, 4)], 'b': {7, 'hello'}}");
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PersistError, Result};

/// Hashable, totally ordered value usable as a dictionary key or set member.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Key {
    None,
    Bool(bool),
    Int(i64),
    Str(String),
    Bytes(Vec<u8>),
    Tuple(Vec<Key>),
}

/// An object with a class name and named fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub class: String,
    pub fields: BTreeMap<String, Value>,
}

impl Object {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add or replace a field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// A dynamically-typed composite value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Dict(BTreeMap<Key, Value>),
    Set(BTreeSet<Key>),
    Object(Object),
}

impl Value {
    pub fn list<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::List(items.into_iter().collect())
    }

    pub fn tuple<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::Tuple(items.into_iter().collect())
    }

    pub fn set<I: IntoIterator<Item = Key>>(items: I) -> Self {
        Value::Set(items.into_iter().collect())
    }

    pub fn dict<K, I>(entries: I) -> Self
    where
        K: Into<Key>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Dict(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Name of the variant, as used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Dict(_) => "dict",
            Value::Set(_) => "set",
            Value::Object(_) => "object",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Look up `key` in a dictionary value.
    pub fn get(&self, key: impl Into<Key>) -> Option<&Value> {
        match self {
            Value::Dict(map) => map.get(&key.into()),
            _ => None,
        }
    }

    /// Number of elements of a container, `None` for scalars.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Str(s) => Some(s.chars().count()),
            Value::Bytes(b) => Some(b.len()),
            Value::List(items) | Value::Tuple(items) => Some(items.len()),
            Value::Dict(map) => Some(map.len()),
            Value::Set(set) => Some(set.len()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }
}

impl TryFrom<Value> for Key {
    type Error = PersistError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::None => Ok(Key::None),
            Value::Bool(b) => Ok(Key::Bool(b)),
            Value::Int(i) => Ok(Key::Int(i)),
            Value::Str(s) => Ok(Key::Str(s)),
            Value::Bytes(b) => Ok(Key::Bytes(b)),
            Value::Tuple(items) => items
                .into_iter()
                .map(Key::try_from)
                .collect::<Result<Vec<_>>>()
                .map(Key::Tuple),
            other => Err(PersistError::InvalidInput(format!(
                "unhashable type: '{}'",
                other.type_name()
            ))),
        }
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        match key {
            Key::None => Value::None,
            Key::Bool(b) => Value::Bool(b),
            Key::Int(i) => Value::Int(i),
            Key::Str(s) => Value::Str(s),
            Key::Bytes(b) => Value::Bytes(b),
            Key::Tuple(items) => Value::Tuple(items.into_iter().map(Value::from).collect()),
        }
    }
}

macro_rules! impl_from {
    ($target:ident: $($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for $target {
                fn from(v: $ty) -> Self {
                    $target::$variant(v.into())
                }
            }
        )*
    };
}

impl_from!(Value:
    bool => Bool,
    i32 => Int,
    i64 => Int,
    u32 => Int,
    f64 => Float,
    f32 => Float,
    String => Str,
    &str => Str,
    Vec<Value> => List,
    Object => Object,
);

impl_from!(Key:
    bool => Bool,
    i32 => Int,
    i64 => Int,
    u32 => Int,
    String => Str,
    &str => Str,
);

fn write_str_repr(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "'")?;
    for c in s.chars() {
        match c {
            '\'' => write!(f, "\\'")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "'")
}

fn write_bytes_repr(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    write!(f, "b'")?;
    for &b in bytes {
        if (b.is_ascii_graphic() && b != b'\'' && b != b'\\') || b == b' ' {
            write!(f, "{}", b as char)?;
        } else {
            write!(f, "\\x{:02x}", b)?;
        }
    }
    write!(f, "'")
}

fn write_seq<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    items: &[T],
    close: &str,
) -> fmt::Result {
    write!(f, "{}", open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    if open == "(" && items.len() == 1 {
        write!(f, ",")?;
    }
    write!(f, "{}", close)
}

// Exponent notation below 1e-4 and from 1e16 up, with a signed two-digit
// exponent: `1e+16`, `1.5e-05`.
fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_nan() {
        return write!(f, "nan");
    }
    if x.is_infinite() {
        return write!(f, "{}", if x > 0.0 { "inf" } else { "-inf" });
    }
    let abs = x.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let sci = format!("{:e}", x);
        let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
        let exp: i32 = exp.parse().unwrap_or(0);
        let sign = if exp < 0 { '-' } else { '+' };
        return write!(f, "{}e{}{:02}", mantissa, sign, exp.abs());
    }
    if x.fract() == 0.0 {
        write!(f, "{:.1}", x)
    } else {
        write!(f, "{}", x)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::None => write!(f, "None"),
            Key::Bool(true) => write!(f, "True"),
            Key::Bool(false) => write!(f, "False"),
            Key::Int(i) => write!(f, "{}", i),
            Key::Str(s) => write_str_repr(f, s),
            Key::Bytes(b) => write_bytes_repr(f, b),
            Key::Tuple(items) => write_seq(f, "(", items, ")"),
        }
    }
}

/// Renders values the way the tutorial output shows them, e.g.
/// `{'a': [1, 2.0, (3, 4)]}`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write_float(f, *x),
            Value::Str(s) => write_str_repr(f, s),
            Value::Bytes(b) => write_bytes_repr(f, b),
            Value::List(items) => write_seq(f, "[", items, "]"),
            Value::Tuple(items) => write_seq(f, "(", items, ")"),
            Value::Dict(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Set(set) if set.is_empty() => write!(f, "set()"),
            Value::Set(set) => {
                let items: Vec<&Key> = set.iter().collect();
                write_seq(f, "{", &items, "}")
            }
            Value::Object(obj) => {
                write!(f, "{}(", obj.class)?;
                for (i, (name, v)) in obj.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", name, v)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::{from_bytes, to_bytes};

    fn sample() -> Value {
        Value::dict([
            (
                "a",
                Value::list([1.into(), 2.0.into(), Value::tuple([3.into(), 4.into()])]),
            ),
            ("b", Value::set([Key::from("hello"), Key::from(7)])),
            ("c", Value::Bytes(b"raw\x00".to_vec())),
            (
                "point",
                Object::new("Point")
                    .with_field("x", 1.5)
                    .with_field("y", -2)
                    .into(),
            ),
        ])
    }

    #[test]
    fn test_value_roundtrip() {
        let original = sample();
        let restored: Value = from_bytes(&to_bytes(&original).unwrap()).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_nested_keys_roundtrip() {
        let key = Key::Tuple(vec![Key::Int(1), Key::Str("x".into()), Key::None]);
        let original = Value::dict([(key.clone(), Value::Bool(true))]);
        let restored: Value = from_bytes(&to_bytes(&original).unwrap()).unwrap();
        assert_eq!(restored.get(key), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            sample().to_string(),
            "{'a': [1, 2.0, (3, 4)], 'b': {7, 'hello'}, 'c': b'raw\\x00', \
             'point': Point(x=1.5, y=-2)}"
        );
        assert_eq!(Value::tuple([1.into()]).to_string(), "(1,)");
        assert_eq!(Value::set(Vec::<Key>::new()).to_string(), "set()");
        assert_eq!(Value::from("it's").to_string(), "'it\\'s'");
        assert_eq!(Value::Float(f64::NAN).to_string(), "nan");
        assert_eq!(Value::None.to_string(), "None");
    }

    #[test]
    fn test_display_floats() {
        let cases = [
            (2.0, "2.0"),
            (-0.0, "-0.0"),
            (0.1, "0.1"),
            (1e15, "1000000000000000.0"),
            (1e16, "1e+16"),
            (-2.5e20, "-2.5e+20"),
            (1e-4, "0.0001"),
            (1.5e-5, "1.5e-05"),
            (1e-300, "1e-300"),
            (f64::INFINITY, "inf"),
            (f64::NEG_INFINITY, "-inf"),
        ];
        for (x, expected) in cases {
            assert_eq!(Value::Float(x).to_string(), expected, "formatting {:?}", x);
        }
    }

    #[test]
    fn test_accessors() {
        let v = sample();
        assert_eq!(v.len(), Some(4));
        assert_eq!(v.get("b").and_then(Value::len), Some(2));
        assert_eq!(v.get("missing"), None);
        assert_eq!(Value::Int(3).as_float(), Some(3.0));
        assert_eq!(Value::from("s").as_str(), Some("s"));
        assert_eq!(Value::Float(1.0).as_int(), None);
        assert!(Value::list([]).is_empty());
        assert!(!Value::Int(0).is_empty());

        match v.get("point") {
            Some(Value::Object(obj)) => assert_eq!(obj.get("y"), Some(&Value::Int(-2))),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_key_conversion() {
        let key = Key::try_from(Value::tuple([1.into(), "a".into()])).unwrap();
        assert_eq!(key, Key::Tuple(vec![Key::Int(1), Key::Str("a".into())]));
        assert_eq!(Value::from(key.clone()), Value::tuple([1.into(), "a".into()]));

        let err = Key::try_from(Value::list([1.into()])).unwrap_err();
        assert!(err.to_string().contains("unhashable type: 'list'"));
        assert!(Key::try_from(Value::Float(1.0)).is_err());
        assert!(Key::try_from(Value::tuple([Value::Float(1.0)])).is_err());
    }
}
