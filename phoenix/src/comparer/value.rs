use chrono::{DateTime, FixedOffset, NaiveDate};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::fmt::{Debug, Display, Formatter};
use std::time::Duration;

/// Compare two floats for equality, treating `NaN` as equal to itself.
#[inline]
fn num_eq_float(a: f64, b: f64) -> bool {
    if a.is_nan() && b.is_nan() {
        true
    } else {
        a == b
    }
}

// Debug formatting keeps NaN, infinities and the sign of zero distinct.
fn canonical_float<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:?}", value))
}

/// A snapshot of a property value, as recorded in a
/// [`CompareResult`](crate::comparer::CompareResult).
///
/// # Variants
/// - `Null`: the property or its owner was absent
/// - `Bool`, `I64`, `U64`, `F64`, `Char`, `String`: primitive and text values
/// - `Enum`: a unit enum variant, by name
/// - `Uuid`, `DateTime`, `Date`, `Duration`: opaque library values
/// - `Array`: an ordered collection
/// - `Map`: key/value entries, ordered by the canonical form of the key
/// - `Object`: a nested object, fields in declaration order
///
/// Container types are erased: a `Vec`, a `VecDeque` and an array holding
/// the same elements produce the same `Value`.
#[derive(Clone, Default, Serialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(#[serde(serialize_with = "canonical_float")] f64),
    Char(char),
    String(String),
    Enum(String),
    Uuid(uuid::Uuid),
    DateTime(DateTime<FixedOffset>),
    Date(NaiveDate),
    Duration(Duration),
    Array(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Builds an [`Value::Object`] from fields in declaration order.
    pub fn object<'a, I: IntoIterator<Item = (&'a str, Value)>>(fields: I) -> Self {
        Value::Object(
            fields
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }

    /// Builds a [`Value::Map`] with entries ordered by canonical key.
    pub fn map<I: IntoIterator<Item = (Value, Value)>>(entries: I) -> Self {
        let mut keyed: Vec<(String, (Value, Value))> = entries
            .into_iter()
            .map(|(key, value)| (key.canonical_form(), (key, value)))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        Value::Map(keyed.into_iter().map(|(_, entry)| entry).collect())
    }

    /// Builds a [`Value::Array`] for an unordered collection, ordering the
    /// elements by their canonical form.
    pub fn unordered<I: IntoIterator<Item = Value>>(elements: I) -> Self {
        let mut keyed: Vec<(String, Value)> = elements
            .into_iter()
            .map(|value| (value.canonical_form(), value))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        Value::Array(keyed.into_iter().map(|(_, value)| value).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Deterministic text encoding used as an equality key for collections.
    ///
    /// The encoding is tagged with the variant name, so values of different
    /// kinds never share a canonical form, and it preserves element order.
    pub fn canonical_form(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| {
            log::warn!("Falling back to debug encoding for canonical form: {}", err);
            format!("{:?}", self)
        })
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => num_eq_float(*a, *b),
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|((ka, va), (kb, vb))| ka == kb && va == vb)
            }
            _ => false,
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(v) => write!(f, "Bool({})", v),
            Value::I64(v) => write!(f, "I64({})", v),
            Value::U64(v) => write!(f, "U64({})", v),
            Value::F64(v) => write!(f, "F64({:?})", v),
            Value::Char(v) => write!(f, "Char({:?})", v),
            Value::String(v) => write!(f, "String({:?})", v),
            Value::Enum(v) => write!(f, "Enum({})", v),
            Value::Uuid(v) => write!(f, "Uuid({})", v),
            Value::DateTime(v) => write!(f, "DateTime({})", v.to_rfc3339()),
            Value::Date(v) => write!(f, "Date({})", v),
            Value::Duration(v) => write!(f, "Duration({:?})", v),
            Value::Array(v) => f.debug_list().entries(v).finish(),
            Value::Map(v) => f
                .debug_map()
                .entries(v.iter().map(|(key, value)| (key, value)))
                .finish(),
            Value::Object(v) => f.debug_map().entries(v.iter()).finish(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::Enum(v) => write!(f, "{}", v),
            Value::Uuid(v) => write!(f, "{}", v),
            Value::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
            Value::Date(v) => write!(f, "{}", v),
            Value::Duration(v) => write!(f, "{:?}", v),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Object(fields) => {
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::I64(value as i64)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::U64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<uuid::Uuid> for Value {
    fn from(value: uuid::Uuid) -> Self {
        Value::Uuid(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}
