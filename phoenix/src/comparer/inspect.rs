use crate::comparer::{TypeDescriptor, Value};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

/// How the comparer treats a property's value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Numbers, booleans, characters and text. Compared by value.
    Primitive,
    /// Unit enum variants. Compared by value.
    Enum,
    /// Any sequence, set or map. Compared by canonical form.
    Collection,
    /// A type with a [`TypeDescriptor`]. Walked property by property.
    ComplexObject,
    /// Library values with no walkable structure. Compared by value.
    Opaque,
}

/// Runtime view of a value that the structural comparer can read.
///
/// Implemented here for the standard library, `chrono` and `uuid` types, and
/// for user types by the `Comparable` derive macro. `Option`, `Box` and
/// `Arc` forward to their contents, with `None` read as null.
pub trait Inspect: Any {
    /// The comparison strategy for values of this type.
    fn value_kind() -> ValueKind
    where
        Self: Sized;

    /// The property list of a complex object type.
    fn descriptor() -> Option<&'static TypeDescriptor>
    where
        Self: Sized,
    {
        None
    }

    /// Snapshots this value.
    fn to_value(&self) -> Value;

    /// The concrete instance behind this value, or `None` when it is null.
    fn instance(&self) -> Option<&dyn Any>;
}

macro_rules! inspect_scalar {
    ($kind:ident, $variant:ident as $conv:ty: $($t:ty),* $(,)?) => {
        $(
            impl Inspect for $t {
                fn value_kind() -> ValueKind {
                    ValueKind::$kind
                }

                fn to_value(&self) -> Value {
                    Value::$variant(*self as $conv)
                }

                fn instance(&self) -> Option<&dyn Any> {
                    Some(self)
                }
            }
        )*
    };
}

inspect_scalar!(Primitive, I64 as i64: i8, i16, i32, i64, isize);
inspect_scalar!(Primitive, U64 as u64: u8, u16, u32, u64, usize);
inspect_scalar!(Primitive, F64 as f64: f32, f64);
inspect_scalar!(Primitive, Bool as bool: bool);
inspect_scalar!(Primitive, Char as char: char);

impl Inspect for String {
    fn value_kind() -> ValueKind {
        ValueKind::Primitive
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn instance(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

impl Inspect for &'static str {
    fn value_kind() -> ValueKind {
        ValueKind::Primitive
    }

    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }

    fn instance(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

macro_rules! inspect_opaque {
    ($($t:ty => $convert:expr),* $(,)?) => {
        $(
            impl Inspect for $t {
                fn value_kind() -> ValueKind {
                    ValueKind::Opaque
                }

                fn to_value(&self) -> Value {
                    let convert: fn(&$t) -> Value = $convert;
                    convert(self)
                }

                fn instance(&self) -> Option<&dyn Any> {
                    Some(self)
                }
            }
        )*
    };
}

inspect_opaque!(
    uuid::Uuid => |v| Value::Uuid(*v),
    DateTime<Utc> => |v| Value::DateTime(v.fixed_offset()),
    DateTime<FixedOffset> => |v| Value::DateTime(*v),
    NaiveDate => |v| Value::Date(*v),
    Duration => |v| Value::Duration(*v),
);

macro_rules! inspect_sequence {
    ($($t:ident),* $(,)?) => {
        $(
            impl<T: Inspect> Inspect for $t<T> {
                fn value_kind() -> ValueKind {
                    ValueKind::Collection
                }

                fn to_value(&self) -> Value {
                    Value::Array(self.iter().map(Inspect::to_value).collect())
                }

                fn instance(&self) -> Option<&dyn Any> {
                    Some(self)
                }
            }
        )*
    };
}

inspect_sequence!(Vec, VecDeque);

impl<T: Inspect, const N: usize> Inspect for [T; N] {
    fn value_kind() -> ValueKind {
        ValueKind::Collection
    }

    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(Inspect::to_value).collect())
    }

    fn instance(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

macro_rules! inspect_set {
    ($($t:ident),* $(,)?) => {
        $(
            impl<T: Inspect> Inspect for $t<T> {
                fn value_kind() -> ValueKind {
                    ValueKind::Collection
                }

                fn to_value(&self) -> Value {
                    Value::unordered(self.iter().map(Inspect::to_value))
                }

                fn instance(&self) -> Option<&dyn Any> {
                    Some(self)
                }
            }
        )*
    };
}

inspect_set!(HashSet, BTreeSet);

macro_rules! inspect_map {
    ($($t:ident),* $(,)?) => {
        $(
            impl<K: Inspect, V: Inspect> Inspect for $t<K, V> {
                fn value_kind() -> ValueKind {
                    ValueKind::Collection
                }

                fn to_value(&self) -> Value {
                    Value::map(self.iter().map(|(k, v)| (k.to_value(), v.to_value())))
                }

                fn instance(&self) -> Option<&dyn Any> {
                    Some(self)
                }
            }
        )*
    };
}

inspect_map!(HashMap, BTreeMap);

impl<T: Inspect> Inspect for Option<T> {
    fn value_kind() -> ValueKind {
        T::value_kind()
    }

    fn descriptor() -> Option<&'static TypeDescriptor> {
        T::descriptor()
    }

    fn to_value(&self) -> Value {
        match self {
            Some(value) => value.to_value(),
            None => Value::Null,
        }
    }

    fn instance(&self) -> Option<&dyn Any> {
        self.as_ref().and_then(|value| value.instance())
    }
}

macro_rules! inspect_pointer {
    ($($t:ident),* $(,)?) => {
        $(
            impl<T: Inspect> Inspect for $t<T> {
                fn value_kind() -> ValueKind {
                    T::value_kind()
                }

                fn descriptor() -> Option<&'static TypeDescriptor> {
                    T::descriptor()
                }

                fn to_value(&self) -> Value {
                    (**self).to_value()
                }

                fn instance(&self) -> Option<&dyn Any> {
                    (**self).instance()
                }
            }
        )*
    };
}

inspect_pointer!(Box, Arc);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_kinds() {
        assert_eq!(i32::value_kind(), ValueKind::Primitive);
        assert_eq!(String::value_kind(), ValueKind::Primitive);
        assert_eq!(uuid::Uuid::value_kind(), ValueKind::Opaque);
        assert_eq!(Vec::<i32>::value_kind(), ValueKind::Collection);
        assert_eq!(HashMap::<String, i32>::value_kind(), ValueKind::Collection);
        assert_eq!(Option::<i32>::value_kind(), ValueKind::Primitive);
    }

    #[test]
    fn integers_widen() {
        assert_eq!(7u8.to_value(), Value::U64(7));
        assert_eq!((-7i16).to_value(), Value::I64(-7));
        assert_eq!(1.5f32.to_value(), Value::F64(1.5));
    }

    #[test]
    fn sequence_containers_share_a_value() {
        let list = vec![1, 2, 3];
        let deque: VecDeque<i32> = list.iter().copied().collect();
        let array = [1, 2, 3];
        assert_eq!(list.to_value(), deque.to_value());
        assert_eq!(list.to_value().canonical_form(), array.to_value().canonical_form());
    }

    #[test]
    fn hash_collections_are_order_independent() {
        let a: HashSet<i32> = (0..50).collect();
        let b: HashSet<i32> = (0..50).rev().collect();
        assert_eq!(a.to_value().canonical_form(), b.to_value().canonical_form());

        let x: HashMap<String, i32> = (0..20).map(|i| (i.to_string(), i)).collect();
        let y: HashMap<String, i32> = (0..20).rev().map(|i| (i.to_string(), i)).collect();
        assert_eq!(x.to_value().canonical_form(), y.to_value().canonical_form());
    }

    #[test]
    fn option_reads_as_null() {
        let none: Option<String> = None;
        assert!(none.to_value().is_null());
        assert!(none.instance().is_none());
        let some = Some("A".to_string());
        assert_eq!(some.to_value(), Value::from("A"));
        assert!(some.instance().is_some());
    }

    #[test]
    fn pointers_forward_to_contents() {
        let boxed = Box::new(5i64);
        let shared = Arc::new(5i64);
        assert_eq!(boxed.to_value(), shared.to_value());
        let instance = boxed.instance().and_then(|it| it.downcast_ref::<i64>());
        assert_eq!(instance, Some(&5));
    }

    #[test]
    fn empty_and_null_collections_differ() {
        let empty: Option<Vec<i32>> = Some(vec![]);
        let null: Option<Vec<i32>> = None;
        assert_ne!(empty.to_value().canonical_form(), null.to_value().canonical_form());
    }

    #[test]
    fn utc_and_fixed_offset_agree_on_same_instant() {
        let utc = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
            .map(|it| it.with_timezone(&Utc))
            .unwrap();
        let fixed = DateTime::parse_from_rfc3339("2024-05-01T12:00:00+02:00").unwrap();
        assert_eq!(utc.to_value(), fixed.to_value());
    }
}
