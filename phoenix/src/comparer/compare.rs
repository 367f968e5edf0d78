use crate::common::PATH_SEPARATOR;
use crate::comparer::{Inspect, TypeDescriptor, Value, ValueKind};
use std::any::Any;
use std::fmt::{Display, Formatter};

/// One changed leaf property between two object versions.
#[derive(Clone, Debug, PartialEq)]
pub struct CompareResult {
    property_name: String,
    old_value: Value,
    new_value: Value,
}

impl CompareResult {
    pub fn new(property_name: &str, old_value: Value, new_value: Value) -> Self {
        CompareResult {
            property_name: property_name.to_string(),
            old_value,
            new_value,
        }
    }

    /// Dotted path from the compared root, e.g. `address.city`.
    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    pub fn old_value(&self) -> &Value {
        &self.old_value
    }

    pub fn new_value(&self) -> &Value {
        &self.new_value
    }
}

impl Display for CompareResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} -> {}", self.property_name, self.old_value, self.new_value)
    }
}

/// Lists the leaf properties that differ between two versions of a value.
///
/// Either side may be `None`, in which case every leaf of the other side is
/// compared against null. Nested objects are walked and reported with dotted
/// paths; collections are compared as a whole by canonical form, so any
/// change in content or element order is one entry for the collection.
/// Properties marked `#[compare(ignore)]` never appear.
///
/// A root without a property list, such as a number or a `Vec`, is compared
/// as a single value and reported under the empty path.
///
/// # Example
/// ```ignore
/// let changes = compare(Some(&before), Some(&after));
/// for change in &changes {
///     println!("{}", change);
/// }
/// ```
pub fn compare<T: Inspect>(old: Option<&T>, new: Option<&T>) -> Vec<CompareResult> {
    match T::descriptor() {
        Some(descriptor) => compare_with(
            descriptor,
            old.and_then(|it| it.instance()),
            new.and_then(|it| it.instance()),
        ),
        None => {
            let mut results = Vec::new();
            let old_value = old.map(Inspect::to_value).unwrap_or_default();
            let new_value = new.map(Inspect::to_value).unwrap_or_default();
            if differs(T::value_kind(), &old_value, &new_value) {
                results.push(CompareResult::new("", old_value, new_value));
            }
            results
        }
    }
}

/// Compares two type-erased instances of the type described by
/// `descriptor`. `None` stands for a null side.
pub fn compare_with(
    descriptor: &TypeDescriptor,
    old: Option<&dyn Any>,
    new: Option<&dyn Any>,
) -> Vec<CompareResult> {
    let mut results = Vec::new();
    compare_properties(descriptor, old, new, "", &mut results);
    results
}

fn compare_properties(
    descriptor: &TypeDescriptor,
    old: Option<&dyn Any>,
    new: Option<&dyn Any>,
    prefix: &str,
    results: &mut Vec<CompareResult>,
) {
    for property in descriptor.properties() {
        if property.is_ignored() {
            continue;
        }

        let path = property_path(prefix, property.name());
        let old_field = old.and_then(|owner| property.read(owner));
        let new_field = new.and_then(|owner| property.read(owner));
        let old_value = old_field.map(|it| it.to_value()).unwrap_or_default();
        let new_value = new_field.map(|it| it.to_value()).unwrap_or_default();

        if property.kind() != ValueKind::ComplexObject {
            if differs(property.kind(), &old_value, &new_value) {
                results.push(CompareResult::new(&path, old_value, new_value));
            }
            continue;
        }

        let old_instance = old_field.and_then(|it| it.instance());
        let new_instance = new_field.and_then(|it| it.instance());
        if same_instance(old_instance, new_instance) || old_value == new_value {
            continue;
        }

        match property.nested_descriptor() {
            Some(nested) => {
                log::trace!("Comparing nested {} at {}", nested.name(), path);
                compare_properties(nested, old_instance, new_instance, &path, results);
            }
            None => results.push(CompareResult::new(&path, old_value, new_value)),
        }
    }
}

fn differs(kind: ValueKind, old: &Value, new: &Value) -> bool {
    match kind {
        ValueKind::Collection => old.canonical_form() != new.canonical_form(),
        _ => old != new,
    }
}

fn same_instance(old: Option<&dyn Any>, new: Option<&dyn Any>) -> bool {
    match (old, new) {
        (Some(a), Some(b)) => std::ptr::eq(
            a as *const dyn Any as *const (),
            b as *const dyn Any as *const (),
        ),
        _ => false,
    }
}

fn property_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", prefix, PATH_SEPARATOR, name)
    }
}
