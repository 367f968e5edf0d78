use crate::comparer::{Inspect, ValueKind};
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::fmt::{Debug, Formatter};
use std::sync::LazyLock;

/// Reads one property out of an owner instance.
///
/// Returns `None` when the owner is not of the expected type.
pub type Accessor = for<'a> fn(&'a dyn Any) -> Option<&'a dyn Inspect>;

type NestedDescriptor = fn() -> Option<&'static TypeDescriptor>;

static DESCRIPTORS: LazyLock<DashMap<TypeId, &'static TypeDescriptor>> =
    LazyLock::new(DashMap::new);

/// A type whose properties can be walked by the structural comparer.
///
/// Implemented by the `Comparable` derive macro.
pub trait Comparable: Inspect + Sized {
    /// Builds the property list of this type. Called once per type; use
    /// [`descriptor_of`] to get the cached descriptor.
    fn describe() -> TypeDescriptor;
}

/// Returns the cached descriptor for `T`, building it on first use.
pub fn descriptor_of<T: Comparable>() -> &'static TypeDescriptor {
    let type_id = TypeId::of::<T>();
    if let Some(descriptor) = DESCRIPTORS.get(&type_id) {
        return *descriptor;
    }

    // built outside the shard lock, describe() may look up nested types
    let built: &'static TypeDescriptor = Box::leak(Box::new(T::describe()));
    log::trace!("Registered type descriptor for {}", built.name());
    *DESCRIPTORS.entry(type_id).or_insert(built)
}

/// The ordered property list of a complex object type.
#[derive(Debug)]
pub struct TypeDescriptor {
    name: &'static str,
    properties: Vec<PropertyDescriptor>,
}

impl TypeDescriptor {
    pub fn new(name: &'static str, properties: Vec<PropertyDescriptor>) -> Self {
        TypeDescriptor { name, properties }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Properties in declaration order, ignored ones included.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|it| it.name == name)
    }
}

/// A single readable property of a [`TypeDescriptor`].
#[derive(Clone, Copy)]
pub struct PropertyDescriptor {
    name: &'static str,
    kind: ValueKind,
    ignored: bool,
    accessor: Accessor,
    nested: NestedDescriptor,
}

impl PropertyDescriptor {
    /// Describes a property of type `F`. Its kind and nested descriptor
    /// come from `F`'s [`Inspect`] implementation.
    pub fn new<F: Inspect>(name: &'static str, accessor: Accessor) -> Self {
        PropertyDescriptor {
            name,
            kind: F::value_kind(),
            ignored: false,
            accessor,
            nested: F::descriptor,
        }
    }

    /// Marks the property as excluded from diffing.
    pub fn ignored(mut self, ignored: bool) -> Self {
        self.ignored = ignored;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    /// Reads this property from `owner`.
    pub fn read<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Inspect> {
        (self.accessor)(owner)
    }

    /// The descriptor of the property's type, for complex objects.
    pub fn nested_descriptor(&self) -> Option<&'static TypeDescriptor> {
        (self.nested)()
    }
}

impl Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("ignored", &self.ignored)
            .finish()
    }
}
