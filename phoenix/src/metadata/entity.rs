use crate::metadata::{EntityType, Markers};

/// Trait that exposes a stored type's metadata markers.
///
/// Implemented by the `Entity` derive macro. The derive turns every generic
/// type parameter into a probed type argument, so a repository type
/// parameterized by an entity inherits the entity's markers.
///
/// # Usage
/// ```ignore
/// #[derive(Entity)]
/// #[entity(profile = "main")]
/// pub struct AuditedEntity;
///
/// #[derive(Entity)]
/// #[entity(collection = "orders", base = "AuditedEntity")]
/// pub struct Order {
///     id: Uuid,
///     total: f64,
/// }
/// ```
pub trait Entity: 'static {
    /// Returns the marker lineage of the implementing type.
    fn entity_type() -> EntityType;
}

/// Resolves the configuration profile name for `T`, if any type on its
/// lineage names one.
pub fn resolve_profile_name<T: Entity>() -> Option<String> {
    T::entity_type().resolve_profile_name()
}

/// Resolves the collection name for `T`. Type arguments resolve first, each
/// with its own bucket fallback; the bucket name suffixed with `.files` is
/// used when nothing on `T`'s chain names a collection.
pub fn resolve_collection_name<T: Entity>() -> Option<String> {
    T::entity_type().resolve_collection_name()
}

/// Resolves the file bucket name for `T`.
pub fn resolve_bucket_name<T: Entity>() -> Option<String> {
    T::entity_type().resolve_bucket_name()
}

// Key types never carry markers, but generic repositories probe them.
macro_rules! unmarked_entity {
    ($($t:ty),* $(,)?) => {
        $(
            impl Entity for $t {
                fn entity_type() -> EntityType {
                    EntityType::new(std::any::type_name::<$t>(), Markers::new())
                }
            }
        )*
    };
}

unmarked_entity!(
    (),
    bool,
    i8,
    i16,
    i32,
    i64,
    i128,
    u8,
    u16,
    u32,
    u64,
    u128,
    isize,
    usize,
    char,
    String,
    uuid::Uuid,
);
