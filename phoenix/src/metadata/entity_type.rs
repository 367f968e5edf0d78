use crate::common::{BUCKET_METADATA_SUFFIX, MAX_LINEAGE_DEPTH};

/// The declarative markers a single type carries.
///
/// Each marker is optional. A blank string is treated the same as an absent
/// marker during resolution.
#[derive(PartialEq, Eq, Hash, Clone, Debug, Default)]
pub struct Markers {
    profile: Option<String>,
    collection: Option<String>,
    bucket: Option<String>,
}

impl Markers {
    /// Creates an empty marker set.
    pub fn new() -> Self {
        Markers::default()
    }

    /// Names the configuration profile the type's instances are stored with.
    pub fn with_profile(mut self, profile: &str) -> Self {
        self.profile = Some(profile.to_string());
        self
    }

    /// Names the collection the type's instances are stored in.
    pub fn with_collection(mut self, collection: &str) -> Self {
        self.collection = Some(collection.to_string());
        self
    }

    /// Names the file bucket the type's instances are stored in.
    pub fn with_bucket(mut self, bucket: &str) -> Self {
        self.bucket = Some(bucket.to_string());
        self
    }

    pub fn profile(&self) -> Option<&str> {
        non_blank(self.profile.as_deref())
    }

    pub fn collection(&self) -> Option<&str> {
        non_blank(self.collection.as_deref())
    }

    pub fn bucket(&self) -> Option<&str> {
        non_blank(self.bucket.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.profile().is_none() && self.collection().is_none() && self.bucket().is_none()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|it| !it.trim().is_empty())
}

/// Marker view of a stored type: its own markers, the types it is
/// parameterized by, and the type it extends.
///
/// `EntityType` is usually produced by `#[derive(Entity)]`, but it can be
/// assembled by hand for types that cannot carry the derive.
///
/// # Examples
///
/// ```rust
/// use phoenix::metadata::{EntityType, Markers};
///
/// let base = EntityType::new("Audited", Markers::new().with_profile("audit"));
/// let order = EntityType::new("Order", Markers::new().with_collection("orders"))
///     .with_base(base);
///
/// assert_eq!(order.resolve_profile_name().as_deref(), Some("audit"));
/// assert_eq!(order.resolve_collection_name().as_deref(), Some("orders"));
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct EntityType {
    name: String,
    markers: Markers,
    type_arguments: Vec<EntityType>,
    base: Option<Box<EntityType>>,
}

impl EntityType {
    pub fn new(name: &str, markers: Markers) -> Self {
        EntityType {
            name: name.to_string(),
            markers,
            type_arguments: Vec::new(),
            base: None,
        }
    }

    /// Appends a generic type argument. Arguments are probed in the order
    /// they are added.
    pub fn with_type_argument(mut self, argument: EntityType) -> Self {
        self.type_arguments.push(argument);
        self
    }

    pub fn with_base(mut self, base: EntityType) -> Self {
        self.base = Some(Box::new(base));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub fn type_arguments(&self) -> &[EntityType] {
        &self.type_arguments
    }

    pub fn base(&self) -> Option<&EntityType> {
        self.base.as_deref()
    }

    pub fn is_generic(&self) -> bool {
        !self.type_arguments.is_empty()
    }

    /// Returns the probe order used by marker resolution.
    ///
    /// For every type on the inheritance chain, the lineages of its type
    /// arguments come first (in declaration order), then the type itself.
    /// Nesting deeper than [`MAX_LINEAGE_DEPTH`] is cut off.
    pub fn lineage(&self) -> Vec<&EntityType> {
        let mut lineage = Vec::new();
        collect_lineage(self, 0, &mut lineage);
        lineage
    }

    /// Returns the first profile marker found along the lineage.
    pub fn resolve_profile_name(&self) -> Option<String> {
        self.first_marker(Markers::profile)
    }

    /// Returns the first bucket marker found along the lineage.
    pub fn resolve_bucket_name(&self) -> Option<String> {
        self.first_marker(Markers::bucket)
    }

    /// Resolves the collection name.
    ///
    /// Walks the inheritance chain. At each generic type, every type argument
    /// is resolved in full first, its own bucket fallback included, and the
    /// first name found wins. Otherwise the type's own collection marker is
    /// used. When the chain has no collection marker, the bucket name
    /// suffixed with the bucket metadata suffix is returned.
    pub fn resolve_collection_name(&self) -> Option<String> {
        resolve_collection(self, 0)
    }

    fn first_marker(&self, marker: fn(&Markers) -> Option<&str>) -> Option<String> {
        self.lineage()
            .into_iter()
            .find_map(|entity_type| marker(&entity_type.markers))
            .map(str::to_string)
    }
}

fn resolve_collection(entity_type: &EntityType, depth: usize) -> Option<String> {
    let mut current = Some(entity_type);
    let mut level = depth;

    while let Some(it) = current {
        if level >= MAX_LINEAGE_DEPTH {
            log::warn!(
                "Type lineage of '{}' exceeds {} levels, ignoring the remainder",
                entity_type.name,
                MAX_LINEAGE_DEPTH
            );
            return None;
        }

        let from_arguments = it
            .type_arguments
            .iter()
            .find_map(|argument| resolve_collection(argument, level + 1));
        if from_arguments.is_some() {
            return from_arguments;
        }

        if let Some(collection) = it.markers.collection() {
            return Some(collection.to_string());
        }

        current = it.base.as_deref();
        level += 1;
    }

    entity_type
        .resolve_bucket_name()
        .map(|bucket| format!("{}{}", bucket, BUCKET_METADATA_SUFFIX))
}

fn collect_lineage<'a>(entity_type: &'a EntityType, depth: usize, lineage: &mut Vec<&'a EntityType>) {
    let mut current = Some(entity_type);
    let mut level = depth;

    while let Some(it) = current {
        if level >= MAX_LINEAGE_DEPTH {
            log::warn!(
                "Type lineage of '{}' exceeds {} levels, ignoring the remainder",
                entity_type.name,
                MAX_LINEAGE_DEPTH
            );
            return;
        }

        for argument in &it.type_arguments {
            collect_lineage(argument, level + 1, lineage);
        }
        lineage.push(it);

        current = it.base.as_deref();
        level += 1;
    }
}
