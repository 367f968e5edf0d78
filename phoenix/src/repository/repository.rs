use crate::comparer::{compare, CompareResult, Inspect};
use crate::connection::{ConnectionManager, DatabaseOf, DocumentDriver};
use crate::errors::PhoenixResult;
use crate::metadata::{resolve_collection_name, resolve_profile_name, Entity};
use crate::repository::{require_name, require_non_blank, require_profile};
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

/// A collection of `E` documents bound to a configuration profile.
///
/// The profile and collection names are fixed at construction. The database
/// handle is fetched through the shared [`ConnectionManager`] on each call to
/// [`Repository::database`], which is a lock-free lookup once cached.
pub struct Repository<E: Entity, D: DocumentDriver> {
    profile_name: String,
    collection_name: String,
    manager: ConnectionManager<D>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity, D: DocumentDriver> Repository<E, D> {
    /// Creates a repository using the profile and collection names resolved
    /// from `E`'s markers.
    ///
    /// # Errors
    ///
    /// Returns `MetadataNotFound` when either name cannot be resolved and
    /// `ProfileNotFound` when the resolved profile is not configured.
    pub fn new(manager: ConnectionManager<D>) -> PhoenixResult<Self> {
        let type_name = std::any::type_name::<E>();
        let profile_name = require_name(resolve_profile_name::<E>(), "profile", type_name)?;
        let collection_name =
            require_name(resolve_collection_name::<E>(), "collection", type_name)?;
        Self::bind(profile_name, collection_name, manager)
    }

    /// Creates a repository with explicit names, ignoring `E`'s markers.
    pub fn with_names(
        profile_name: &str,
        collection_name: &str,
        manager: ConnectionManager<D>,
    ) -> PhoenixResult<Self> {
        let profile_name = require_non_blank(profile_name, "Profile")?;
        let collection_name = require_non_blank(collection_name, "Collection")?;
        Self::bind(profile_name, collection_name, manager)
    }

    fn bind(
        profile_name: String,
        collection_name: String,
        manager: ConnectionManager<D>,
    ) -> PhoenixResult<Self> {
        require_profile(&manager, &profile_name)?;
        log::debug!(
            "Repository for {} bound to collection '{}' on profile '{}'",
            std::any::type_name::<E>(),
            collection_name,
            profile_name
        );
        Ok(Repository {
            profile_name,
            collection_name,
            manager,
            _entity: PhantomData,
        })
    }

    /// The database handle of this repository's profile.
    pub fn database(&self) -> PhoenixResult<Arc<DatabaseOf<D>>> {
        self.manager.get_database_by_id(&self.profile_name)
    }

    pub fn profile_name(&self) -> &str {
        &self.profile_name
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    pub fn manager(&self) -> &ConnectionManager<D> {
        &self.manager
    }

    /// Lists the properties that differ between two versions of an entity.
    pub fn changes(&self, old: Option<&E>, new: Option<&E>) -> Vec<CompareResult>
    where
        E: Inspect,
    {
        compare(old, new)
    }
}

impl<E: Entity, D: DocumentDriver> Clone for Repository<E, D> {
    fn clone(&self) -> Self {
        Repository {
            profile_name: self.profile_name.clone(),
            collection_name: self.collection_name.clone(),
            manager: self.manager.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity, D: DocumentDriver> Debug for Repository<E, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("entity", &std::any::type_name::<E>())
            .field("profile_name", &self.profile_name)
            .field("collection_name", &self.collection_name)
            .finish()
    }
}
