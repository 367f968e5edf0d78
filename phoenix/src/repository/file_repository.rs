use crate::common::{BUCKET_METADATA_SUFFIX, DEFAULT_CHUNK_SIZE};
use crate::connection::{ConnectionManager, DatabaseOf, DocumentDriver};
use crate::errors::PhoenixResult;
use crate::metadata::{resolve_bucket_name, resolve_profile_name, Entity};
use crate::repository::{require_name, require_non_blank, require_profile};
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

/// A file bucket whose file records carry metadata of type `M`.
///
/// File metadata lives in the `<bucket>.files` collection of the profile's
/// database.
pub struct FileRepository<M: Entity, D: DocumentDriver> {
    profile_name: String,
    bucket_name: String,
    manager: ConnectionManager<D>,
    _metadata: PhantomData<fn() -> M>,
}

impl<M: Entity, D: DocumentDriver> FileRepository<M, D> {
    /// Creates a file repository using the profile and bucket names resolved
    /// from `M`'s markers.
    ///
    /// # Errors
    ///
    /// Returns `MetadataNotFound` when either name cannot be resolved and
    /// `ProfileNotFound` when the resolved profile is not configured.
    pub fn new(manager: ConnectionManager<D>) -> PhoenixResult<Self> {
        let type_name = std::any::type_name::<M>();
        let profile_name = require_name(resolve_profile_name::<M>(), "profile", type_name)?;
        let bucket_name = require_name(resolve_bucket_name::<M>(), "bucket", type_name)?;
        Self::bind(profile_name, bucket_name, manager)
    }

    /// Creates a file repository on `profile_name`, taking the bucket name
    /// from `M`'s markers.
    pub fn with_profile(profile_name: &str, manager: ConnectionManager<D>) -> PhoenixResult<Self> {
        let profile_name = require_non_blank(profile_name, "Profile")?;
        let bucket_name = require_name(
            resolve_bucket_name::<M>(),
            "bucket",
            std::any::type_name::<M>(),
        )?;
        Self::bind(profile_name, bucket_name, manager)
    }

    /// Creates a file repository with explicit names.
    pub fn with_names(
        profile_name: &str,
        bucket_name: &str,
        manager: ConnectionManager<D>,
    ) -> PhoenixResult<Self> {
        let profile_name = require_non_blank(profile_name, "Profile")?;
        let bucket_name = require_non_blank(bucket_name, "Bucket")?;
        Self::bind(profile_name, bucket_name, manager)
    }

    fn bind(
        profile_name: String,
        bucket_name: String,
        manager: ConnectionManager<D>,
    ) -> PhoenixResult<Self> {
        require_profile(&manager, &profile_name)?;
        log::debug!(
            "File repository for {} bound to bucket '{}' on profile '{}'",
            std::any::type_name::<M>(),
            bucket_name,
            profile_name
        );
        Ok(FileRepository {
            profile_name,
            bucket_name,
            manager,
            _metadata: PhantomData,
        })
    }

    pub fn database(&self) -> PhoenixResult<Arc<DatabaseOf<D>>> {
        self.manager.get_database_by_id(&self.profile_name)
    }

    pub fn profile_name(&self) -> &str {
        &self.profile_name
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    /// Name of the collection holding file records and their metadata.
    pub fn metadata_collection_name(&self) -> String {
        format!("{}{}", self.bucket_name, BUCKET_METADATA_SUFFIX)
    }

    /// Upload chunk size in bytes: the profile's default chunk size, or
    /// 255 KiB when the profile leaves it unset.
    pub fn chunk_size(&self) -> usize {
        match self.manager.profiles().get(&self.profile_name) {
            Some(profile) if profile.default_chunk_size() > 0 => profile.default_chunk_size(),
            _ => DEFAULT_CHUNK_SIZE,
        }
    }
}

impl<M: Entity, D: DocumentDriver> Clone for FileRepository<M, D> {
    fn clone(&self) -> Self {
        FileRepository {
            profile_name: self.profile_name.clone(),
            bucket_name: self.bucket_name.clone(),
            manager: self.manager.clone(),
            _metadata: PhantomData,
        }
    }
}

impl<M: Entity, D: DocumentDriver> Debug for FileRepository<M, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileRepository")
            .field("metadata", &std::any::type_name::<M>())
            .field("profile_name", &self.profile_name)
            .field("bucket_name", &self.bucket_name)
            .finish()
    }
}
