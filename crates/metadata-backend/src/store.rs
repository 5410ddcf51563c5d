use std::future::Future;

use metadata_core::{Category, Event, Instance, TypeDef};

use crate::error::BackendError;

/// Storage-agnostic trait for the backing store consumed by the API
/// service (spec §6 "Backing-store interface").
///
/// Uses RPITIT (return-position `impl Trait` in trait) for async methods,
/// avoiding the `async-trait` crate.
pub trait MetadataStore: Send + Sync {
    /// Upsert a type. When `all_fields_must_match` is `true` and a type of
    /// the same name already exists, the call succeeds only if its stored
    /// shape (properties + category) is identical; otherwise it fails with
    /// [`BackendError::TypeConflict`]. Returns the stored type with its
    /// assigned id.
    fn put_type(
        &self,
        type_def: &TypeDef,
        all_fields_must_match: bool,
    ) -> impl Future<Output = Result<TypeDef, BackendError>> + Send;

    /// Look up a type by its canonical name within a category.
    fn get_type(
        &self,
        category: Category,
        name: &str,
    ) -> impl Future<Output = Result<TypeDef, BackendError>> + Send;

    /// Look up a type by its backend-assigned id.
    fn get_type_by_id(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<TypeDef, BackendError>> + Send;

    /// List every type of the given category.
    fn list_types(
        &self,
        category: Category,
    ) -> impl Future<Output = Result<Vec<TypeDef>, BackendError>> + Send;

    /// Create an instance (Artifact or Execution). Returns the stored
    /// instance with its assigned id.
    fn put_instance(
        &self,
        instance: &Instance,
    ) -> impl Future<Output = Result<Instance, BackendError>> + Send;

    /// Look up an instance by category and id.
    fn get_instance(
        &self,
        category: Category,
        id: i64,
    ) -> impl Future<Output = Result<Instance, BackendError>> + Send;

    /// List every instance of the given category.
    fn list_instances(
        &self,
        category: Category,
    ) -> impl Future<Output = Result<Vec<Instance>, BackendError>> + Send;

    /// List instances of the given category whose type has the given name.
    fn get_instances_by_type(
        &self,
        category: Category,
        type_name: &str,
    ) -> impl Future<Output = Result<Vec<Instance>, BackendError>> + Send;

    /// List artifacts whose `uri` matches exactly.
    fn get_artifacts_by_uri(
        &self,
        uri: &str,
    ) -> impl Future<Output = Result<Vec<Instance>, BackendError>> + Send;

    /// Persist one or more events atomically.
    fn put_events(
        &self,
        events: &[Event],
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// All events referencing any of the given artifact ids.
    fn get_events_by_artifact_ids(
        &self,
        ids: &[i64],
    ) -> impl Future<Output = Result<Vec<Event>, BackendError>> + Send;

    /// All events referencing any of the given execution ids.
    fn get_events_by_execution_ids(
        &self,
        ids: &[i64],
    ) -> impl Future<Output = Result<Vec<Event>, BackendError>> + Send;

    /// Release any held resources (connections, background tasks). Called
    /// once during service shutdown (spec §9 "Service.Close").
    fn shutdown(&self) -> impl Future<Output = Result<(), BackendError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time verification that the trait is RPITIT-usable and
    // requires Send + Sync, mirroring the teacher's own trait tests.
    fn _assert_metadata_store_send_sync<T: MetadataStore>() {}
}
