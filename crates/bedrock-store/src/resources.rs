//! # Resource Module
//!
//! Loaded collections plus the CRUD actions that keep them in step with the
//! backend. One set of actions serves every [`ResourceKind`].
//!
//! State only changes after a successful response. The loading flag is the
//! exception: it is raised before the request and always lowered after it.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use bedrock_client::ResourceApi;
use bedrock_core::{
    parse_collection, CoreError, Resource, ResourceCollections, ResourceId, ResourceKind,
};

use crate::error::StoreResult;
use crate::store::{Mutation, Store};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResourceState {
    pub collections: ResourceCollections,
    pub loading: bool,
}

impl Store {
    /// Replaces the collection of `kind` with the backend's list.
    pub async fn fetch_resources(&self, kind: ResourceKind) -> StoreResult<Vec<Resource>> {
        let _ = self.commit(Mutation::SetLoading(true));
        let result = self.request_collection(kind).await;
        let _ = self.commit(Mutation::SetLoading(false));
        self.report("fetch_resources", result)
    }

    async fn request_collection(&self, kind: ResourceKind) -> StoreResult<Vec<Resource>> {
        let http = self.http();
        let body = ResourceApi::new(&http, &self.config.api.namespace)
            .list(kind)
            .await?;
        let records = parse_collection(kind, body)?;
        info!(kind = %kind, count = records.len(), "Collection loaded");

        self.commit(Mutation::SetResources {
            kind,
            records: records.clone(),
        })?;
        Ok(records)
    }

    /// Loads one record and upserts it into its collection.
    pub async fn fetch_resource(
        &self,
        kind: ResourceKind,
        id: ResourceId,
    ) -> StoreResult<Resource> {
        let _ = self.commit(Mutation::SetLoading(true));
        let result = self.request_one(kind, &id).await;
        let _ = self.commit(Mutation::SetLoading(false));
        self.report("fetch_resource", result)
    }

    async fn request_one(&self, kind: ResourceKind, id: &ResourceId) -> StoreResult<Resource> {
        let http = self.http();
        let body = ResourceApi::new(&http, &self.config.api.namespace)
            .get(kind, id)
            .await?;
        let record = Resource::from_value(body)?;
        debug!(kind = %kind, id = %id, "Record loaded");

        self.commit(Mutation::SetResource {
            kind,
            record: record.clone(),
        })?;
        Ok(record)
    }

    /// Posts a new record and appends the backend's copy of it.
    pub async fn create_resource(
        &self,
        kind: ResourceKind,
        resource: Value,
    ) -> StoreResult<Resource> {
        let _ = self.commit(Mutation::SetLoading(true));
        let result = self.request_create(kind, resource).await;
        let _ = self.commit(Mutation::SetLoading(false));
        self.report("create_resource", result)
    }

    async fn request_create(&self, kind: ResourceKind, resource: Value) -> StoreResult<Resource> {
        let http = self.http();
        let body = ResourceApi::new(&http, &self.config.api.namespace)
            .create(kind, &resource)
            .await?;
        let created = Resource::from_value(body)?;
        info!(kind = %kind, id = ?created.id(), "Record created");

        self.commit(Mutation::AddResource {
            kind,
            record: created.clone(),
        })?;
        Ok(created)
    }

    /// PUTs `resource` to its id and merges the response into the loaded
    /// record. A record that is not loaded yields `NotFound`.
    pub async fn update_resource(
        &self,
        kind: ResourceKind,
        resource: Value,
    ) -> StoreResult<Resource> {
        let _ = self.commit(Mutation::SetLoading(true));
        let result = self.request_update(kind, resource).await;
        let _ = self.commit(Mutation::SetLoading(false));
        self.report("update_resource", result)
    }

    async fn request_update(&self, kind: ResourceKind, resource: Value) -> StoreResult<Resource> {
        let resource = Resource::from_value(resource)?;
        let id = resource.id().ok_or(CoreError::MissingId { kind })?;

        let http = self.http();
        let body = ResourceApi::new(&http, &self.config.api.namespace)
            .update(kind, &id, &resource.into_value())
            .await?;

        // the merge is keyed on the id that was sent
        let mut updated = Resource::from_value(body)?;
        if updated.id().is_none() {
            updated.insert("id", id.clone().into());
        }
        let merged = self.edit_resource(kind, updated)?;
        info!(kind = %kind, id = %id, "Record updated");
        Ok(merged)
    }

    /// Deletes a record on the backend, then drops it locally.
    pub async fn delete_resource(&self, kind: ResourceKind, id: ResourceId) -> StoreResult<()> {
        let _ = self.commit(Mutation::SetLoading(true));
        let result = self.request_delete(kind, id).await;
        let _ = self.commit(Mutation::SetLoading(false));
        self.report("delete_resource", result)
    }

    async fn request_delete(&self, kind: ResourceKind, id: ResourceId) -> StoreResult<()> {
        let http = self.http();
        ResourceApi::new(&http, &self.config.api.namespace)
            .delete(kind, &id)
            .await?;
        info!(kind = %kind, id = %id, "Record deleted");

        self.commit(Mutation::RemoveResource { kind, id })?;
        Ok(())
    }
}
