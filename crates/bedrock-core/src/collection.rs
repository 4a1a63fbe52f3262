//! # Resource Collections
//!
//! In-memory collections of inventory records, keyed by [`ResourceKind`].
//!
//! ## Mutation Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Collection Mutations                                 │
//! │                                                                         │
//! │  Backend Response          Mutation            Collection Change        │
//! │  ────────────────          ────────            ─────────────────        │
//! │                                                                         │
//! │  GET  <type>/   [..] ────► set()    ─────────► replaced verbatim        │
//! │                                                                         │
//! │  GET  <type>/id {..} ────► upsert() ─────────► replace or push          │
//! │                                                                         │
//! │  POST <type>    {..} ────► add()    ─────────► push (end of list)       │
//! │                                                                         │
//! │  PUT  <type>/id {..} ────► edit()   ─────────► shallow merge by id      │
//! │                                                                         │
//! │  DELETE <type>/id ───────► remove() ─────────► remove by id             │
//! │                                                                         │
//! │  Order = insertion / fetch order. Lookups are a linear scan on `id`.   │
//! │  edit()/remove() on a missing id return CoreError::NotFound.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult};
use crate::types::{json_type_name, Resource, ResourceId, ResourceKind};

/// All loaded collections. Kinds that were never fetched read as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResourceCollections {
    collections: BTreeMap<ResourceKind, Vec<Resource>>,
}

impl ResourceCollections {
    /// Creates an empty set of collections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the records of one kind, in stored order.
    pub fn get(&self, kind: ResourceKind) -> &[Resource] {
        self.collections
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Finds a record by id.
    pub fn find(&self, kind: ResourceKind, id: &ResourceId) -> Option<&Resource> {
        self.get(kind)
            .iter()
            .find(|r| r.id().as_ref() == Some(id))
    }

    /// Number of records of one kind.
    pub fn len(&self, kind: ResourceKind) -> usize {
        self.get(kind).len()
    }

    /// True when no kind holds any record.
    pub fn is_empty(&self) -> bool {
        self.collections.values().all(Vec::is_empty)
    }

    /// Replaces a whole collection.
    pub fn set(&mut self, kind: ResourceKind, resources: Vec<Resource>) {
        self.collections.insert(kind, resources);
    }

    /// Appends a record returned by a create call.
    pub fn add(&mut self, kind: ResourceKind, resource: Resource) -> CoreResult<()> {
        if resource.id().is_none() {
            return Err(CoreError::MissingId { kind });
        }
        self.collections.entry(kind).or_default().push(resource);
        Ok(())
    }

    /// Replaces the record with the same id, or appends it when absent.
    pub fn upsert(&mut self, kind: ResourceKind, resource: Resource) -> CoreResult<()> {
        let id = resource.id().ok_or(CoreError::MissingId { kind })?;
        let records = self.collections.entry(kind).or_default();
        match position(records, &id) {
            Some(index) => records[index] = resource,
            None => records.push(resource),
        }
        Ok(())
    }

    /// Shallow-merges `updated` into the stored record with the same id.
    ///
    /// Collection length never changes.
    pub fn edit(&mut self, kind: ResourceKind, updated: Resource) -> CoreResult<&Resource> {
        let id = updated.id().ok_or(CoreError::MissingId { kind })?;
        let records = self
            .collections
            .get_mut(&kind)
            .ok_or_else(|| CoreError::NotFound { kind, id: id.clone() })?;
        let index = position(records, &id).ok_or(CoreError::NotFound { kind, id })?;

        records[index].merge(updated);
        Ok(&records[index])
    }

    /// Removes exactly one record, the one with the matching id.
    pub fn remove(&mut self, kind: ResourceKind, id: &ResourceId) -> CoreResult<Resource> {
        let not_found = || CoreError::NotFound {
            kind,
            id: id.clone(),
        };
        let records = self.collections.get_mut(&kind).ok_or_else(not_found)?;
        let index = position(records, id).ok_or_else(not_found)?;
        Ok(records.remove(index))
    }

    /// Drops every collection.
    pub fn clear(&mut self) {
        self.collections.clear();
    }
}

fn position(records: &[Resource], id: &ResourceId) -> Option<usize> {
    records.iter().position(|r| r.id().as_ref() == Some(id))
}

/// Parses a collection response body: a JSON array of objects.
///
/// Records are kept verbatim, including any without an id.
pub fn parse_collection(kind: ResourceKind, body: Value) -> CoreResult<Vec<Resource>> {
    match body {
        Value::Array(items) => items.into_iter().map(Resource::from_value).collect(),
        other => Err(CoreError::InvalidPayload(format!(
            "{} collection must be an array, got {}",
            kind,
            json_type_name(&other)
        ))),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
