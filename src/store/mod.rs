// Document store - flat JSON records grouped in named collections
pub mod document;
pub mod sqlite;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub use document::{diff_fields, merge_fields, to_fields, Document, JsonMap};
pub use sqlite::SqliteDocumentStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] r2d2::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document payload must be a JSON object")]
    NotAnObject,

    #[error("Background task failed: {0}")]
    Task(String),
}

/// Collection-oriented access to stored documents.
///
/// Filters compare a single top-level field for string equality. Nothing here
/// enforces a schema or references between collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert under a freshly generated id.
    async fn add(&self, collection: &str, data: JsonMap) -> Result<Document, StoreError>;

    /// Create or replace the document at `id`.
    async fn set(&self, collection: &str, id: &str, data: JsonMap)
        -> Result<Document, StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Every document of the collection, in insertion order.
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Documents whose `field` equals `value`, in insertion order.
    async fn find_eq(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, StoreError>;

    /// Documents whose `eq_field` equals `eq_value` and whose `prefix_field`
    /// starts with `prefix`, ordered by `prefix_field`.
    async fn find_prefix(
        &self,
        collection: &str,
        eq_field: &str,
        eq_value: &str,
        prefix_field: &str,
        prefix: &str,
    ) -> Result<Vec<Document>, StoreError>;

    async fn count_eq(&self, collection: &str, field: &str, value: &str)
        -> Result<u64, StoreError>;

    /// Shallow-merge `patch` into the stored document. Returns false when
    /// there is nothing to update.
    async fn update(&self, collection: &str, id: &str, patch: JsonMap)
        -> Result<bool, StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    /// Delete every document matching `field == value`. Deletes are issued
    /// concurrently and are not atomic: on failure some matches may already
    /// be gone. Returns the number removed.
    async fn delete_eq(&self, collection: &str, field: &str, value: &str)
        -> Result<u64, StoreError>;
}

pub type DynDocumentStore = Arc<dyn DocumentStore>;
