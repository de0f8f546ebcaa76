//! Document store boundary.
//!
//! Every persisted record in the site lives in a named collection of JSON documents. The
//! [`DocumentStore`] trait exposes the handful of operations the services need, so a hosted
//! database adapter and the in-memory [`MemoryDocumentStore`] are interchangeable.

mod memory;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use memory::MemoryDocumentStore;

/// Collections used across the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    News,
    Teachers,
    Gallery,
    Videos,
    PpdbApplicants,
    Events,
    Settings,
    Grades,
    Attendance,
    Announcements,
    Payments,
}

impl Collection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Collection::News => "news",
            Collection::Teachers => "teachers",
            Collection::Gallery => "gallery",
            Collection::Videos => "videos",
            Collection::PpdbApplicants => "ppdb_applicants",
            Collection::Events => "events",
            Collection::Settings => "settings",
            Collection::Grades => "grades",
            Collection::Attendance => "attendance",
            Collection::Announcements => "announcements",
            Collection::Payments => "payments",
        }
    }
}

/// A document together with the identifier the store assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub data: Value,
}

/// One write inside an all-or-nothing [`DocumentStore::batch`].
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOp {
    Add {
        collection: Collection,
        data: Value,
    },
    /// Create or fully replace the document at `id`.
    Set {
        collection: Collection,
        id: String,
        data: Value,
    },
    /// Shallow-merge `data` into an existing document.
    Merge {
        collection: Collection,
        id: String,
        data: Value,
    },
    Delete {
        collection: Collection,
        id: String,
    },
}

/// Storage abstraction shared by the admissions, content, settings, and portal services.
pub trait DocumentStore: Send + Sync {
    /// All documents of a collection in insertion order.
    fn list(&self, collection: Collection) -> Result<Vec<StoredDocument>, StoreError>;
    fn get(&self, collection: Collection, id: &str) -> Result<Option<StoredDocument>, StoreError>;
    fn add(&self, collection: Collection, data: Value) -> Result<String, StoreError>;
    /// Shallow-merge the fields of `partial` into the document at `id`.
    fn update(&self, collection: Collection, id: &str, partial: Value) -> Result<(), StoreError>;
    fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError>;
    /// Apply every operation or none of them.
    fn batch(&self, ops: Vec<BatchOp>) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document {id} not found in {collection}")]
    NotFound { collection: &'static str, id: String },
    #[error("document must be a JSON object")]
    InvalidDocument,
    #[error("malformed document: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn not_found(collection: Collection, id: &str) -> Self {
        StoreError::NotFound {
            collection: collection.as_str(),
            id: id.to_string(),
        }
    }
}
