use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use super::{BatchOp, Collection, DocumentStore, StoreError, StoredDocument};

type Collections = HashMap<Collection, Vec<StoredDocument>>;

/// Process-local document store. Collections keep insertion order and batches are applied to
/// a scratch copy that only replaces the live data once every operation succeeded.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<Collections>,
    sequence: AtomicU64,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> String {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("doc-{id:06}")
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>, StoreError> {
        self.collections
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }

    fn apply(&self, collections: &mut Collections, op: BatchOp) -> Result<(), StoreError> {
        match op {
            BatchOp::Add { collection, data } => {
                ensure_object(&data)?;
                let id = self.next_id();
                collections
                    .entry(collection)
                    .or_default()
                    .push(StoredDocument { id, data });
            }
            BatchOp::Set {
                collection,
                id,
                data,
            } => {
                ensure_object(&data)?;
                let documents = collections.entry(collection).or_default();
                match documents.iter_mut().find(|doc| doc.id == id) {
                    Some(existing) => existing.data = data,
                    None => documents.push(StoredDocument { id, data }),
                }
            }
            BatchOp::Merge {
                collection,
                id,
                data,
            } => {
                let existing = collections
                    .get_mut(&collection)
                    .and_then(|documents| documents.iter_mut().find(|doc| doc.id == id))
                    .ok_or_else(|| StoreError::not_found(collection, &id))?;
                merge_fields(&mut existing.data, data)?;
            }
            BatchOp::Delete { collection, id } => {
                let documents = collections
                    .get_mut(&collection)
                    .ok_or_else(|| StoreError::not_found(collection, &id))?;
                let position = documents
                    .iter()
                    .position(|doc| doc.id == id)
                    .ok_or_else(|| StoreError::not_found(collection, &id))?;
                documents.remove(position);
            }
        }
        Ok(())
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn list(&self, collection: Collection) -> Result<Vec<StoredDocument>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.get(&collection).cloned().unwrap_or_default())
    }

    fn get(&self, collection: Collection, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        let guard = self.lock()?;
        Ok(guard
            .get(&collection)
            .and_then(|documents| documents.iter().find(|doc| doc.id == id))
            .cloned())
    }

    fn add(&self, collection: Collection, data: Value) -> Result<String, StoreError> {
        ensure_object(&data)?;
        let mut guard = self.lock()?;
        let id = self.next_id();
        guard.entry(collection).or_default().push(StoredDocument {
            id: id.clone(),
            data,
        });
        Ok(id)
    }

    fn update(&self, collection: Collection, id: &str, partial: Value) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        self.apply(
            &mut guard,
            BatchOp::Merge {
                collection,
                id: id.to_string(),
                data: partial,
            },
        )
    }

    fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        self.apply(
            &mut guard,
            BatchOp::Delete {
                collection,
                id: id.to_string(),
            },
        )
    }

    fn batch(&self, ops: Vec<BatchOp>) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        let mut scratch = (*guard).clone();
        for op in ops {
            self.apply(&mut scratch, op)?;
        }
        *guard = scratch;
        Ok(())
    }
}

fn ensure_object(data: &Value) -> Result<(), StoreError> {
    if data.is_object() {
        Ok(())
    } else {
        Err(StoreError::InvalidDocument)
    }
}

fn merge_fields(target: &mut Value, partial: Value) -> Result<(), StoreError> {
    let Value::Object(fields) = partial else {
        return Err(StoreError::InvalidDocument);
    };
    let Value::Object(existing) = target else {
        return Err(StoreError::InvalidDocument);
    };
    for (key, value) in fields {
        existing.insert(key, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_preserves_insertion_order() {
        let store = MemoryDocumentStore::new();
        let first = store
            .add(Collection::News, json!({ "title": "first" }))
            .expect("add succeeds");
        let second = store
            .add(Collection::News, json!({ "title": "second" }))
            .expect("add succeeds");

        let ids: Vec<String> = store
            .list(Collection::News)
            .expect("list succeeds")
            .into_iter()
            .map(|doc| doc.id)
            .collect();
        assert_eq!(ids, vec![first, second]);
        assert!(store.list(Collection::Videos).expect("list").is_empty());
    }

    #[test]
    fn update_merges_top_level_fields() {
        let store = MemoryDocumentStore::new();
        let id = store
            .add(Collection::Teachers, json!({ "name": "Bu Sari", "subject": "IPA" }))
            .expect("add succeeds");

        store
            .update(Collection::Teachers, &id, json!({ "subject": "Matematika" }))
            .expect("update succeeds");

        let doc = store
            .get(Collection::Teachers, &id)
            .expect("get succeeds")
            .expect("document present");
        assert_eq!(doc.data, json!({ "name": "Bu Sari", "subject": "Matematika" }));
    }

    #[test]
    fn update_and_delete_report_missing_documents() {
        let store = MemoryDocumentStore::new();
        assert!(matches!(
            store.update(Collection::News, "missing", json!({})),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete(Collection::News, "missing"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn rejects_non_object_documents() {
        let store = MemoryDocumentStore::new();
        assert!(matches!(
            store.add(Collection::News, json!("plain text")),
            Err(StoreError::InvalidDocument)
        ));
    }

    #[test]
    fn failed_batch_leaves_store_untouched() {
        let store = MemoryDocumentStore::new();
        let id = store
            .add(Collection::PpdbApplicants, json!({ "status": "waiting" }))
            .expect("add succeeds");

        let result = store.batch(vec![
            BatchOp::Merge {
                collection: Collection::PpdbApplicants,
                id: id.clone(),
                data: json!({ "status": "accepted" }),
            },
            BatchOp::Delete {
                collection: Collection::PpdbApplicants,
                id: "missing".to_string(),
            },
        ]);

        assert!(result.is_err());
        let doc = store
            .get(Collection::PpdbApplicants, &id)
            .expect("get succeeds")
            .expect("document present");
        assert_eq!(doc.data, json!({ "status": "waiting" }));
    }

    #[test]
    fn set_upserts_documents() {
        let store = MemoryDocumentStore::new();
        store
            .batch(vec![BatchOp::Set {
                collection: Collection::Settings,
                id: "schoolInfo".to_string(),
                data: json!({ "name": "SMP Harapan" }),
            }])
            .expect("batch succeeds");
        store
            .batch(vec![BatchOp::Set {
                collection: Collection::Settings,
                id: "schoolInfo".to_string(),
                data: json!({ "name": "SMP Harapan Bangsa" }),
            }])
            .expect("batch succeeds");

        let docs = store.list(Collection::Settings).expect("list succeeds");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].data["name"], "SMP Harapan Bangsa");
    }
}
