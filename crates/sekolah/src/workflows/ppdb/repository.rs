use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use super::domain::{AdmissionStatus, AiVerificationStatus, Applicant, ApplicantId};
use crate::store::{BatchOp, Collection, DocumentStore, StoreError, StoredDocument};

const COLLECTION: Collection = Collection::PpdbApplicants;

/// Typed access to the `ppdb_applicants` collection.
#[derive(Debug)]
pub struct ApplicantRepository<S> {
    store: Arc<S>,
}

impl<S> Clone for ApplicantRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: DocumentStore> ApplicantRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Full roster in insertion order.
    pub fn roster(&self) -> Result<Vec<Applicant>, StoreError> {
        self.store
            .list(COLLECTION)?
            .into_iter()
            .map(decode)
            .collect()
    }

    pub fn fetch(&self, id: &ApplicantId) -> Result<Option<Applicant>, StoreError> {
        self.store.get(COLLECTION, id.as_str())?.map(decode).transpose()
    }

    pub fn insert(&self, mut applicant: Applicant) -> Result<Applicant, StoreError> {
        let id = self.store.add(COLLECTION, encode(&applicant)?)?;
        applicant.id = ApplicantId(id);
        Ok(applicant)
    }

    pub fn set_status(&self, id: &ApplicantId, status: AdmissionStatus) -> Result<(), StoreError> {
        self.store
            .update(COLLECTION, id.as_str(), json!({ "status": status }))
    }

    pub fn set_ai_status(
        &self,
        id: &ApplicantId,
        status: AiVerificationStatus,
    ) -> Result<(), StoreError> {
        self.store
            .update(COLLECTION, id.as_str(), json!({ "ai_status": status }))
    }

    pub fn delete(&self, id: &ApplicantId) -> Result<(), StoreError> {
        self.store.delete(COLLECTION, id.as_str())
    }

    /// Persists the difference between two roster snapshots in a single batch. Returns the
    /// number of written operations.
    ///
    /// Changed applicants are written as a merge of only the fields that differ, so fields
    /// the transform left alone keep whatever value the store holds at write time.
    pub fn commit(&self, before: &[Applicant], after: &[Applicant]) -> Result<usize, StoreError> {
        let remaining: HashMap<&ApplicantId, &Applicant> = after
            .iter()
            .map(|applicant| (&applicant.id, applicant))
            .collect();

        let mut ops = Vec::new();
        for original in before {
            match remaining.get(&original.id) {
                None => ops.push(BatchOp::Delete {
                    collection: COLLECTION,
                    id: original.id.0.clone(),
                }),
                Some(updated) if *updated != original => ops.push(BatchOp::Merge {
                    collection: COLLECTION,
                    id: original.id.0.clone(),
                    data: changed_fields(&encode(original)?, &encode(updated)?),
                }),
                Some(_) => {}
            }
        }

        let written = ops.len();
        if written > 0 {
            self.store.batch(ops)?;
        }
        Ok(written)
    }
}

/// Top-level fields of `after` that differ from `before`; dropped fields become `null`.
fn changed_fields(before: &Value, after: &Value) -> Value {
    let (Value::Object(before), Value::Object(after)) = (before, after) else {
        return after.clone();
    };

    let mut changed = Map::new();
    for (key, value) in after {
        if before.get(key) != Some(value) {
            changed.insert(key.clone(), value.clone());
        }
    }
    for key in before.keys() {
        if !after.contains_key(key) {
            changed.insert(key.clone(), Value::Null);
        }
    }
    Value::Object(changed)
}

fn decode(document: StoredDocument) -> Result<Applicant, StoreError> {
    let mut applicant: Applicant = serde_json::from_value(document.data)?;
    applicant.id = ApplicantId(document.id);
    Ok(applicant)
}

fn encode(applicant: &Applicant) -> Result<Value, StoreError> {
    let mut value = serde_json::to_value(applicant)?;
    if let Value::Object(fields) = &mut value {
        fields.remove("id");
    }
    Ok(value)
}
