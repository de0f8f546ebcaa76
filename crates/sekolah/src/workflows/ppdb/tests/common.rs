use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::store::{
    BatchOp, Collection, DocumentStore, MemoryDocumentStore, StoreError, StoredDocument,
};
use crate::workflows::ppdb::domain::{
    AdmissionStatus, AiVerificationStatus, Applicant, ApplicantDocuments, ApplicantId,
    ApplicantSubmission,
};
use crate::workflows::ppdb::repository::ApplicantRepository;
use crate::workflows::ppdb::service::PpdbAdminService;
use crate::workflows::ppdb::verification::FixedVerifier;

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(crate) fn applicant(id: &str, registration_number: &str, full_name: &str) -> Applicant {
    Applicant {
        id: ApplicantId::new(id),
        registration_number: registration_number.to_string(),
        full_name: full_name.to_string(),
        nik: "3201010101010001".to_string(),
        origin_school: "SD Negeri 1 Bogor".to_string(),
        submitted_on: date(2024, 5, 2),
        father_name: "Budi".to_string(),
        mother_name: "Siti".to_string(),
        phone: "081234567890".to_string(),
        documents: ApplicantDocuments {
            family_card: "uploads/kk.pdf".to_string(),
            birth_certificate: "uploads/akta.pdf".to_string(),
            diploma: None,
        },
        status: AdmissionStatus::Waiting,
        ai_status: AiVerificationStatus::NotChecked,
    }
}

pub(crate) fn with_status(mut applicant: Applicant, status: AdmissionStatus) -> Applicant {
    applicant.status = status;
    applicant
}

/// Five applicants with statuses Waiting, Waiting, Verified, Accepted, Rejected.
pub(crate) fn five_applicants() -> Vec<Applicant> {
    vec![
        applicant("a-1", "PPDB240001", "Andi Saputra"),
        applicant("a-2", "PPDB240002", "Bunga Lestari"),
        with_status(
            applicant("a-3", "PPDB240003", "Citra Dewi"),
            AdmissionStatus::Verified,
        ),
        with_status(
            applicant("a-4", "PPDB240004", "Dimas Pratama"),
            AdmissionStatus::Accepted,
        ),
        with_status(
            applicant("a-5", "PPDB240005", "Eka Putri"),
            AdmissionStatus::Rejected,
        ),
    ]
}

pub(crate) fn submission() -> ApplicantSubmission {
    ApplicantSubmission {
        full_name: "Fajar Nugroho".to_string(),
        nik: "3201010101010002".to_string(),
        origin_school: "SD Islam Al Azhar".to_string(),
        father_name: "Hendra".to_string(),
        mother_name: "Rina".to_string(),
        phone: "081298765432".to_string(),
        documents: ApplicantDocuments {
            family_card: "uploads/fajar-kk.pdf".to_string(),
            birth_certificate: "uploads/fajar-akta.pdf".to_string(),
            diploma: Some("uploads/fajar-ijazah.pdf".to_string()),
        },
    }
}

pub(crate) type TestService = PpdbAdminService<MemoryDocumentStore, FixedVerifier>;

pub(crate) fn build_service(verdict: AiVerificationStatus) -> (TestService, Arc<MemoryDocumentStore>) {
    let store = Arc::new(MemoryDocumentStore::new());
    let service = PpdbAdminService::new(store.clone(), Arc::new(FixedVerifier(verdict)));
    (service, store)
}

/// Stores the five-applicant roster and returns it with store-assigned ids.
pub(crate) fn seed(store: &Arc<MemoryDocumentStore>) -> Vec<Applicant> {
    let repository = ApplicantRepository::new(store.clone());
    five_applicants()
        .into_iter()
        .map(|applicant| repository.insert(applicant).expect("insert succeeds"))
        .collect()
}

/// Store whose reads succeed but whose writes always fail.
#[derive(Debug, Default)]
pub(crate) struct ReadOnlyStore {
    pub(crate) inner: MemoryDocumentStore,
}

impl DocumentStore for ReadOnlyStore {
    fn list(&self, collection: Collection) -> Result<Vec<StoredDocument>, StoreError> {
        self.inner.list(collection)
    }

    fn get(&self, collection: Collection, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        self.inner.get(collection, id)
    }

    fn add(&self, _collection: Collection, _data: Value) -> Result<String, StoreError> {
        Err(StoreError::Unavailable("read only".to_string()))
    }

    fn update(&self, _collection: Collection, _id: &str, _partial: Value) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read only".to_string()))
    }

    fn delete(&self, _collection: Collection, _id: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read only".to_string()))
    }

    fn batch(&self, _ops: Vec<BatchOp>) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read only".to_string()))
    }
}

/// Applies one extra update right before the first batch, as a second admin session would.
pub(crate) struct InterleavingStore {
    pub(crate) inner: MemoryDocumentStore,
    pub(crate) pending: Mutex<Option<(String, Value)>>,
}

impl DocumentStore for InterleavingStore {
    fn list(&self, collection: Collection) -> Result<Vec<StoredDocument>, StoreError> {
        self.inner.list(collection)
    }

    fn get(&self, collection: Collection, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        self.inner.get(collection, id)
    }

    fn add(&self, collection: Collection, data: Value) -> Result<String, StoreError> {
        self.inner.add(collection, data)
    }

    fn update(&self, collection: Collection, id: &str, partial: Value) -> Result<(), StoreError> {
        self.inner.update(collection, id, partial)
    }

    fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        self.inner.delete(collection, id)
    }

    fn batch(&self, ops: Vec<BatchOp>) -> Result<(), StoreError> {
        let pending = self.pending.lock().expect("pending mutex poisoned").take();
        if let Some((id, partial)) = pending {
            self.inner
                .update(Collection::PpdbApplicants, &id, partial)?;
        }
        self.inner.batch(ops)
    }
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(crate) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
