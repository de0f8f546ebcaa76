use std::collections::HashSet;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use serde_json::json;

use super::common::*;
use crate::content::settings::{PpdbSchedule, SiteSettings};
use crate::store::MemoryDocumentStore;
use crate::workflows::ppdb::domain::{AdmissionStatus, AiVerificationStatus, ApplicantId};
use crate::workflows::ppdb::roster::{RosterQuery, Selection, StatusFilter};
use crate::workflows::ppdb::service::{BulkOutcome, PpdbAdminService, PpdbServiceError};
use crate::workflows::ppdb::verification::FixedVerifier;

fn selection_of(ids: &[&ApplicantId]) -> Selection {
    ids.iter().map(|id| (*id).clone()).collect()
}

#[test]
fn submit_assigns_registration_number_and_persists() {
    let (service, _store) = build_service(AiVerificationStatus::Verified);

    let first = service
        .submit(submission(), date(2024, 5, 10))
        .expect("submission accepted");
    let second = service
        .submit(submission(), date(2024, 5, 11))
        .expect("submission accepted");

    assert_eq!(first.registration_number, "PPDB240001");
    assert_eq!(second.registration_number, "PPDB240002");
    assert_eq!(first.status, AdmissionStatus::Waiting);
    assert!(!first.id.as_str().is_empty());

    let stored = service.get(&first.id).expect("applicant stored");
    assert_eq!(stored, first);
    assert_eq!(service.roster().expect("roster").len(), 2);
}

#[test]
fn submit_rejects_invalid_forms_without_writing() {
    let (service, _store) = build_service(AiVerificationStatus::Verified);
    let mut form = submission();
    form.nik = "123".to_string();

    let err = service
        .submit(form, date(2024, 5, 10))
        .expect_err("invalid nik rejected");
    assert!(matches!(err, PpdbServiceError::Validation(_)));
    assert!(service.roster().expect("roster").is_empty());
}

#[test]
fn submit_is_refused_outside_the_schedule() {
    let (service, store) = build_service(AiVerificationStatus::Verified);
    SiteSettings::new(store)
        .save(&PpdbSchedule {
            academic_year: "2024/2025".to_string(),
            opens_on: Some(date(2024, 5, 1)),
            closes_on: Some(date(2024, 6, 30)),
            announcement_on: Some(date(2024, 7, 5)),
        })
        .expect("schedule saved");

    let err = service
        .submit(submission(), date(2024, 7, 1))
        .expect_err("closed window");
    assert!(matches!(err, PpdbServiceError::AdmissionsClosed));
    assert!(service.submit(submission(), date(2024, 6, 30)).is_ok());
}

#[test]
fn bulk_status_persists_and_clears_selection() {
    let (service, store) = build_service(AiVerificationStatus::Verified);
    let seeded = seed(&store);

    let waiting = service
        .view(&RosterQuery {
            status: StatusFilter::Only(AdmissionStatus::Waiting),
            ..RosterQuery::default()
        })
        .expect("view");
    assert_eq!(waiting.len(), 2);

    let mut selection: Selection = waiting.iter().map(|applicant| applicant.id.clone()).collect();
    let outcome = service
        .bulk_set_status(&mut selection, AdmissionStatus::Verified)
        .expect("bulk update");

    assert_eq!(outcome, BulkOutcome { affected: 2, written: 2 });
    assert!(selection.is_empty());

    let summary = service.summary().expect("summary");
    assert_eq!(summary.count(AdmissionStatus::Waiting), 0);
    assert_eq!(summary.count(AdmissionStatus::Verified), 3);
    assert_eq!(
        service.get(&seeded[0].id).expect("stored").status,
        AdmissionStatus::Verified
    );
}

#[test]
fn bulk_on_empty_selection_writes_nothing() {
    let (service, store) = build_service(AiVerificationStatus::Verified);
    seed(&store);
    let mut selection = Selection::new();

    let outcome = service.bulk_delete(&mut selection).expect("no-op");
    assert_eq!(outcome, BulkOutcome { affected: 0, written: 0 });
    assert_eq!(service.roster().expect("roster").len(), 5);
}

#[test]
fn bulk_delete_ignores_unknown_ids() {
    let (service, store) = build_service(AiVerificationStatus::Verified);
    let seeded = seed(&store);
    let ghost = ApplicantId::new("ghost");
    let mut selection = selection_of(&[&seeded[1].id, &seeded[3].id, &ghost]);

    let outcome = service.bulk_delete(&mut selection).expect("bulk delete");
    assert_eq!(outcome.affected, 2);
    assert_eq!(outcome.written, 2);

    let remaining = service.roster().expect("roster");
    assert_eq!(remaining.len(), 3);
    assert!(remaining.iter().all(|applicant| applicant.id != seeded[1].id));
}

#[test]
fn bulk_ai_verification_marks_selected_as_verified() {
    let (service, store) = build_service(AiVerificationStatus::ManualReview);
    let seeded = seed(&store);
    let mut selection = selection_of(&[&seeded[0].id]);

    service
        .bulk_set_ai_verified(&mut selection)
        .expect("bulk ai update");

    let roster = service.roster().expect("roster");
    assert_eq!(roster[0].ai_status, AiVerificationStatus::Verified);
    assert_eq!(roster[1].ai_status, AiVerificationStatus::NotChecked);
}

#[test]
fn failed_store_write_keeps_selection() {
    let inner = Arc::new(MemoryDocumentStore::new());
    let seeded = seed(&inner);
    let inner = Arc::try_unwrap(inner).expect("seed released the store");
    let store = Arc::new(ReadOnlyStore { inner });
    let service = PpdbAdminService::new(
        store,
        Arc::new(FixedVerifier(AiVerificationStatus::Verified)),
    );

    let mut selection = selection_of(&[&seeded[0].id, &seeded[1].id]);
    let err = service
        .bulk_set_status(&mut selection, AdmissionStatus::Accepted)
        .expect_err("write fails");

    assert!(matches!(err, PpdbServiceError::Store(_)));
    assert_eq!(selection.len(), 2);
    assert_eq!(
        service.roster().expect("roster")[0].status,
        AdmissionStatus::Waiting
    );
}

#[test]
fn single_delete_drops_id_from_selection() {
    let (service, store) = build_service(AiVerificationStatus::Verified);
    let seeded = seed(&store);
    let mut selection = selection_of(&[&seeded[0].id, &seeded[2].id]);

    service
        .delete(&seeded[0].id, &mut selection)
        .expect("delete succeeds");

    assert!(!selection.contains(&seeded[0].id));
    assert!(selection.contains(&seeded[2].id));
    assert!(matches!(
        service.get(&seeded[0].id),
        Err(PpdbServiceError::NotFound(_))
    ));
}

#[test]
fn verify_stores_the_verifier_outcome() {
    let (service, store) = build_service(AiVerificationStatus::ManualReview);
    let seeded = seed(&store);

    let outcome = service.verify(&seeded[2].id).expect("verify");
    assert_eq!(outcome, AiVerificationStatus::ManualReview);
    assert_eq!(
        service.get(&seeded[2].id).expect("stored").ai_status,
        AiVerificationStatus::ManualReview
    );
    assert_eq!(
        service.get(&seeded[2].id).expect("stored").status,
        AdmissionStatus::Verified
    );
}

#[test]
fn single_status_change_on_unknown_id_is_not_found() {
    let (service, store) = build_service(AiVerificationStatus::Verified);
    seed(&store);

    let err = service
        .set_status(&ApplicantId::new("missing"), AdmissionStatus::Accepted)
        .expect_err("unknown applicant");
    assert!(matches!(err, PpdbServiceError::NotFound(id) if id.as_str() == "missing"));
}

#[test]
fn export_leaves_selection_untouched() {
    let (service, store) = build_service(AiVerificationStatus::Verified);
    let seeded = seed(&store);
    let selection = selection_of(&[&seeded[4].id]);

    let csv = String::from_utf8(service.export_csv(&selection).expect("export")).expect("utf-8");
    assert_eq!(csv.lines().count(), 2);
    assert!(csv.contains("\"PPDB240005\",\"Eka Putri\""));
    assert!(csv.contains("\"Ditolak\""));
    assert_eq!(selection.len(), 1);
}

#[test]
fn concurrent_submissions_get_distinct_numbers() {
    let (service, _store) = build_service(AiVerificationStatus::Verified);
    let service = Arc::new(service);
    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let service = service.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                service
                    .submit(submission(), date(2024, 6, 1))
                    .expect("submission accepted")
                    .registration_number
            })
        })
        .collect();

    let numbers: HashSet<String> = handles
        .into_iter()
        .map(|handle| handle.join().expect("submitter thread"))
        .collect();
    assert_eq!(numbers.len(), threads);
    assert!(numbers.contains("PPDB240001"));
    assert!(numbers.contains(&format!("PPDB24{threads:04}")));
}

#[test]
fn bulk_status_keeps_fields_written_since_the_roster_was_read() {
    let inner = Arc::new(MemoryDocumentStore::new());
    let seeded = seed(&inner);
    let inner = Arc::try_unwrap(inner).expect("seed released the store");
    let store = Arc::new(InterleavingStore {
        inner,
        pending: Mutex::new(Some((
            seeded[0].id.as_str().to_string(),
            json!({ "ai_status": "verified" }),
        ))),
    });
    let service = PpdbAdminService::new(
        store,
        Arc::new(FixedVerifier(AiVerificationStatus::Verified)),
    );

    let mut selection = selection_of(&[&seeded[0].id]);
    service
        .bulk_set_status(&mut selection, AdmissionStatus::Accepted)
        .expect("bulk update");

    let stored = service.get(&seeded[0].id).expect("applicant stored");
    assert_eq!(stored.status, AdmissionStatus::Accepted);
    assert_eq!(stored.ai_status, AiVerificationStatus::Verified);
}
