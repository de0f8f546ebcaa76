use super::common::*;
use crate::workflows::ppdb::bulk::{
    bulk_delete, bulk_export_csv, bulk_set_ai_verified, bulk_set_status, delete, set_status,
    EXPORT_HEADER,
};
use crate::workflows::ppdb::domain::{AdmissionStatus, AiVerificationStatus, ApplicantId};
use crate::workflows::ppdb::roster::{
    select_all_visible, view, Selection, SortDirective, StatusFilter,
};

fn selection_of(ids: &[&str]) -> Selection {
    ids.iter().map(|id| ApplicantId::new(*id)).collect()
}

#[test]
fn bulk_status_only_touches_selected_rows() {
    let roster = five_applicants();
    let updated = bulk_set_status(
        &roster,
        &selection_of(&["a-1", "a-5"]),
        AdmissionStatus::Accepted,
    );

    assert_eq!(updated[0].status, AdmissionStatus::Accepted);
    assert_eq!(updated[1].status, AdmissionStatus::Waiting);
    assert_eq!(updated[4].status, AdmissionStatus::Accepted);
    assert_eq!(updated[3], roster[3]);
}

#[test]
fn waiting_scenario_moves_rows_between_filters() {
    let roster = five_applicants();
    let waiting = StatusFilter::Only(AdmissionStatus::Waiting);
    let verified = StatusFilter::Only(AdmissionStatus::Verified);

    let visible = view(&roster, "", waiting, SortDirective::default());
    assert_eq!(visible.len(), 2);
    let selection = select_all_visible(&visible);

    let updated = bulk_set_status(&roster, &selection, AdmissionStatus::Verified);
    assert!(view(&updated, "", waiting, SortDirective::default()).is_empty());
    assert_eq!(view(&updated, "", verified, SortDirective::default()).len(), 3);
}

#[test]
fn bulk_ai_verification_sets_verified_only_for_selection() {
    let mut roster = five_applicants();
    roster[1].ai_status = AiVerificationStatus::ManualReview;

    let updated = bulk_set_ai_verified(&roster, &selection_of(&["a-2", "a-3"]));
    assert_eq!(updated[0].ai_status, AiVerificationStatus::NotChecked);
    assert_eq!(updated[1].ai_status, AiVerificationStatus::Verified);
    assert_eq!(updated[2].ai_status, AiVerificationStatus::Verified);
    assert_eq!(updated[2].status, AdmissionStatus::Verified);
}

#[test]
fn bulk_delete_removes_intersection_only() {
    let roster = five_applicants();
    let selection = selection_of(&["a-2", "a-4", "ghost"]);

    let remaining = bulk_delete(&roster, &selection);
    assert_eq!(remaining.len(), roster.len() - 2);
    assert!(remaining
        .iter()
        .all(|applicant| !selection.contains(&applicant.id)));
}

#[test]
fn empty_selection_is_a_no_op() {
    let roster = five_applicants();
    let empty = Selection::new();

    assert_eq!(bulk_delete(&roster, &empty), roster);
    assert_eq!(
        bulk_set_status(&roster, &empty, AdmissionStatus::Rejected),
        roster
    );
    assert_eq!(bulk_set_ai_verified(&roster, &empty), roster);
    let csv = bulk_export_csv(&roster, &empty).expect("export succeeds");
    assert_eq!(String::from_utf8(csv).expect("utf-8"), format!("{EXPORT_HEADER}\n"));
}

#[test]
fn single_actions_match_bulk_contract() {
    let roster = five_applicants();
    let id = ApplicantId::new("a-2");

    let updated = set_status(&roster, &id, AdmissionStatus::Rejected);
    assert_eq!(updated[1].status, AdmissionStatus::Rejected);
    assert_eq!(updated[0].status, AdmissionStatus::Waiting);

    let mut selection = selection_of(&["a-1", "a-2"]);
    let remaining = delete(&roster, &mut selection, &id);
    assert_eq!(remaining.len(), 4);
    assert!(!selection.contains(&id));
    assert!(selection.contains(&ApplicantId::new("a-1")));
}

#[test]
fn export_writes_header_and_quoted_rows_in_roster_order() {
    let mut first = applicant("a-1", "PPDB240001", "A B");
    first.origin_school = "SD 1".to_string();
    first.nik = "1111222233334444".to_string();
    first.father_name = "Ayah A".to_string();
    first.mother_name = "Ibu A".to_string();
    first.phone = "0811".to_string();
    let mut second = applicant("a-2", "PPDB240002", "C D");
    second.origin_school = "SD 2".to_string();
    second.nik = "5555666677778888".to_string();
    second.father_name = "Ayah C".to_string();
    second.mother_name = "Ibu C".to_string();
    second.phone = "0822".to_string();
    second.status = AdmissionStatus::Accepted;
    let roster = vec![first, second];

    let csv = bulk_export_csv(&roster, &selection_of(&["a-2", "a-1"])).expect("export succeeds");
    let expected = "NomorPendaftaran,NamaLengkap,AsalSekolah,Status,NIK,NamaAyah,NamaIbu,Telepon\n\
\"PPDB240001\",\"A B\",\"SD 1\",\"Menunggu\",\"1111222233334444\",\"Ayah A\",\"Ibu A\",\"0811\"\n\
\"PPDB240002\",\"C D\",\"SD 2\",\"Diterima\",\"5555666677778888\",\"Ayah C\",\"Ibu C\",\"0822\"\n";
    assert_eq!(String::from_utf8(csv).expect("utf-8"), expected);
}

#[test]
fn export_escapes_embedded_quotes_and_commas() {
    let mut tricky = applicant("a-1", "PPDB240001", "Ahmad \"Alif\" Rahman");
    tricky.origin_school = "SD Negeri 1, Bogor".to_string();
    let roster = vec![tricky];

    let csv = bulk_export_csv(&roster, &selection_of(&["a-1"])).expect("export succeeds");
    let text = String::from_utf8(csv).expect("utf-8");
    let row = text.lines().nth(1).expect("data row");
    assert!(row.starts_with("\"PPDB240001\",\"Ahmad \"\"Alif\"\" Rahman\",\"SD Negeri 1, Bogor\","));

    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let record = reader
        .records()
        .next()
        .expect("one record")
        .expect("record parses");
    assert_eq!(&record[1], "Ahmad \"Alif\" Rahman");
    assert_eq!(record.len(), 8);
}
