//! PPDB (new-student admission) intake and applicant roster administration.

pub mod bulk;
pub mod domain;
pub mod intake;
pub mod repository;
pub mod roster;
pub mod router;
pub mod service;
pub mod summary;
pub mod verification;

#[cfg(test)]
mod tests;

pub use bulk::{
    bulk_delete, bulk_export_csv, bulk_set_ai_verified, bulk_set_status, ExportError,
    EXPORT_HEADER,
};
pub use domain::{
    AdmissionStatus, AiVerificationStatus, Applicant, ApplicantDocuments, ApplicantId,
    ApplicantSubmission,
};
pub use intake::{FieldViolation, ValidationError};
pub use repository::ApplicantRepository;
pub use roster::{
    clear_selection, is_all_selected, is_partially_selected, select_all_visible,
    toggle_selection, view, RosterQuery, Selection, SortDirection, SortDirective, SortField,
    StatusFilter,
};
pub use router::{ppdb_admin_router, ppdb_public_router};
pub use service::{BulkOutcome, PpdbAdminService, PpdbServiceError};
pub use summary::StatusSummary;
pub use verification::{simulate_ai_verify, DocumentVerifier, FixedVerifier, SimulatedVerifier};
