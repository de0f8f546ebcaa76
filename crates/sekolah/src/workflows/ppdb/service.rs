use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tracing::{error, info};

use super::bulk::{self, ExportError};
use super::domain::{
    AdmissionStatus, AiVerificationStatus, Applicant, ApplicantId, ApplicantSubmission,
};
use super::intake::{self, ValidationError};
use super::repository::ApplicantRepository;
use super::roster::{RosterQuery, Selection};
use super::summary::StatusSummary;
use super::verification::DocumentVerifier;
use crate::content::settings::{PpdbSchedule, SiteSettings};
use crate::store::{DocumentStore, StoreError};

/// Result of a bulk action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct BulkOutcome {
    /// Selected applicants that existed in the roster.
    pub affected: usize,
    /// Documents written in the batch.
    pub written: usize,
}

/// Admissions back office: public intake plus the administrator roster actions.
///
/// Bulk actions run the pure roster transforms from [`bulk`], persist the difference in one
/// batched store write, and clear the caller's selection once the write succeeded.
///
/// Intake and bulk actions read the roster and write back what they derived from it; both
/// hold `roster_writes` for the whole read-compute-write so registration numbers stay unique
/// and a bulk batch never works from a stale snapshot.
pub struct PpdbAdminService<S, V> {
    repository: ApplicantRepository<S>,
    settings: SiteSettings<S>,
    verifier: Arc<V>,
    roster_writes: Mutex<()>,
}

impl<S, V> PpdbAdminService<S, V>
where
    S: DocumentStore + 'static,
    V: DocumentVerifier + 'static,
{
    pub fn new(store: Arc<S>, verifier: Arc<V>) -> Self {
        Self {
            repository: ApplicantRepository::new(store.clone()),
            settings: SiteSettings::new(store),
            verifier,
            roster_writes: Mutex::new(()),
        }
    }

    pub fn roster(&self) -> Result<Vec<Applicant>, PpdbServiceError> {
        Ok(self.repository.roster()?)
    }

    /// Visible, ordered subset of the roster for the given query.
    pub fn view(&self, query: &RosterQuery) -> Result<Vec<Applicant>, PpdbServiceError> {
        let roster = self.repository.roster()?;
        Ok(query.view(&roster).into_iter().cloned().collect())
    }

    pub fn get(&self, id: &ApplicantId) -> Result<Applicant, PpdbServiceError> {
        self.repository
            .fetch(id)?
            .ok_or_else(|| PpdbServiceError::NotFound(id.clone()))
    }

    pub fn schedule(&self) -> Result<PpdbSchedule, PpdbServiceError> {
        Ok(self.settings.load::<PpdbSchedule>()?)
    }

    /// Validates and stores a public admission form.
    pub fn submit(
        &self,
        submission: ApplicantSubmission,
        today: NaiveDate,
    ) -> Result<Applicant, PpdbServiceError> {
        intake::validate_submission(&submission)?;

        let schedule = self.schedule()?;
        if !schedule.is_open(today) {
            return Err(PpdbServiceError::AdmissionsClosed);
        }

        let _guard = self
            .roster_writes
            .lock()
            .expect("ppdb roster write lock poisoned");
        let roster = self.repository.roster()?;
        let registration_number = intake::next_registration_number(&roster, today);
        let applicant = intake::admit(submission, registration_number, today);
        let stored = self.repository.insert(applicant).map_err(log_store_error)?;

        info!(
            id = %stored.id,
            registration_number = %stored.registration_number,
            "ppdb application received"
        );
        Ok(stored)
    }

    pub fn set_status(
        &self,
        id: &ApplicantId,
        status: AdmissionStatus,
    ) -> Result<Applicant, PpdbServiceError> {
        let mut applicant = self.get(id)?;
        self.repository
            .set_status(id, status)
            .map_err(log_store_error)?;
        applicant.status = status;
        info!(%id, status = status.key(), "applicant status changed");
        Ok(applicant)
    }

    /// Deletes one applicant and drops it from `selection`.
    pub fn delete(&self, id: &ApplicantId, selection: &mut Selection) -> Result<(), PpdbServiceError> {
        self.get(id)?;
        self.repository.delete(id).map_err(log_store_error)?;
        selection.remove(id);
        info!(%id, "applicant deleted");
        Ok(())
    }

    /// Runs the document check for one applicant and stores the outcome.
    pub fn verify(&self, id: &ApplicantId) -> Result<AiVerificationStatus, PpdbServiceError> {
        let applicant = self.get(id)?;
        let outcome = self.verifier.verify(&applicant);
        self.repository
            .set_ai_status(id, outcome)
            .map_err(log_store_error)?;
        info!(%id, outcome = outcome.label(), "document verification recorded");
        Ok(outcome)
    }

    pub fn bulk_set_status(
        &self,
        selection: &mut Selection,
        status: AdmissionStatus,
    ) -> Result<BulkOutcome, PpdbServiceError> {
        self.apply_bulk(selection, "set_status", |roster, selection| {
            bulk::bulk_set_status(roster, selection, status)
        })
    }

    pub fn bulk_set_ai_verified(
        &self,
        selection: &mut Selection,
    ) -> Result<BulkOutcome, PpdbServiceError> {
        self.apply_bulk(selection, "set_ai_verified", bulk::bulk_set_ai_verified)
    }

    pub fn bulk_delete(&self, selection: &mut Selection) -> Result<BulkOutcome, PpdbServiceError> {
        self.apply_bulk(selection, "delete", bulk::bulk_delete)
    }

    /// CSV of the selected applicants. The selection is left untouched.
    pub fn export_csv(&self, selection: &Selection) -> Result<Vec<u8>, PpdbServiceError> {
        let roster = self.repository.roster()?;
        let bytes = bulk::bulk_export_csv(&roster, selection)?;
        info!(rows = selection.len(), "applicant export generated");
        Ok(bytes)
    }

    pub fn summary(&self) -> Result<StatusSummary, PpdbServiceError> {
        let roster = self.repository.roster()?;
        Ok(StatusSummary::from_roster(&roster))
    }

    fn apply_bulk<F>(
        &self,
        selection: &mut Selection,
        action: &'static str,
        transform: F,
    ) -> Result<BulkOutcome, PpdbServiceError>
    where
        F: FnOnce(&[Applicant], &Selection) -> Vec<Applicant>,
    {
        if selection.is_empty() {
            return Ok(BulkOutcome {
                affected: 0,
                written: 0,
            });
        }

        let _guard = self
            .roster_writes
            .lock()
            .expect("ppdb roster write lock poisoned");
        let roster = self.repository.roster()?;
        let affected = roster
            .iter()
            .filter(|applicant| selection.contains(&applicant.id))
            .count();
        let updated = transform(&roster, &*selection);
        let written = self
            .repository
            .commit(&roster, &updated)
            .map_err(log_store_error)?;

        info!(action, selected = selection.len(), affected, written, "bulk action applied");
        selection.clear();
        Ok(BulkOutcome { affected, written })
    }
}

fn log_store_error(err: StoreError) -> StoreError {
    error!(error = %err, "ppdb store write failed");
    err
}

/// Error raised by the admissions service.
#[derive(Debug, thiserror::Error)]
pub enum PpdbServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("admissions are closed")]
    AdmissionsClosed,
    #[error("applicant {0} not found")]
    NotFound(ApplicantId),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
