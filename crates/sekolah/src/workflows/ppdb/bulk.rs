//! Roster transforms applied to every selected applicant, plus the CSV export.

use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::domain::{AdmissionStatus, AiVerificationStatus, Applicant, ApplicantId};
use super::roster::Selection;

/// Fixed header row of the applicant export.
pub const EXPORT_HEADER: &str =
    "NomorPendaftaran,NamaLengkap,AsalSekolah,Status,NIK,NamaAyah,NamaIbu,Telepon";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write export row: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush export buffer: {0}")]
    Flush(String),
}

pub fn bulk_set_status(
    roster: &[Applicant],
    selection: &Selection,
    status: AdmissionStatus,
) -> Vec<Applicant> {
    map_selected(roster, selection, |applicant| applicant.status = status)
}

pub fn bulk_set_ai_verified(roster: &[Applicant], selection: &Selection) -> Vec<Applicant> {
    map_selected(roster, selection, |applicant| {
        applicant.ai_status = AiVerificationStatus::Verified
    })
}

pub fn bulk_delete(roster: &[Applicant], selection: &Selection) -> Vec<Applicant> {
    roster
        .iter()
        .filter(|applicant| !selection.contains(&applicant.id))
        .cloned()
        .collect()
}

pub fn set_status(roster: &[Applicant], id: &ApplicantId, status: AdmissionStatus) -> Vec<Applicant> {
    roster
        .iter()
        .cloned()
        .map(|mut applicant| {
            if &applicant.id == id {
                applicant.status = status;
            }
            applicant
        })
        .collect()
}

/// Removes `id` from the roster and from `selection`.
pub fn delete(roster: &[Applicant], selection: &mut Selection, id: &ApplicantId) -> Vec<Applicant> {
    selection.remove(id);
    roster
        .iter()
        .filter(|applicant| &applicant.id != id)
        .cloned()
        .collect()
}

/// Header plus one fully quoted row per selected applicant, in roster order.
///
/// Embedded double quotes are doubled so free-text fields cannot break a row.
pub fn bulk_export_csv(roster: &[Applicant], selection: &Selection) -> Result<Vec<u8>, ExportError> {
    let mut buffer = Vec::with_capacity(EXPORT_HEADER.len() + 1);
    buffer.extend_from_slice(EXPORT_HEADER.as_bytes());
    buffer.push(b'\n');

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buffer);

    for applicant in roster
        .iter()
        .filter(|applicant| selection.contains(&applicant.id))
    {
        writer.write_record([
            applicant.registration_number.as_str(),
            applicant.full_name.as_str(),
            applicant.origin_school.as_str(),
            applicant.status.label(),
            applicant.nik.as_str(),
            applicant.father_name.as_str(),
            applicant.mother_name.as_str(),
            applicant.phone.as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.error().to_string()))
}

fn map_selected<F>(roster: &[Applicant], selection: &Selection, mut change: F) -> Vec<Applicant>
where
    F: FnMut(&mut Applicant),
{
    roster
        .iter()
        .cloned()
        .map(|mut applicant| {
            if selection.contains(&applicant.id) {
                change(&mut applicant);
            }
            applicant
        })
        .collect()
}
