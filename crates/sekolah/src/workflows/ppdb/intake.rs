use chrono::{Datelike, NaiveDate};

use super::domain::{
    registration_sequence, AdmissionStatus, AiVerificationStatus, Applicant, ApplicantId,
    ApplicantSubmission, NIK_LENGTH,
};

/// Field-level problems found in an admission form. All problems are reported at once.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid submission: {}", join_violations(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldViolation {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("nik must be exactly 16 digits")]
    InvalidNik,
}

impl FieldViolation {
    pub fn field(&self) -> &'static str {
        match self {
            FieldViolation::Missing(field) => *field,
            FieldViolation::InvalidNik => "nik",
        }
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn is_valid_nik(nik: &str) -> bool {
    nik.len() == NIK_LENGTH && nik.bytes().all(|byte| byte.is_ascii_digit())
}

pub fn validate_submission(submission: &ApplicantSubmission) -> Result<(), ValidationError> {
    let required = [
        ("full_name", submission.full_name.as_str()),
        ("nik", submission.nik.as_str()),
        ("origin_school", submission.origin_school.as_str()),
        ("father_name", submission.father_name.as_str()),
        ("mother_name", submission.mother_name.as_str()),
        ("phone", submission.phone.as_str()),
        ("documents.family_card", submission.documents.family_card.as_str()),
        (
            "documents.birth_certificate",
            submission.documents.birth_certificate.as_str(),
        ),
    ];

    let mut violations: Vec<FieldViolation> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| FieldViolation::Missing(*field))
        .collect();

    if !submission.nik.trim().is_empty() && !is_valid_nik(submission.nik.trim()) {
        violations.push(FieldViolation::InvalidNik);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations })
    }
}

/// Next `PPDB<yy><seq4>` number for the year of `submitted_on`.
pub fn next_registration_number(existing: &[Applicant], submitted_on: NaiveDate) -> String {
    let prefix = format!("PPDB{:02}", submitted_on.year().rem_euclid(100));
    let last = existing
        .iter()
        .filter(|applicant| applicant.registration_number.starts_with(&prefix))
        .filter_map(|applicant| registration_sequence(&applicant.registration_number))
        .max()
        .unwrap_or(0);
    format!("{prefix}{:04}", last.saturating_add(1))
}

/// Builds the stored record for a validated submission.
pub fn admit(
    submission: ApplicantSubmission,
    registration_number: String,
    submitted_on: NaiveDate,
) -> Applicant {
    let ApplicantSubmission {
        full_name,
        nik,
        origin_school,
        father_name,
        mother_name,
        phone,
        documents,
    } = submission;

    Applicant {
        id: ApplicantId::default(),
        registration_number,
        full_name: full_name.trim().to_string(),
        nik: nik.trim().to_string(),
        origin_school: origin_school.trim().to_string(),
        submitted_on,
        father_name: father_name.trim().to_string(),
        mother_name: mother_name.trim().to_string(),
        phone: phone.trim().to_string(),
        documents,
        status: AdmissionStatus::Waiting,
        ai_status: AiVerificationStatus::NotChecked,
    }
}
