use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Length of the `PPDB<yy>` prefix in front of the numeric sequence of a registration number.
pub const REGISTRATION_PREFIX_LEN: usize = 6;

/// Number of digits in a national identity number (NIK).
pub const NIK_LENGTH: usize = 16;

/// Store-assigned identifier of an applicant document.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicantId(pub String);

impl ApplicantId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Admission status, changed by administrators only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionStatus {
    #[default]
    Waiting,
    Verified,
    Accepted,
    Rejected,
}

impl AdmissionStatus {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Waiting,
            Self::Verified,
            Self::Accepted,
            Self::Rejected,
        ]
    }

    /// Label shown to staff and written to exports.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Waiting => "Menunggu",
            Self::Verified => "Terverifikasi",
            Self::Accepted => "Diterima",
            Self::Rejected => "Ditolak",
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Verified => "verified",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|status| status.key().eq_ignore_ascii_case(raw.trim()))
    }
}

/// Outcome of the automated document-consistency check. Independent of [`AdmissionStatus`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiVerificationStatus {
    #[default]
    NotChecked,
    Verified,
    ManualReview,
}

impl AiVerificationStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::NotChecked, Self::Verified, Self::ManualReview]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NotChecked => "Belum Dicek",
            Self::Verified => "Terverifikasi AI",
            Self::ManualReview => "Perlu Cek Manual",
        }
    }
}

/// References to the uploaded supporting documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantDocuments {
    pub family_card: String,
    pub birth_certificate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diploma: Option<String>,
}

/// One admission registration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    #[serde(default)]
    pub id: ApplicantId,
    pub registration_number: String,
    pub full_name: String,
    pub nik: String,
    pub origin_school: String,
    pub submitted_on: NaiveDate,
    pub father_name: String,
    pub mother_name: String,
    pub phone: String,
    pub documents: ApplicantDocuments,
    #[serde(default)]
    pub status: AdmissionStatus,
    #[serde(default)]
    pub ai_status: AiVerificationStatus,
}

impl Applicant {
    /// Numeric sequence after the `PPDB<yy>` prefix, or `None` when the number is malformed.
    pub fn registration_sequence(&self) -> Option<u32> {
        registration_sequence(&self.registration_number)
    }
}

pub fn registration_sequence(registration_number: &str) -> Option<u32> {
    let suffix = registration_number.get(REGISTRATION_PREFIX_LEN..)?;
    if suffix.is_empty() || !suffix.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

/// Public admission form payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantSubmission {
    pub full_name: String,
    pub nik: String,
    pub origin_school: String,
    pub father_name: String,
    pub mother_name: String,
    pub phone: String,
    pub documents: ApplicantDocuments,
}
