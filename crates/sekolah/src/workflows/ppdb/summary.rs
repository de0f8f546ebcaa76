use serde::Serialize;

use super::domain::{AdmissionStatus, AiVerificationStatus, Applicant};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: AdmissionStatus,
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AiStatusCount {
    pub status: AiVerificationStatus,
    pub label: &'static str,
    pub count: usize,
}

/// Applicant counts per admission status and per AI verification outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub total: usize,
    pub by_status: Vec<StatusCount>,
    pub by_ai_status: Vec<AiStatusCount>,
}

impl StatusSummary {
    pub fn from_roster(roster: &[Applicant]) -> Self {
        let by_status = AdmissionStatus::ordered()
            .into_iter()
            .map(|status| StatusCount {
                status,
                label: status.label(),
                count: roster
                    .iter()
                    .filter(|applicant| applicant.status == status)
                    .count(),
            })
            .collect();

        let by_ai_status = AiVerificationStatus::ordered()
            .into_iter()
            .map(|status| AiStatusCount {
                status,
                label: status.label(),
                count: roster
                    .iter()
                    .filter(|applicant| applicant.ai_status == status)
                    .count(),
            })
            .collect();

        Self {
            total: roster.len(),
            by_status,
            by_ai_status,
        }
    }

    pub fn count(&self, status: AdmissionStatus) -> usize {
        self.by_status
            .iter()
            .find(|entry| entry.status == status)
            .map_or(0, |entry| entry.count)
    }

    /// Prompt asking the assistant for a one-paragraph narrative over these counts.
    pub fn narrative_prompt(&self) -> String {
        let statuses = self
            .by_status
            .iter()
            .map(|entry| format!("{}: {}", entry.label, entry.count))
            .collect::<Vec<_>>()
            .join(", ");
        let ai = self
            .by_ai_status
            .iter()
            .map(|entry| format!("{}: {}", entry.label, entry.count))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "Ringkas data pendaftar PPDB berikut dalam satu paragraf untuk kepala sekolah. \
             Total pendaftar: {}. Status: {}. Verifikasi dokumen: {}.",
            self.total, statuses, ai
        )
    }
}
