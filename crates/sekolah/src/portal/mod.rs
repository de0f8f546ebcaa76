//! Read-only parent portal: grades, attendance, announcements and tuition for one student.

pub mod router;

use std::sync::Arc;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::store::{Collection, DocumentStore, StoreError};

pub use router::portal_router;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicRecord {
    #[serde(default)]
    pub id: String,
    pub student_id: String,
    pub subject: String,
    pub term: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Sick,
    Permit,
    Absent,
}

impl AttendanceStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Present => "Hadir",
            Self::Sick => "Sakit",
            Self::Permit => "Izin",
            Self::Absent => "Alpa",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    #[serde(default)]
    pub id: String,
    pub student_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// School-wide notice, visible to every parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub body: String,
    pub published_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuitionPayment {
    #[serde(default)]
    pub id: String,
    pub student_id: String,
    /// Billing month, `YYYY-MM`.
    pub month: String,
    /// Amount in rupiah.
    pub amount: u64,
    pub paid: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttendanceSummary {
    pub total_days: usize,
    pub present: usize,
    pub sick: usize,
    pub permit: usize,
    pub absent: usize,
    /// Share of recorded days marked present, `0.0` when nothing is recorded.
    pub rate: f64,
}

impl AttendanceSummary {
    pub fn from_entries(entries: &[AttendanceEntry]) -> Self {
        let count = |status: AttendanceStatus| {
            entries
                .iter()
                .filter(|entry| entry.status == status)
                .count()
        };
        let total_days = entries.len();
        let present = count(AttendanceStatus::Present);
        let rate = if total_days == 0 {
            0.0
        } else {
            present as f64 / total_days as f64
        };

        Self {
            total_days,
            present,
            sick: count(AttendanceStatus::Sick),
            permit: count(AttendanceStatus::Permit),
            absent: count(AttendanceStatus::Absent),
            rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortalOverview {
    pub student_id: String,
    pub grades: Vec<AcademicRecord>,
    pub attendance: Vec<AttendanceEntry>,
    pub attendance_summary: AttendanceSummary,
    pub announcements: Vec<Announcement>,
    pub payments: Vec<TuitionPayment>,
    /// Sum of unpaid tuition, in rupiah.
    pub outstanding: u64,
}

/// Reads the per-student records behind the parent portal.
#[derive(Debug)]
pub struct ParentPortal<S> {
    store: Arc<S>,
}

impl<S> Clone for ParentPortal<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: DocumentStore> ParentPortal<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn grades(&self, student_id: &str) -> Result<Vec<AcademicRecord>, StoreError> {
        let mut grades: Vec<AcademicRecord> = self.load(Collection::Grades)?;
        grades.retain(|record| record.student_id == student_id);
        Ok(grades)
    }

    /// Attendance entries for the student, oldest first.
    pub fn attendance(&self, student_id: &str) -> Result<Vec<AttendanceEntry>, StoreError> {
        let mut entries: Vec<AttendanceEntry> = self.load(Collection::Attendance)?;
        entries.retain(|entry| entry.student_id == student_id);
        entries.sort_by_key(|entry| entry.date);
        Ok(entries)
    }

    /// Announcements, newest first.
    pub fn announcements(&self) -> Result<Vec<Announcement>, StoreError> {
        let mut announcements: Vec<Announcement> = self.load(Collection::Announcements)?;
        announcements.sort_by(|left, right| right.published_on.cmp(&left.published_on));
        Ok(announcements)
    }

    pub fn payments(&self, student_id: &str) -> Result<Vec<TuitionPayment>, StoreError> {
        let mut payments: Vec<TuitionPayment> = self.load(Collection::Payments)?;
        payments.retain(|payment| payment.student_id == student_id);
        Ok(payments)
    }

    pub fn overview(&self, student_id: &str) -> Result<PortalOverview, StoreError> {
        let attendance = self.attendance(student_id)?;
        let payments = self.payments(student_id)?;
        let outstanding = payments
            .iter()
            .filter(|payment| !payment.paid)
            .map(|payment| payment.amount)
            .sum();

        Ok(PortalOverview {
            student_id: student_id.to_string(),
            grades: self.grades(student_id)?,
            attendance_summary: AttendanceSummary::from_entries(&attendance),
            attendance,
            announcements: self.announcements()?,
            payments,
            outstanding,
        })
    }

    fn load<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>, StoreError> {
        self.store
            .list(collection)?
            .into_iter()
            .map(|document| {
                let mut data = document.data;
                if let serde_json::Value::Object(fields) = &mut data {
                    fields.insert("id".to_string(), serde_json::Value::String(document.id));
                }
                serde_json::from_value(data).map_err(StoreError::from)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDocumentStore;
    use serde_json::json;

    fn seeded_portal() -> ParentPortal<MemoryDocumentStore> {
        let store = Arc::new(MemoryDocumentStore::new());
        let rows = [
            (Collection::Grades, json!({ "student_id": "S-001", "subject": "Matematika", "term": "Ganjil 2024", "score": 88.5 })),
            (Collection::Grades, json!({ "student_id": "S-002", "subject": "Matematika", "term": "Ganjil 2024", "score": 70.0 })),
            (Collection::Attendance, json!({ "student_id": "S-001", "date": "2024-08-02", "status": "sick" })),
            (Collection::Attendance, json!({ "student_id": "S-001", "date": "2024-08-01", "status": "present" })),
            (Collection::Attendance, json!({ "student_id": "S-001", "date": "2024-08-05", "status": "present" })),
            (Collection::Attendance, json!({ "student_id": "S-001", "date": "2024-08-06", "status": "absent" })),
            (Collection::Announcements, json!({ "title": "Libur", "body": "Sekolah libur.", "published_on": "2024-08-10" })),
            (Collection::Announcements, json!({ "title": "Rapat", "body": "Rapat wali murid.", "published_on": "2024-08-20" })),
            (Collection::Payments, json!({ "student_id": "S-001", "month": "2024-07", "amount": 350000, "paid": true })),
            (Collection::Payments, json!({ "student_id": "S-001", "month": "2024-08", "amount": 350000, "paid": false })),
            (Collection::Payments, json!({ "student_id": "S-002", "month": "2024-08", "amount": 350000, "paid": false })),
        ];
        for (collection, data) in rows {
            store.add(collection, data).expect("seed");
        }
        ParentPortal::new(store)
    }

    #[test]
    fn overview_only_contains_the_students_records() {
        let overview = seeded_portal().overview("S-001").expect("overview");

        assert_eq!(overview.grades.len(), 1);
        assert_eq!(overview.grades[0].score, 88.5);
        assert_eq!(overview.payments.len(), 2);
        assert_eq!(overview.outstanding, 350_000);
        assert_eq!(overview.announcements[0].title, "Rapat");
        assert!(!overview.grades[0].id.is_empty());
    }

    #[test]
    fn attendance_is_sorted_and_summarised() {
        let overview = seeded_portal().overview("S-001").expect("overview");

        let dates: Vec<String> = overview
            .attendance
            .iter()
            .map(|entry| entry.date.to_string())
            .collect();
        assert_eq!(dates, vec!["2024-08-01", "2024-08-02", "2024-08-05", "2024-08-06"]);

        let summary = overview.attendance_summary;
        assert_eq!(summary.total_days, 4);
        assert_eq!(summary.present, 2);
        assert_eq!(summary.sick, 1);
        assert_eq!(summary.absent, 1);
        assert!((summary.rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_attendance_has_zero_rate() {
        let summary = AttendanceSummary::from_entries(&[]);
        assert_eq!(summary.total_days, 0);
        assert_eq!(summary.rate, 0.0);
    }
}
