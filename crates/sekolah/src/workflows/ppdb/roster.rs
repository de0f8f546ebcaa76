//! Search, filter, sort, and selection over the applicant roster.
//!
//! Everything here is a pure function of its inputs so it can be re-run on every change of
//! the query parameters.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{AdmissionStatus, Applicant, ApplicantId};

/// Status filter applied before the search term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StatusFilter {
    #[default]
    All,
    Only(AdmissionStatus),
}

impl StatusFilter {
    pub fn matches(self, status: AdmissionStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(expected) => expected == status,
        }
    }
}

impl TryFrom<String> for StatusFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().eq_ignore_ascii_case("all") || value.trim().is_empty() {
            return Ok(StatusFilter::All);
        }
        AdmissionStatus::parse(&value)
            .map(StatusFilter::Only)
            .ok_or_else(|| format!("unknown status filter '{value}'"))
    }
}

impl From<StatusFilter> for String {
    fn from(value: StatusFilter) -> Self {
        match value {
            StatusFilter::All => "all".to_string(),
            StatusFilter::Only(status) => status.key().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    None,
    RegistrationNumber,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDirective {
    #[serde(default)]
    pub field: SortField,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortDirective {
    pub const fn by_registration_number(direction: SortDirection) -> Self {
        Self {
            field: SortField::RegistrationNumber,
            direction,
        }
    }
}

/// The three independent query parameters of the roster view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub sort: SortDirective,
}

impl RosterQuery {
    pub fn view<'a>(&self, roster: &'a [Applicant]) -> Vec<&'a Applicant> {
        view(roster, &self.search, self.status, self.sort)
    }
}

/// Applicants matching `status_filter` and `search`, ordered by `sort`.
///
/// The search is a case-insensitive substring match over name, registration number, and NIK.
/// Sorting by registration number is stable; malformed numbers sort after every well-formed
/// one in both directions and keep their relative input order.
pub fn view<'a>(
    roster: &'a [Applicant],
    search: &str,
    status_filter: StatusFilter,
    sort: SortDirective,
) -> Vec<&'a Applicant> {
    let needle = search.trim().to_lowercase();
    let mut visible: Vec<&Applicant> = roster
        .iter()
        .filter(|applicant| status_filter.matches(applicant.status))
        .filter(|applicant| needle.is_empty() || matches_search(applicant, &needle))
        .collect();

    if sort.field == SortField::RegistrationNumber {
        visible.sort_by(|left, right| {
            compare_sequences(
                left.registration_sequence(),
                right.registration_sequence(),
                sort.direction,
            )
        });
    }

    visible
}

fn matches_search(applicant: &Applicant, needle: &str) -> bool {
    [
        applicant.full_name.as_str(),
        applicant.registration_number.as_str(),
        applicant.nik.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

fn compare_sequences(
    left: Option<u32>,
    right: Option<u32>,
    direction: SortDirection,
) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => match direction {
            SortDirection::Ascending => left.cmp(&right),
            SortDirection::Descending => right.cmp(&left),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Ephemeral set of selected applicant ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(BTreeSet<ApplicantId>);

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &ApplicantId) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ApplicantId> {
        self.0.iter()
    }

    pub fn remove(&mut self, id: &ApplicantId) -> bool {
        self.0.remove(id)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<ApplicantId> for Selection {
    fn from_iter<T: IntoIterator<Item = ApplicantId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} selected", self.0.len())
    }
}

/// Adds `id` when absent, removes it when present.
pub fn toggle_selection(selection: &Selection, id: &ApplicantId) -> Selection {
    let mut next = selection.clone();
    if !next.0.remove(id) {
        next.0.insert(id.clone());
    }
    next
}

pub fn select_all_visible(visible: &[&Applicant]) -> Selection {
    visible.iter().map(|applicant| applicant.id.clone()).collect()
}

pub fn clear_selection() -> Selection {
    Selection::new()
}

/// True when something is visible and every visible applicant is selected.
pub fn is_all_selected(visible: &[&Applicant], selection: &Selection) -> bool {
    !visible.is_empty()
        && visible
            .iter()
            .all(|applicant| selection.contains(&applicant.id))
}

/// True when the selection is non-empty and a proper subset of the visible ids.
pub fn is_partially_selected(visible: &[&Applicant], selection: &Selection) -> bool {
    if selection.is_empty() {
        return false;
    }
    let visible_ids: BTreeSet<&ApplicantId> =
        visible.iter().map(|applicant| &applicant.id).collect();
    selection.len() < visible_ids.len() && selection.iter().all(|id| visible_ids.contains(id))
}
