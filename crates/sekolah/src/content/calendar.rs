use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::models::SchoolEvent;

/// A holiday observed on the same calendar date every year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NationalHoliday {
    pub month: u32,
    pub day: u32,
    pub name: &'static str,
}

pub const NATIONAL_HOLIDAYS: [NationalHoliday; 6] = [
    NationalHoliday {
        month: 1,
        day: 1,
        name: "Tahun Baru Masehi",
    },
    NationalHoliday {
        month: 5,
        day: 1,
        name: "Hari Buruh Internasional",
    },
    NationalHoliday {
        month: 5,
        day: 2,
        name: "Hari Pendidikan Nasional",
    },
    NationalHoliday {
        month: 6,
        day: 1,
        name: "Hari Lahir Pancasila",
    },
    NationalHoliday {
        month: 8,
        day: 17,
        name: "Hari Kemerdekaan Republik Indonesia",
    },
    NationalHoliday {
        month: 12,
        day: 25,
        name: "Hari Raya Natal",
    },
];

const MONTH_NAMES: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarEntryKind {
    SchoolEvent,
    NationalHoliday,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEntry {
    pub date: NaiveDate,
    pub title: String,
    pub kind: CalendarEntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarMonth {
    pub month: u32,
    pub name: &'static str,
    pub entries: Vec<CalendarEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearCalendar {
    pub year: i32,
    pub months: Vec<CalendarMonth>,
}

/// Merges stored school events with recurring holidays into twelve months.
///
/// Events dated outside `year` are dropped. Entries inside a month are ordered by date, then
/// title.
pub fn build_year_calendar(
    year: i32,
    events: &[SchoolEvent],
    holidays: &[NationalHoliday],
) -> YearCalendar {
    let mut months: Vec<CalendarMonth> = MONTH_NAMES
        .iter()
        .zip(1u32..)
        .map(|(name, month)| CalendarMonth {
            month,
            name: *name,
            entries: Vec::new(),
        })
        .collect();

    let school = events
        .iter()
        .filter(|event| event.date.year() == year)
        .map(|event| CalendarEntry {
            date: event.date,
            title: event.title.clone(),
            kind: CalendarEntryKind::SchoolEvent,
            event_id: Some(event.id.clone()),
            location: event.location.clone(),
        });

    let observed = holidays.iter().filter_map(|holiday| {
        NaiveDate::from_ymd_opt(year, holiday.month, holiday.day).map(|date| CalendarEntry {
            date,
            title: holiday.name.to_string(),
            kind: CalendarEntryKind::NationalHoliday,
            event_id: None,
            location: String::new(),
        })
    });

    for entry in school.chain(observed) {
        let index = entry.date.month0() as usize;
        months[index].entries.push(entry);
    }

    for month in &mut months {
        month.entries.sort_by(|left, right| {
            left.date
                .cmp(&right.date)
                .then_with(|| left.title.cmp(&right.title))
        });
    }

    YearCalendar { year, months }
}
