use crate::infra::load_roster;
use chrono::{Local, NaiveDate};
use clap::Args;
use sekolah::error::AppError;
use sekolah::store::MemoryDocumentStore;
use sekolah::workflows::ppdb::{
    bulk_export_csv, select_all_visible, AdmissionStatus, Applicant, ApplicantDocuments,
    ApplicantSubmission, PpdbAdminService, RosterQuery, Selection, SimulatedVerifier,
    SortDirection, SortDirective, StatusFilter, StatusSummary,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// JSON array of applicants, as served by the roster endpoint
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Destination CSV file (defaults to stdout)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Only export applicants with this status (waiting, verified, accepted, rejected)
    #[arg(long, value_parser = parse_status)]
    pub(crate) status: Option<AdmissionStatus>,
    /// Case-insensitive search over name, registration number and NIK
    #[arg(long, default_value = "")]
    pub(crate) search: String,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Submission date for the seeded applicants (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Seed for the simulated document check, for repeatable output.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Print the exported CSV at the end of the demo.
    #[arg(long)]
    pub(crate) show_csv: bool,
}

fn parse_status(raw: &str) -> Result<AdmissionStatus, String> {
    AdmissionStatus::parse(raw).ok_or_else(|| {
        format!("unknown status '{raw}' (expected waiting, verified, accepted or rejected)")
    })
}

/// Filters a roster file the way the dashboard does and exports every visible row.
pub(crate) fn run_ppdb_export(args: ExportArgs) -> Result<(), AppError> {
    let ExportArgs {
        input,
        output,
        status,
        search,
    } = args;

    let roster = load_roster(&input)?;
    let query = RosterQuery {
        search,
        status: status.map_or(StatusFilter::All, StatusFilter::Only),
        sort: SortDirective::default(),
    };
    let visible = query.view(&roster);
    let selection = select_all_visible(&visible);
    let csv = bulk_export_csv(&roster, &selection)?;

    match output {
        Some(path) => {
            std::fs::write(&path, &csv)?;
            println!(
                "Exported {} of {} applicants to {}",
                selection.len(),
                roster.len(),
                path.display()
            );
        }
        None => print!("{}", String::from_utf8_lossy(&csv)),
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        seed,
        show_csv,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let verifier = match seed {
        Some(seed) => SimulatedVerifier::seeded(seed),
        None => SimulatedVerifier::new(),
    };
    let store = Arc::new(MemoryDocumentStore::new());
    let service = PpdbAdminService::new(store, Arc::new(verifier));

    println!("PPDB back office demo ({today})");
    for (full_name, nik, phone) in DEMO_APPLICANTS {
        let applicant = service.submit(demo_submission(full_name, nik, phone), today)?;
        println!(
            "- received {} for {}",
            applicant.registration_number, applicant.full_name
        );
    }

    let roster = service.roster()?;
    for applicant in &roster {
        let outcome = service.verify(&applicant.id)?;
        println!("  document check {}: {}", applicant.registration_number, outcome.label());
    }

    let waiting = RosterQuery {
        search: String::new(),
        status: StatusFilter::Only(AdmissionStatus::Waiting),
        sort: SortDirective::by_registration_number(SortDirection::Ascending),
    };
    let visible = service.view(&waiting)?;
    let visible_refs: Vec<&Applicant> = visible.iter().collect();
    let mut selection = select_all_visible(&visible_refs);
    let mut shortlist: Selection = visible_refs
        .iter()
        .take(2)
        .map(|applicant| applicant.id.clone())
        .collect();
    println!("\nWaiting applicants: {selection}, shortlist: {shortlist}");

    let outcome = service.bulk_set_status(&mut shortlist, AdmissionStatus::Verified)?;
    println!(
        "Marked {} applicants as {} ({} documents written)",
        outcome.affected,
        AdmissionStatus::Verified.label(),
        outcome.written
    );

    let export = service.export_csv(&selection)?;
    let outcome = service.bulk_set_ai_verified(&mut selection)?;
    println!(
        "Confirmed AI verification for {} applicants; selection now holds {}",
        outcome.affected,
        selection.len()
    );

    render_summary(&service.summary()?);

    if show_csv {
        println!("\nExport of the waiting shortlist:");
        print!("{}", String::from_utf8_lossy(&export));
    }

    Ok(())
}

const DEMO_APPLICANTS: [(&str, &str, &str); 5] = [
    ("Andi Saputra", "3201010101010001", "081234567890"),
    ("Bunga Lestari", "3201010101010002", "081234567891"),
    ("Citra Dewi", "3201010101010003", "081234567892"),
    ("Dimas Pratama", "3201010101010004", "081234567893"),
    ("Eka Putri", "3201010101010005", "081234567894"),
];

fn demo_submission(full_name: &str, nik: &str, phone: &str) -> ApplicantSubmission {
    let slug = full_name.to_lowercase().replace(' ', "-");
    ApplicantSubmission {
        full_name: full_name.to_string(),
        nik: nik.to_string(),
        origin_school: "SD Negeri 1 Bogor".to_string(),
        father_name: "Budi".to_string(),
        mother_name: "Siti".to_string(),
        phone: phone.to_string(),
        documents: ApplicantDocuments {
            family_card: format!("uploads/{slug}-kk.pdf"),
            birth_certificate: format!("uploads/{slug}-akta.pdf"),
            diploma: None,
        },
    }
}

fn render_summary(summary: &StatusSummary) {
    println!("\nRoster summary ({} applicants)", summary.total);
    for entry in &summary.by_status {
        println!("- {:<14} {}", entry.label, entry.count);
    }
    for entry in &summary.by_ai_status {
        println!("- {:<17} {}", entry.label, entry.count);
    }
}
