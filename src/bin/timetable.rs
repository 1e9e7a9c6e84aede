//! Timetable CLI - builds a weekly timetable from CSV sheets.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use u_timetable::config::TimetableConfig;
use u_timetable::loader::{load_input, InputPaths};
use u_timetable::{logging, Timetabler};

#[derive(Parser)]
#[command(name = "timetable")]
#[command(about = "Build a weekly academic timetable", long_about = None)]
struct Cli {
    /// Course sheet (Department, Semester, Course Code, L, T, P, S, Faculty, ...)
    #[arg(long)]
    courses: PathBuf,
    /// Room sheet (id, type, capacity)
    #[arg(long)]
    rooms: PathBuf,
    /// Cohort sheet (Department, Semester, Total_Students, MaxBatchSize)
    #[arg(long)]
    batches: PathBuf,
    /// Elective registrations (Batch, Basket, Course Code)
    #[arg(long)]
    electives: Option<PathBuf>,
    /// JSON configuration; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file for the JSON report; stdout when omitted
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TimetableConfig::from_json_file(path)?,
        None => TimetableConfig::default(),
    };
    let input = load_input(&InputPaths {
        courses: cli.courses,
        rooms: cli.rooms,
        batches: cli.batches,
        electives: cli.electives,
    })?;

    let timetable = Timetabler::new(config).run(&input)?;
    let document = timetable.document();

    match &cli.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            let mut out = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut out, &document)?;
            out.flush()?;
            info!(path = %path.display(), "report written");
        }
        None => {
            let mut out = io::stdout().lock();
            serde_json::to_writer_pretty(&mut out, &document)?;
            writeln!(out)?;
        }
    }

    for entry in &document.unscheduled {
        warn!(
            department = %entry.department,
            semester = %entry.semester,
            course = %entry.course_id,
            batch = %entry.batch_id,
            kind = %entry.kind,
            reason = %entry.message,
            "unscheduled"
        );
    }
    info!(
        sessions = document.kpi.total_sessions,
        committed = document.kpi.committed,
        unscheduled = document.kpi.unscheduled,
        placement_rate = document.kpi.placement_rate,
        "done"
    );
    Ok(())
}
