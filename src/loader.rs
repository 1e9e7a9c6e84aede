//! CSV input loader.
//!
//! Reads the four institution sheets into a [`TimetableInput`]:
//!
//! | File | Columns |
//! |------|---------|
//! | rooms | `id`, `type`, `capacity` |
//! | batches | `Department`, `Semester`, `Total_Students`, `MaxBatchSize` |
//! | courses | `Department`, `Semester`, `Course Code`, `Course Name`, `L`, `T`, `P`, `S`, `Faculty`, `Schedule` |
//! | electives (optional) | `Batch`, `Basket`, `Course Code` |
//!
//! Cohorts are split into sections, each course row is expanded per
//! section into one [`Course`] per session kind using [`WeeklyLoad`], and
//! course codes of the form `B<n>-<code>` mark electives of basket `B<n>`.
//! Fields are trimmed; extra columns are ignored.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::LoadError;
use crate::models::{Batch, Course, ElectiveRegistration, Room, RoomType, SessionKind, WeeklyLoad};
use crate::scheduler::TimetableInput;

/// Locations of the input sheets.
#[derive(Debug, Clone)]
pub struct InputPaths {
    pub courses: PathBuf,
    pub rooms: PathBuf,
    pub batches: PathBuf,
    pub electives: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RoomRow {
    id: String,
    #[serde(rename = "type")]
    room_type: String,
    capacity: u32,
}

#[derive(Debug, Deserialize)]
struct BatchRow {
    #[serde(rename = "Department")]
    department: String,
    #[serde(rename = "Semester")]
    semester: String,
    #[serde(rename = "Total_Students")]
    total: u32,
    #[serde(rename = "MaxBatchSize")]
    max_size: u32,
}

#[derive(Debug, Deserialize)]
struct CourseRow {
    #[serde(rename = "Department")]
    department: String,
    #[serde(rename = "Semester")]
    semester: String,
    #[serde(rename = "Course Code")]
    code: String,
    #[serde(rename = "Course Name", default)]
    name: Option<String>,
    #[serde(rename = "L", default)]
    l: Option<f64>,
    #[serde(rename = "T", default)]
    t: Option<f64>,
    #[serde(rename = "P", default)]
    p: Option<f64>,
    #[serde(rename = "S", default)]
    s: Option<f64>,
    #[serde(rename = "Faculty", default)]
    faculty: Option<String>,
    #[serde(rename = "Schedule", default)]
    schedule: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ElectiveRow {
    #[serde(rename = "Batch")]
    batch: String,
    #[serde(rename = "Basket")]
    basket: String,
    #[serde(rename = "Course Code")]
    code: String,
}

/// Loads every sheet and assembles the run input.
pub fn load_input(paths: &InputPaths) -> Result<TimetableInput, LoadError> {
    let rooms = read_rooms(open(&paths.rooms)?, &display(&paths.rooms))?;
    let batches = read_batches(open(&paths.batches)?, &display(&paths.batches))?;
    let courses = read_courses(open(&paths.courses)?, &display(&paths.courses), &batches)?;
    let registrations = match &paths.electives {
        Some(path) => read_registrations(open(path)?, &display(path))?,
        None => Vec::new(),
    };
    debug!(
        rooms = rooms.len(),
        batches = batches.len(),
        courses = courses.len(),
        registrations = registrations.len(),
        "input loaded"
    );
    Ok(TimetableInput::new(courses, rooms, batches).with_registrations(registrations))
}

/// Reads the room inventory. Libraries are not teaching rooms and are skipped.
pub fn read_rooms<R: Read>(reader: R, file: &str) -> Result<Vec<Room>, LoadError> {
    let rows: Vec<RoomRow> = read_rows(reader, file)?;
    Ok(rows
        .into_iter()
        .filter(|r| !r.room_type.trim().eq_ignore_ascii_case("LIBRARY"))
        .map(|r| {
            // FromStr for RoomType is infallible
            let room_type = r.room_type.parse().unwrap_or(RoomType::Custom(r.room_type));
            Room::new(r.id, room_type, r.capacity)
        })
        .collect())
}

/// Reads cohort sizes and splits each cohort into sections.
pub fn read_batches<R: Read>(reader: R, file: &str) -> Result<Vec<Batch>, LoadError> {
    let rows: Vec<BatchRow> = read_rows(reader, file)?;
    let mut batches = Vec::new();
    for (i, r) in rows.into_iter().enumerate() {
        if r.max_size == 0 {
            return Err(parse_error(file, i, "MaxBatchSize must be positive"));
        }
        batches.extend(Batch::split_sections(&r.department, &r.semester, r.total, r.max_size));
    }
    Ok(batches)
}

/// Reads course rows and expands them per section and session kind.
///
/// Rows with `Schedule = No` are skipped. Rows for a department and
/// semester without batches are skipped with a warning.
pub fn read_courses<R: Read>(reader: R, file: &str, batches: &[Batch]) -> Result<Vec<Course>, LoadError> {
    let mut sections: BTreeMap<(&str, &str), Vec<&Batch>> = BTreeMap::new();
    for b in batches {
        sections
            .entry((b.department.as_str(), b.semester.as_str()))
            .or_default()
            .push(b);
    }

    let rows: Vec<CourseRow> = read_rows(reader, file)?;
    let mut courses = Vec::new();
    for (i, r) in rows.into_iter().enumerate() {
        if r.schedule
            .as_deref()
            .is_some_and(|s| s.trim().eq_ignore_ascii_case("no"))
        {
            continue;
        }
        if r.code.is_empty() {
            return Err(parse_error(file, i, "missing course code"));
        }
        let faculty = r
            .faculty
            .as_deref()
            .map(first_faculty)
            .filter(|f| !f.is_empty())
            .ok_or_else(|| parse_error(file, i, format!("course {} has no faculty", r.code)))?;

        let Some(targets) = sections.get(&(r.department.as_str(), r.semester.as_str())) else {
            warn!(course = %r.code, department = %r.department, semester = %r.semester, "no batch for course, skipped");
            continue;
        };

        let load = WeeklyLoad::from_ltps(
            r.l.unwrap_or(0.0),
            hours(r.t),
            hours(r.p),
            hours(r.s),
        );
        let basket = basket_of(&r.code);
        let name = r.name.clone().unwrap_or_default();

        for batch in targets {
            for kind in [SessionKind::Lecture, SessionKind::Tutorial, SessionKind::Lab, SessionKind::SelfStudy] {
                let periods = load.periods(kind);
                if periods == 0 {
                    continue;
                }
                let room_type = if kind == SessionKind::Lab {
                    lab_room_type(&r.code)
                } else {
                    RoomType::LectureHall
                };
                let mut course = Course::new(&r.code, &r.department, &r.semester, &batch.id, faculty)
                    .with_name(&name)
                    .with_kind(kind)
                    .with_periods(periods)
                    .with_room_type(room_type);
                if let Some(b) = &basket {
                    course = course.with_basket(b);
                }
                courses.push(course);
            }
        }
    }
    Ok(courses)
}

/// Reads elective registrations.
pub fn read_registrations<R: Read>(reader: R, file: &str) -> Result<Vec<ElectiveRegistration>, LoadError> {
    let rows: Vec<ElectiveRow> = read_rows(reader, file)?;
    Ok(rows
        .into_iter()
        .map(|r| ElectiveRegistration::new(r.batch, r.basket, r.code))
        .collect())
}

/// Basket of an elective course code (`B2-CS451` → `B2`).
pub fn basket_of(code: &str) -> Option<String> {
    let (prefix, rest) = code.split_once('-')?;
    let digits = prefix.strip_prefix('B').or_else(|| prefix.strip_prefix('b'))?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) || rest.is_empty() {
        return None;
    }
    Some(prefix.to_ascii_uppercase())
}

/// First name of a shared assignment (`Dr. A / Dr. B` → `Dr. A`).
pub fn first_faculty(field: &str) -> &str {
    field.split('/').next().unwrap_or(field).trim()
}

/// Lab room type implied by a course code.
///
/// Electronics labs need hardware benches; everything else uses computers.
pub fn lab_room_type(code: &str) -> RoomType {
    let upper = code.to_ascii_uppercase();
    if upper.contains("EC") && !upper.contains("CS") && !upper.contains("DS") {
        RoomType::Custom("HARDWARE_LAB".into())
    } else {
        RoomType::Custom("COMPUTER_LAB".into())
    }
}

fn hours(value: Option<f64>) -> u32 {
    value.map_or(0, |v| v.max(0.0).round() as u32)
}

fn read_rows<T, R>(reader: R, file: &str) -> Result<Vec<T>, LoadError>
where
    T: for<'de> Deserialize<'de>,
    R: Read,
{
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
        .into_deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| LoadError::Csv {
            file: file.to_string(),
            source,
        })
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: display(path),
        source,
    })
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

/// Row `index` (0-based, header excluded) as a file line number.
fn parse_error(file: &str, index: usize, message: impl Into<String>) -> LoadError {
    LoadError::Parse {
        file: file.to_string(),
        line: index as u64 + 2,
        message: message.into(),
    }
}
