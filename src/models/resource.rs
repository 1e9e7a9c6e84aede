//! Room and batch models.
//!
//! Rooms are typed and sized; batches (a department/semester/section
//! cohort) have a headcount that every assigned room must seat. Faculty
//! carry no attributes of their own: availability is whatever the
//! [`ResourceCalendar`](crate::calendar::ResourceCalendar) says.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Faculty identifier.
pub type FacultyId = String;

/// A teaching room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Room classification.
    pub room_type: RoomType,
    /// Seats.
    pub capacity: u32,
}

/// Room classification.
///
/// Matching is exact: a session needing a [`RoomType::Lab`] never lands in a
/// lecture hall and vice versa.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoomType {
    /// Lecture room or large seater hall.
    LectureHall,
    /// General teaching lab.
    Lab,
    /// Institution-specific type (e.g. `COMPUTER_LAB`, `HARDWARE_LAB`).
    Custom(String),
}

impl FromStr for RoomType {
    type Err = std::convert::Infallible;

    /// Parses loose spellings used in room sheets.
    ///
    /// `LECTURE_ROOM`, `LECTURE`, `SEATER` and `lecture hall` map to
    /// [`RoomType::LectureHall`]; `LAB` maps to [`RoomType::Lab`]; anything
    /// else is kept upper-cased as [`RoomType::Custom`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        Ok(match norm.as_str() {
            "LECTURE_ROOM" | "LECTURE" | "LECTURE_HALL" | "LECTUREHALL" | "CLASSROOM" => {
                RoomType::LectureHall
            }
            s if s.contains("SEATER") => RoomType::LectureHall,
            "LAB" => RoomType::Lab,
            _ => RoomType::Custom(norm),
        })
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomType::LectureHall => f.write_str("LECTURE_HALL"),
            RoomType::Lab => f.write_str("LAB"),
            RoomType::Custom(name) => f.write_str(name),
        }
    }
}

impl Room {
    /// Creates a room.
    pub fn new(id: impl Into<String>, room_type: RoomType, capacity: u32) -> Self {
        Self {
            id: id.into(),
            room_type,
            capacity,
        }
    }

    /// Creates a lecture hall.
    pub fn lecture_hall(id: impl Into<String>, capacity: u32) -> Self {
        Self::new(id, RoomType::LectureHall, capacity)
    }

    /// Creates a lab.
    pub fn lab(id: impl Into<String>, capacity: u32) -> Self {
        Self::new(id, RoomType::Lab, capacity)
    }

    /// Whether the room has the given type and seats `headcount`.
    pub fn suits(&self, room_type: &RoomType, headcount: u32) -> bool {
        &self.room_type == room_type && self.capacity >= headcount
    }
}

/// A cohort of students taught together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// Unique batch identifier (e.g. `CSE3_A`).
    pub id: String,
    /// Owning department.
    pub department: String,
    /// Semester label.
    pub semester: String,
    /// Section label when the cohort is split.
    pub section: Option<String>,
    /// Number of students.
    pub headcount: u32,
}

impl Batch {
    /// Creates a batch without a section label.
    pub fn new(
        id: impl Into<String>,
        department: impl Into<String>,
        semester: impl Into<String>,
        headcount: u32,
    ) -> Self {
        Self {
            id: id.into(),
            department: department.into(),
            semester: semester.into(),
            section: None,
            headcount,
        }
    }

    /// Sets the section label.
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Splits a cohort into equally sized sections.
    ///
    /// Section count is `ceil(total / max_size)`; each section seats
    /// `ceil(total / sections)`. A single section keeps the plain
    /// `DEPTSEM` id, several get `DEPTSEM_A`, `DEPTSEM_B`, ...
    pub fn split_sections(department: &str, semester: &str, total: u32, max_size: u32) -> Vec<Batch> {
        if total == 0 {
            return Vec::new();
        }
        let max_size = max_size.max(1);
        let sections = total.div_ceil(max_size);
        let size = total.div_ceil(sections);
        let base = format!("{department}{semester}");

        if sections == 1 {
            return vec![Batch::new(base, department, semester, size)];
        }
        (0..sections)
            .map(|i| {
                let label = section_label(i);
                Batch::new(format!("{base}_{label}"), department, semester, size).with_section(label)
            })
            .collect()
    }
}

/// `0 → A`, `25 → Z`, `26 → AA`.
fn section_label(mut index: u32) -> String {
    let mut label = Vec::new();
    loop {
        label.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    label.reverse();
    String::from_utf8_lossy(&label).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_suits() {
        let r = Room::lecture_hall("R1", 60);
        assert!(r.suits(&RoomType::LectureHall, 60));
        assert!(!r.suits(&RoomType::LectureHall, 61));
        assert!(!r.suits(&RoomType::Lab, 10));
    }

    #[test]
    fn test_room_type_parse() {
        assert_eq!("LECTURE_ROOM".parse::<RoomType>().unwrap(), RoomType::LectureHall);
        assert_eq!("120 Seater".parse::<RoomType>().unwrap(), RoomType::LectureHall);
        assert_eq!("lab".parse::<RoomType>().unwrap(), RoomType::Lab);
        assert_eq!(
            "computer lab".parse::<RoomType>().unwrap(),
            RoomType::Custom("COMPUTER_LAB".into())
        );
    }

    #[test]
    fn test_split_single_section() {
        let b = Batch::split_sections("CSE", "3", 70, 80);
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].id, "CSE3");
        assert_eq!(b[0].headcount, 70);
        assert_eq!(b[0].section, None);
    }

    #[test]
    fn test_split_multiple_sections() {
        let b = Batch::split_sections("ECE", "5", 130, 60);
        // ceil(130/60) = 3 sections of ceil(130/3) = 44
        assert_eq!(b.len(), 3);
        assert_eq!(b[0].id, "ECE5_A");
        assert_eq!(b[2].id, "ECE5_C");
        assert!(b.iter().all(|s| s.headcount == 44));
        assert_eq!(b[1].section.as_deref(), Some("B"));
    }

    #[test]
    fn test_split_empty() {
        assert!(Batch::split_sections("X", "1", 0, 60).is_empty());
    }

    #[test]
    fn test_section_labels() {
        assert_eq!(section_label(0), "A");
        assert_eq!(section_label(25), "Z");
        assert_eq!(section_label(26), "AA");
    }
}
