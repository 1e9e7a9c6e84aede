//! Catalog input records.
//!
//! A [`Course`] row describes one teaching component (e.g. the lectures of
//! CS301 for batch CSE3) with its weekly period count. The session catalog
//! expands it into that many independent sessions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::RoomType;

/// Kind of teaching session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SessionKind {
    Lecture,
    Lab,
    Tutorial,
    SelfStudy,
}

impl SessionKind {
    /// All kinds, in catalog rank order.
    pub const ALL: [SessionKind; 4] = [
        SessionKind::Lab,
        SessionKind::Lecture,
        SessionKind::Tutorial,
        SessionKind::SelfStudy,
    ];

    /// Ordering rank used by the session catalog (lower goes first).
    pub fn rank(self) -> u8 {
        match self {
            SessionKind::Lab => 0,
            SessionKind::Lecture => 1,
            SessionKind::Tutorial => 2,
            SessionKind::SelfStudy => 3,
        }
    }

    /// Short code used in grid labels and summaries.
    pub fn code(self) -> &'static str {
        match self {
            SessionKind::Lecture => "LEC",
            SessionKind::Lab => "LAB",
            SessionKind::Tutorial => "TUT",
            SessionKind::SelfStudy => "SS",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SessionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LEC" | "LECTURE" | "L" => Ok(SessionKind::Lecture),
            "LAB" | "PRACTICAL" | "P" => Ok(SessionKind::Lab),
            "TUT" | "TUTORIAL" | "T" => Ok(SessionKind::Tutorial),
            "SS" | "SELF_STUDY" | "SELF-STUDY" | "SELFSTUDY" | "S" => Ok(SessionKind::SelfStudy),
            other => Err(format!("unknown session kind '{other}'")),
        }
    }
}

/// One teaching component of a course for one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Course code (e.g. `CS301`).
    pub id: String,
    /// Human-readable title.
    pub name: String,
    /// Owning department.
    pub department: String,
    /// Semester label.
    pub semester: String,
    /// Batch that attends.
    pub batch_id: String,
    /// Session kind of this component.
    pub kind: SessionKind,
    /// Sessions per week.
    pub weekly_periods: u32,
    /// Room type every session needs.
    pub room_type: RoomType,
    /// Teaching faculty.
    pub faculty_id: String,
    /// Elective basket, if any.
    pub basket_id: Option<String>,
    /// Slot length override. `None` uses the configured duration for `kind`.
    pub duration: Option<u16>,
}

impl Course {
    /// Creates a course component with one weekly lecture in a lecture hall.
    pub fn new(
        id: impl Into<String>,
        department: impl Into<String>,
        semester: impl Into<String>,
        batch_id: impl Into<String>,
        faculty_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            department: department.into(),
            semester: semester.into(),
            batch_id: batch_id.into(),
            kind: SessionKind::Lecture,
            weekly_periods: 1,
            room_type: RoomType::LectureHall,
            faculty_id: faculty_id.into(),
            basket_id: None,
            duration: None,
        }
    }

    /// Sets the title.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the session kind.
    pub fn with_kind(mut self, kind: SessionKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets weekly period count.
    pub fn with_periods(mut self, periods: u32) -> Self {
        self.weekly_periods = periods;
        self
    }

    /// Sets the required room type.
    pub fn with_room_type(mut self, room_type: RoomType) -> Self {
        self.room_type = room_type;
        self
    }

    /// Places the course in an elective basket.
    pub fn with_basket(mut self, basket_id: impl Into<String>) -> Self {
        self.basket_id = Some(basket_id.into());
        self
    }

    /// Overrides the session length in slots.
    pub fn with_duration(mut self, slots: u16) -> Self {
        self.duration = Some(slots);
        self
    }

    /// Whether the course is an elective.
    pub fn is_elective(&self) -> bool {
        self.basket_id.is_some()
    }
}

/// A batch's choice of one elective course within a basket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectiveRegistration {
    /// Registering batch.
    pub batch_id: String,
    /// Basket the choice belongs to.
    pub basket_id: String,
    /// Chosen course code.
    pub course_id: String,
}

impl ElectiveRegistration {
    /// Creates a registration.
    pub fn new(
        batch_id: impl Into<String>,
        basket_id: impl Into<String>,
        course_id: impl Into<String>,
    ) -> Self {
        Self {
            batch_id: batch_id.into(),
            basket_id: basket_id.into(),
            course_id: course_id.into(),
        }
    }
}

/// Weekly session counts derived from an L-T-P-S credit line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyLoad {
    pub lectures: u32,
    pub tutorials: u32,
    pub labs: u32,
    pub self_study: u32,
}

impl WeeklyLoad {
    /// Derives session counts from lecture credits and T/P/S hours.
    ///
    /// - lectures: `max(1, round(2L/3))` when `L > 0`
    /// - tutorials: `T`
    /// - labs: `P / 2` (a lab session covers two practical hours)
    /// - self-study: `S / 4`, only alongside some L, T or P
    ///
    /// A self-study-only course produces no sessions.
    pub fn from_ltps(lecture_credits: f64, tutorial_hours: u32, lab_hours: u32, self_study_hours: u32) -> Self {
        let has_contact = lecture_credits > 0.0 || tutorial_hours > 0 || lab_hours > 0;
        if !has_contact {
            return Self::default();
        }

        let lectures = if lecture_credits > 0.0 {
            ((lecture_credits * 2.0 / 3.0).round() as u32).max(1)
        } else {
            0
        };

        Self {
            lectures,
            tutorials: tutorial_hours,
            labs: lab_hours / 2,
            self_study: self_study_hours / 4,
        }
    }

    /// Session count for one kind.
    pub fn periods(&self, kind: SessionKind) -> u32 {
        match kind {
            SessionKind::Lecture => self.lectures,
            SessionKind::Lab => self.labs,
            SessionKind::Tutorial => self.tutorials,
            SessionKind::SelfStudy => self.self_study,
        }
    }

    /// Total sessions per week.
    pub fn total(&self) -> u32 {
        self.lectures + self.tutorials + self.labs + self.self_study
    }
}
