//! Input validation for timetabling problems.
//!
//! Checks structural integrity of courses, rooms, batches and elective
//! registrations before a run. Detects:
//! - Duplicate IDs
//! - Courses or registrations naming a batch that does not exist
//! - Registrations naming a course the batch does not take
//! - Batches with no students, rooms with no seats
//! - Courses whose basket disagrees with the batch's registration
//!
//! Room types that no room provides are reported separately by
//! [`missing_room_types`]: they do not make the input malformed, only some
//! sessions unschedulable.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::{Batch, Course, ElectiveRegistration, Room, RoomType};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A course or registration references a batch that doesn't exist.
    UnknownBatch,
    /// A registration references a course its batch doesn't take.
    UnknownCourse,
    /// A batch has a headcount of zero.
    ZeroHeadcount,
    /// A room seats nobody.
    ZeroCapacity,
    /// A course's basket disagrees with the batch's registration.
    BasketMismatch,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input data for a timetabling run.
///
/// Checks:
/// 1. No duplicate room IDs
/// 2. No duplicate batch IDs
/// 3. No duplicate (course, batch, kind) rows
/// 4. Every batch has students, every room has seats
/// 5. Every course names an existing batch
/// 6. Every registration names an existing batch and a course it takes
/// 7. A course's basket, when given, matches its registration
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    courses: &[Course],
    rooms: &[Room],
    batches: &[Batch],
    registrations: &[ElectiveRegistration],
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut room_ids = HashSet::new();
    for r in rooms {
        if !room_ids.insert(r.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate room ID: {}", r.id),
            ));
        }
        if r.capacity == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroCapacity,
                format!("Room '{}' has zero capacity", r.id),
            ));
        }
    }

    let mut batch_ids = HashSet::new();
    for b in batches {
        if !batch_ids.insert(b.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate batch ID: {}", b.id),
            ));
        }
        if b.headcount == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroHeadcount,
                format!("Batch '{}' has no students", b.id),
            ));
        }
    }

    // (batch, course) → basket named on the course rows
    let mut taken: HashMap<(&str, &str), Option<&str>> = HashMap::new();
    let mut rows = HashSet::new();
    for c in courses {
        if !rows.insert((c.id.as_str(), c.batch_id.as_str(), c.kind)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate course row: {} {} for batch {}", c.id, c.kind, c.batch_id),
            ));
        }
        if !batch_ids.contains(c.batch_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownBatch,
                format!("Course '{}' references unknown batch '{}'", c.id, c.batch_id),
            ));
        }
        let basket = taken.entry((c.batch_id.as_str(), c.id.as_str())).or_insert(None);
        if c.basket_id.is_some() {
            *basket = c.basket_id.as_deref();
        }
    }

    for reg in registrations {
        if !batch_ids.contains(reg.batch_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownBatch,
                format!(
                    "Registration for '{}' references unknown batch '{}'",
                    reg.course_id, reg.batch_id
                ),
            ));
            continue;
        }
        match taken.get(&(reg.batch_id.as_str(), reg.course_id.as_str())) {
            None => errors.push(ValidationError::new(
                ValidationErrorKind::UnknownCourse,
                format!(
                    "Batch '{}' registered for course '{}' it does not take",
                    reg.batch_id, reg.course_id
                ),
            )),
            Some(Some(basket)) if *basket != reg.basket_id => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::BasketMismatch,
                    format!(
                        "Course '{}' is in basket '{}' but batch '{}' registered it under '{}'",
                        reg.course_id, basket, reg.batch_id, reg.basket_id
                    ),
                ))
            }
            Some(_) => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Room types required by some course but provided by no room.
///
/// Maps each missing type to the number of sessions that need it.
/// Courses with no weekly periods are ignored.
pub fn missing_room_types(courses: &[Course], rooms: &[Room]) -> BTreeMap<RoomType, usize> {
    let available: HashSet<&RoomType> = rooms.iter().map(|r| &r.room_type).collect();
    let mut missing = BTreeMap::new();
    for c in courses {
        if c.weekly_periods > 0 && !available.contains(&c.room_type) {
            *missing.entry(c.room_type.clone()).or_insert(0) += c.weekly_periods as usize;
        }
    }
    missing
}
