use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{CompletionRecord, Course, Enrollment, EnrollmentStatus};
use crate::progress::catalog;

/// Progress derived for one enrollment, ready to be written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentProgress {
    pub progress_percentage: u8,
    pub status: EnrollmentStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_lessons: usize,
    pub total_lessons: usize,
}

impl EnrollmentProgress {
    /// True when this result moves the enrollment into `Completed` for the
    /// first time.
    pub fn newly_completed(&self, previous: &Enrollment) -> bool {
        self.completed_at.is_some() && previous.completed_at.is_none()
    }
}

/// Recomputes an enrollment's progress from its completion records.
///
/// `now` is only used to stamp `completed_at` the first time the course
/// reaches 100%. A timestamp already on the enrollment is never replaced or
/// cleared, even if later records are removed.
///
/// Panics if any record belongs to another enrollment.
pub fn recompute(
    enrollment: &Enrollment,
    course: &Course,
    records: &[CompletionRecord],
    now: DateTime<Utc>,
) -> EnrollmentProgress {
    assert!(
        records.iter().all(|r| r.enrollment_id == enrollment.id),
        "completion records passed for enrollment {} belong to another enrollment",
        enrollment.id
    );
    assert_eq!(
        enrollment.course_id, course.id,
        "enrollment {} is not for course {}",
        enrollment.id, course.id
    );

    let (source, catalog) = catalog::resolve(&course.title, &course.lessons);
    let total_lessons = catalog.len();

    if catalog.is_empty() {
        debug!(
            enrollment_id = %enrollment.id,
            course = %course.title,
            "No lesson catalog; progress stays at zero"
        );
        return EnrollmentProgress {
            progress_percentage: 0,
            status: enrollment.status,
            completed_at: enrollment.completed_at,
            completed_lessons: 0,
            total_lessons: 0,
        };
    }

    let completed_lessons = records
        .iter()
        .filter(|r| r.is_completed && catalog.contains(&r.lesson_id))
        .map(|r| r.lesson_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    let progress_percentage = percentage(completed_lessons, total_lessons);

    let status = match progress_percentage {
        100 => EnrollmentStatus::Completed,
        0 => EnrollmentStatus::Enrolled,
        _ => EnrollmentStatus::InProgress,
    };

    let completed_at = match enrollment.completed_at {
        Some(at) => Some(at),
        None if status == EnrollmentStatus::Completed => Some(now),
        None => None,
    };

    debug!(
        enrollment_id = %enrollment.id,
        ?source,
        completed_lessons,
        total_lessons,
        progress_percentage,
        "Recomputed enrollment progress"
    );

    EnrollmentProgress {
        progress_percentage,
        status,
        completed_at,
        completed_lessons,
        total_lessons,
    }
}

/// Rounded share of `completed` over `total`, clamped to 0..=100.
fn percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (completed as f64 / total as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}
