use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::ParseEnumError;

/// A course as far as progress tracking cares: its title and its explicit
/// lesson outline (titles, in order). The outline may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub lessons: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    #[default]
    Enrolled,
    InProgress,
    Completed,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Enrolled => "enrolled",
            EnrollmentStatus::InProgress => "in_progress",
            EnrollmentStatus::Completed => "completed",
        }
    }
}

impl FromStr for EnrollmentStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "enrolled" => Ok(EnrollmentStatus::Enrolled),
            "in_progress" => Ok(EnrollmentStatus::InProgress),
            "completed" => Ok(EnrollmentStatus::Completed),
            _ => Err(ParseEnumError::new("enrollment status", s)),
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A learner's registration in a course, with the last persisted progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub progress_percentage: u8,
    pub status: EnrollmentStatus,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Enrollment {
    pub fn new(user_id: Uuid, course_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            course_id,
            progress_percentage: 0,
            status: EnrollmentStatus::Enrolled,
            completed_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EnrollmentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub progress_percentage: i32,
    pub status: String,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<EnrollmentRow> for Enrollment {
    type Error = ParseEnumError;

    fn try_from(row: EnrollmentRow) -> Result<Self, Self::Error> {
        Ok(Enrollment {
            id: row.id,
            user_id: row.user_id,
            course_id: row.course_id,
            progress_percentage: row.progress_percentage.clamp(0, 100) as u8,
            status: row.status.parse()?,
            completed_at: row.completed_at,
        })
    }
}

/// Evidence that one lesson of one enrollment was finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CompletionRecord {
    pub enrollment_id: Uuid,
    pub lesson_id: String,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CompletionRecord {
    pub fn completed(enrollment_id: Uuid, lesson_id: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            enrollment_id,
            lesson_id: lesson_id.into(),
            is_completed: true,
            completed_at: Some(at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrollment_row_clamps_percentage() {
        let row = EnrollmentRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            progress_percentage: 140,
            status: "in_progress".to_string(),
            completed_at: None,
        };
        let enrollment = Enrollment::try_from(row).unwrap();
        assert_eq!(enrollment.progress_percentage, 100);
        assert_eq!(enrollment.status, EnrollmentStatus::InProgress);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&EnrollmentStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
