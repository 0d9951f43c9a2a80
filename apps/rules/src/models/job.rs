use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::ParseEnumError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Open,
    Closed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Open => "open",
            JobStatus::Closed => "closed",
        }
    }
}

impl FromStr for JobStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" | "active" => Ok(JobStatus::Open),
            "closed" => Ok(JobStatus::Closed),
            _ => Err(ParseEnumError::new("job status", s)),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job posting owned by a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub location: Option<String>,
    /// Free text, one requirement per line (optionally bulleted).
    pub requirements: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    /// `None` means the posting never auto-closes.
    pub vacancies: Option<u32>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub location: Option<String>,
    pub requirements: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub vacancies: Option<i32>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = ParseEnumError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(Job {
            id: row.id,
            company_id: row.company_id,
            title: row.title,
            location: row.location,
            requirements: row.requirements,
            salary_min: row.salary_min,
            salary_max: row.salary_max,
            // Non-positive vacancy counts are treated as "not set".
            vacancies: row
                .vacancies
                .and_then(|v| u32::try_from(v).ok())
                .filter(|v| *v > 0),
            status: row.status.parse()?,
            created_at: row.created_at,
        })
    }
}
