use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Job, JobStatus};

/// A job as returned to clients. Every path that hands out a job (listings,
/// detail, after a status change) goes through `format_job`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobListing {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub location: Option<String>,
    pub requirements: Vec<String>,
    pub salary: String,
    pub status: JobStatus,
    pub is_open: bool,
    pub application_count: u32,
    pub remaining_vacancies: Option<u32>,
    pub created_at: DateTime<Utc>,
}

pub fn format_job(job: &Job, application_count: u32, accepted_count: u32) -> JobListing {
    let is_open = job.status == JobStatus::Open;
    JobListing {
        id: job.id,
        company_id: job.company_id,
        title: job.title.trim().to_string(),
        location: job.location.clone(),
        requirements: job
            .requirements
            .as_deref()
            .map(split_requirements)
            .unwrap_or_default(),
        salary: format_salary(job.salary_min, job.salary_max),
        status: job.status,
        is_open,
        application_count,
        remaining_vacancies: job
            .vacancies
            .map(|v| if is_open { v.saturating_sub(accepted_count) } else { 0 }),
        created_at: job.created_at,
    }
}

/// One requirement per non-empty line, with list bullets stripped.
fn split_requirements(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim().trim_start_matches(['-', '*', '•']).trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn format_salary(min: Option<i64>, max: Option<i64>) -> String {
    match (min, max) {
        (Some(lo), Some(hi)) if lo == hi => format!("${}", group_thousands(lo)),
        (Some(lo), Some(hi)) => format!("${} - ${}", group_thousands(lo), group_thousands(hi)),
        (Some(lo), None) => format!("Desde ${}", group_thousands(lo)),
        (None, Some(hi)) => format!("Hasta ${}", group_thousands(hi)),
        (None, None) => "A convenir".to_string(),
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    if n < 0 {
        format!("-{out}")
    } else {
        out
    }
}
