use serde::Serialize;

use crate::models::{Job, JobStatus};

/// What the vacancy count says about a job after an application is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VacancyOutcome {
    /// Open, with this many positions still unfilled.
    StillOpen { remaining: u32 },
    /// Open, but every position is now taken; the job must be closed.
    Filled,
    AlreadyClosed,
    /// Open, and the posting has no vacancy count to fill.
    Unlimited,
}

impl VacancyOutcome {
    pub fn requires_close(&self) -> bool {
        matches!(self, VacancyOutcome::Filled)
    }
}

/// Compares accepted applications against the job's vacancies.
pub fn evaluate(job: &Job, accepted: u32) -> VacancyOutcome {
    if job.status == JobStatus::Closed {
        return VacancyOutcome::AlreadyClosed;
    }
    match job.vacancies {
        None => VacancyOutcome::Unlimited,
        Some(vacancies) if accepted >= vacancies => VacancyOutcome::Filled,
        Some(vacancies) => VacancyOutcome::StillOpen {
            remaining: vacancies - accepted,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn job(vacancies: Option<u32>, status: JobStatus) -> Job {
        Job {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            title: "QA Analyst".to_string(),
            location: None,
            requirements: None,
            salary_min: None,
            salary_max: None,
            vacancies,
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_open_job_with_remaining_positions() {
        assert_eq!(
            evaluate(&job(Some(3), JobStatus::Open), 1),
            VacancyOutcome::StillOpen { remaining: 2 }
        );
    }

    #[test]
    fn test_last_position_fills_job() {
        let outcome = evaluate(&job(Some(2), JobStatus::Open), 2);
        assert_eq!(outcome, VacancyOutcome::Filled);
        assert!(outcome.requires_close());
        assert_eq!(evaluate(&job(Some(2), JobStatus::Open), 7), VacancyOutcome::Filled);
    }

    #[test]
    fn test_closed_and_unlimited_jobs() {
        assert_eq!(
            evaluate(&job(Some(1), JobStatus::Closed), 5),
            VacancyOutcome::AlreadyClosed
        );
        assert_eq!(evaluate(&job(None, JobStatus::Open), 50), VacancyOutcome::Unlimited);
        assert!(!VacancyOutcome::Unlimited.requires_close());
    }
}
