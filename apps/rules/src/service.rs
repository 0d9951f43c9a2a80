//! Eligibility service — the glue a web handler calls.
//!
//! Loads state through an `EligibilityStore`, runs the pure quota/progress/
//! vacancy rules and writes back what they return. Read-modify-write calls
//! on enrollments and jobs are serialized through one async mutex.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::config::RulesConfig;
use crate::errors::AppError;
use crate::jobs::{format_job, vacancy, JobListing, VacancyOutcome};
use crate::models::{Actor, CompletionRecord, Course, Enrollment, Job, JobStatus, Role};
use crate::progress::{self, EnrollmentProgress};
use crate::quota::{ActionKind, QuotaContext, QuotaDecision, QuotaPolicy};
use crate::signals::Signal;
use crate::store::EligibilityStore;

/// Result of a progress recompute, plus anything worth notifying about.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressUpdate {
    pub enrollment_id: Uuid,
    pub progress: EnrollmentProgress,
    pub signals: Vec<Signal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobUpdate {
    pub job: JobListing,
    pub vacancy: VacancyOutcome,
    pub signals: Vec<Signal>,
}

pub struct EligibilityService<S> {
    store: S,
    policy: QuotaPolicy,
    write_lock: Mutex<()>,
}

impl<S: EligibilityStore> EligibilityService<S> {
    pub fn new(store: S, policy: QuotaPolicy) -> Self {
        Self {
            store,
            policy,
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_config(store: S, config: &RulesConfig) -> Self {
        Self::new(store, QuotaPolicy::new(config.quota))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> &QuotaPolicy {
        &self.policy
    }

    /// Checks that `applicant_id` may apply to `job_id` right now.
    ///
    /// Two quotas apply: the applicant's own rolling-window limit, and the
    /// per-job cap when the job belongs to a free-tier company. The caller
    /// inserts the application only if this returns `Ok`.
    pub async fn authorize_submit_application(
        &self,
        applicant_id: Uuid,
        job_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let applicant = self.actor(applicant_id).await?;
        if applicant.role != Role::User {
            return Err(AppError::Forbidden(
                "Only candidate accounts can apply to jobs".to_string(),
            ));
        }

        let job = self.job(job_id).await?;
        if job.status == JobStatus::Closed {
            return Err(AppError::Conflict(format!(
                "Job {job_id} is no longer accepting applications"
            )));
        }

        let since = self.policy.application_window_start(now);
        let submitted = self
            .store
            .count_applications_since(applicant.id, since)
            .await?;
        self.enforce(&QuotaContext {
            actor: &applicant,
            action: ActionKind::SubmitApplication,
            current_count: submitted,
            window_start: Some(since),
        })?;

        let owner = self.actor(job.company_id).await?;
        let received = self.store.count_job_applications(job.id).await?;
        self.enforce(&QuotaContext {
            actor: &owner,
            action: ActionKind::CountJobApplications,
            current_count: received,
            window_start: None,
        })
    }

    /// Checks that `company_id` may publish one more job.
    pub async fn authorize_post_job(&self, company_id: Uuid) -> Result<(), AppError> {
        let company = self.actor(company_id).await?;
        if company.role != Role::Company {
            return Err(AppError::Forbidden(
                "Only company accounts can post jobs".to_string(),
            ));
        }

        let posted = self.store.count_jobs_posted(company.id).await?;
        self.enforce(&QuotaContext {
            actor: &company,
            action: ActionKind::PostJob,
            current_count: posted,
            window_start: None,
        })
    }

    /// Records `lesson_id` as completed and recomputes the enrollment.
    /// Completing the same lesson twice is rejected with `Conflict`.
    pub async fn complete_lesson(
        &self,
        enrollment_id: Uuid,
        lesson_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ProgressUpdate, AppError> {
        let lesson_id = lesson_id.trim();
        if lesson_id.is_empty() {
            return Err(AppError::Validation("lesson_id must not be empty".to_string()));
        }

        let _guard = self.write_lock.lock().await;
        let (enrollment, course) = self.enrollment_with_course(enrollment_id).await?;

        let mut records = self.store.load_completion_records(enrollment.id).await?;
        if records
            .iter()
            .any(|r| r.lesson_id == lesson_id && r.is_completed)
        {
            return Err(AppError::Conflict(format!(
                "Lesson {lesson_id} is already completed"
            )));
        }

        let record = CompletionRecord::completed(enrollment.id, lesson_id, now);
        self.store.insert_completion_record(&record).await?;
        records.retain(|r| r.lesson_id != lesson_id);
        records.push(record);

        self.persist_progress(&enrollment, &course, &records, now)
            .await
    }

    /// Recomputes and persists an enrollment's progress from stored records.
    pub async fn recompute_enrollment(
        &self,
        enrollment_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<ProgressUpdate, AppError> {
        let _guard = self.write_lock.lock().await;
        let (enrollment, course) = self.enrollment_with_course(enrollment_id).await?;
        let records = self.store.load_completion_records(enrollment.id).await?;
        self.persist_progress(&enrollment, &course, &records, now)
            .await
    }

    /// Re-checks a job's vacancies after an application was accepted and
    /// closes the job once every position is filled.
    pub async fn sync_job_vacancies(&self, job_id: Uuid) -> Result<JobUpdate, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut job = self.job(job_id).await?;
        let accepted = self.store.count_accepted_applications(job.id).await?;
        let outcome = vacancy::evaluate(&job, accepted);

        let mut signals = Vec::new();
        if outcome.requires_close() {
            self.store.save_job_status(job.id, JobStatus::Closed).await?;
            job.status = JobStatus::Closed;
            info!(job_id = %job.id, accepted, "Job auto-closed: all vacancies filled");
            signals.push(Signal::JobAutoClosed {
                job_id: job.id,
                company_id: job.company_id,
            });
        }

        let listing = self.listing_for(&job, accepted).await?;
        Ok(JobUpdate {
            job: listing,
            vacancy: outcome,
            signals,
        })
    }

    /// Changes a job's status on behalf of its owner and returns the job in
    /// its client-facing shape.
    pub async fn set_job_status(
        &self,
        company_id: Uuid,
        job_id: Uuid,
        status: JobStatus,
    ) -> Result<JobListing, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut job = self.job(job_id).await?;
        if job.company_id != company_id {
            return Err(AppError::Forbidden(format!(
                "Job {job_id} belongs to another company"
            )));
        }

        if job.status != status {
            self.store.save_job_status(job.id, status).await?;
            job.status = status;
            info!(job_id = %job.id, %status, "Job status updated");
        }

        let accepted = self.store.count_accepted_applications(job.id).await?;
        self.listing_for(&job, accepted).await
    }

    pub async fn job_listing(&self, job_id: Uuid) -> Result<JobListing, AppError> {
        let job = self.job(job_id).await?;
        let accepted = self.store.count_accepted_applications(job.id).await?;
        self.listing_for(&job, accepted).await
    }

    fn enforce(&self, ctx: &QuotaContext<'_>) -> Result<(), AppError> {
        match self.policy.evaluate(ctx) {
            QuotaDecision::Allow => Ok(()),
            QuotaDecision::Deny(reason) => Err(AppError::QuotaExceeded {
                actor_id: ctx.actor.id,
                reason,
            }),
        }
    }

    async fn persist_progress(
        &self,
        enrollment: &Enrollment,
        course: &Course,
        records: &[CompletionRecord],
        now: DateTime<Utc>,
    ) -> Result<ProgressUpdate, AppError> {
        let progress = progress::recompute(enrollment, course, records, now);
        self.store.save_progress(enrollment.id, &progress).await?;

        let mut signals = Vec::new();
        if progress.newly_completed(enrollment) {
            info!(
                enrollment_id = %enrollment.id,
                user_id = %enrollment.user_id,
                course = %course.title,
                "Course completed"
            );
            signals.push(Signal::CourseCompleted {
                enrollment_id: enrollment.id,
                user_id: enrollment.user_id,
            });
        }

        Ok(ProgressUpdate {
            enrollment_id: enrollment.id,
            progress,
            signals,
        })
    }

    async fn listing_for(&self, job: &Job, accepted: u32) -> Result<JobListing, AppError> {
        let received = self.store.count_job_applications(job.id).await?;
        Ok(format_job(job, received, accepted))
    }

    async fn actor(&self, actor_id: Uuid) -> Result<Actor, AppError> {
        self.store
            .load_actor(actor_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Account {actor_id} not found")))
    }

    async fn job(&self, job_id: Uuid) -> Result<Job, AppError> {
        self.store
            .load_job(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))
    }

    async fn enrollment_with_course(
        &self,
        enrollment_id: Uuid,
    ) -> Result<(Enrollment, Course), AppError> {
        let enrollment = self
            .store
            .load_enrollment(enrollment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Enrollment {enrollment_id} not found")))?;
        let course = self
            .store
            .load_course(enrollment.course_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Course {} not found", enrollment.course_id))
            })?;
        Ok((enrollment, course))
    }
}
