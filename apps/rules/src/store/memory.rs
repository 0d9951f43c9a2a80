use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::EligibilityStore;
use crate::errors::AppError;
use crate::models::{Actor, CompletionRecord, Course, Enrollment, Job, JobStatus};
use crate::progress::EnrollmentProgress;

#[derive(Debug, Clone)]
struct ApplicationEntry {
    applicant_id: Uuid,
    job_id: Uuid,
    submitted_at: DateTime<Utc>,
    accepted: bool,
}

#[derive(Debug, Default)]
struct State {
    actors: HashMap<Uuid, Actor>,
    jobs: HashMap<Uuid, Job>,
    applications: Vec<ApplicationEntry>,
    courses: HashMap<Uuid, Course>,
    enrollments: HashMap<Uuid, Enrollment>,
    records: Vec<CompletionRecord>,
}

/// In-process store. Backs the service tests and lightweight embedders.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_actor(&self, actor: Actor) {
        self.state.write().await.actors.insert(actor.id, actor);
    }

    pub async fn insert_job(&self, job: Job) {
        self.state.write().await.jobs.insert(job.id, job);
    }

    pub async fn insert_application(
        &self,
        applicant_id: Uuid,
        job_id: Uuid,
        submitted_at: DateTime<Utc>,
    ) {
        self.state.write().await.applications.push(ApplicationEntry {
            applicant_id,
            job_id,
            submitted_at,
            accepted: false,
        });
    }

    /// Marks the oldest pending application of `applicant_id` on `job_id` as
    /// accepted. Returns false if there was none.
    pub async fn accept(&self, applicant_id: Uuid, job_id: Uuid) -> bool {
        let mut state = self.state.write().await;
        match state
            .applications
            .iter_mut()
            .find(|a| a.applicant_id == applicant_id && a.job_id == job_id && !a.accepted)
        {
            Some(application) => {
                application.accepted = true;
                true
            }
            None => false,
        }
    }

    pub async fn insert_course(&self, course: Course) {
        self.state.write().await.courses.insert(course.id, course);
    }

    pub async fn insert_enrollment(&self, enrollment: Enrollment) {
        self.state
            .write()
            .await
            .enrollments
            .insert(enrollment.id, enrollment);
    }

    pub async fn enrollment(&self, enrollment_id: Uuid) -> Option<Enrollment> {
        self.state.read().await.enrollments.get(&enrollment_id).cloned()
    }

    pub async fn job(&self, job_id: Uuid) -> Option<Job> {
        self.state.read().await.jobs.get(&job_id).cloned()
    }

    /// Deletes a completion record, e.g. when a lesson is removed from a course.
    pub async fn remove_completion_record(&self, enrollment_id: Uuid, lesson_id: &str) {
        self.state
            .write()
            .await
            .records
            .retain(|r| !(r.enrollment_id == enrollment_id && r.lesson_id == lesson_id));
    }
}

fn count<I: Iterator>(iter: I) -> u32 {
    u32::try_from(iter.count()).unwrap_or(u32::MAX)
}

#[async_trait]
impl EligibilityStore for MemoryStore {
    async fn load_actor(&self, actor_id: Uuid) -> Result<Option<Actor>, AppError> {
        Ok(self.state.read().await.actors.get(&actor_id).cloned())
    }

    async fn count_applications_since(
        &self,
        applicant_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<u32, AppError> {
        let state = self.state.read().await;
        Ok(count(state.applications.iter().filter(|a| {
            a.applicant_id == applicant_id && a.submitted_at >= since
        })))
    }

    async fn count_jobs_posted(&self, company_id: Uuid) -> Result<u32, AppError> {
        let state = self.state.read().await;
        Ok(count(state.jobs.values().filter(|j| j.company_id == company_id)))
    }

    async fn count_job_applications(&self, job_id: Uuid) -> Result<u32, AppError> {
        let state = self.state.read().await;
        Ok(count(state.applications.iter().filter(|a| a.job_id == job_id)))
    }

    async fn count_accepted_applications(&self, job_id: Uuid) -> Result<u32, AppError> {
        let state = self.state.read().await;
        Ok(count(
            state
                .applications
                .iter()
                .filter(|a| a.job_id == job_id && a.accepted),
        ))
    }

    async fn load_job(&self, job_id: Uuid) -> Result<Option<Job>, AppError> {
        Ok(self.state.read().await.jobs.get(&job_id).cloned())
    }

    async fn save_job_status(&self, job_id: Uuid, status: JobStatus) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        let job = state
            .jobs
            .get_mut(&job_id)
            .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
        job.status = status;
        Ok(())
    }

    async fn load_enrollment(&self, enrollment_id: Uuid) -> Result<Option<Enrollment>, AppError> {
        Ok(self.enrollment(enrollment_id).await)
    }

    async fn load_course(&self, course_id: Uuid) -> Result<Option<Course>, AppError> {
        Ok(self.state.read().await.courses.get(&course_id).cloned())
    }

    async fn load_completion_records(
        &self,
        enrollment_id: Uuid,
    ) -> Result<Vec<CompletionRecord>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .records
            .iter()
            .filter(|r| r.enrollment_id == enrollment_id)
            .cloned()
            .collect())
    }

    async fn insert_completion_record(&self, record: &CompletionRecord) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        match state
            .records
            .iter_mut()
            .find(|r| r.enrollment_id == record.enrollment_id && r.lesson_id == record.lesson_id)
        {
            Some(existing) => {
                existing.is_completed = true;
                existing.completed_at = existing.completed_at.or(record.completed_at);
            }
            None => state.records.push(record.clone()),
        }
        Ok(())
    }

    async fn save_progress(
        &self,
        enrollment_id: Uuid,
        progress: &EnrollmentProgress,
    ) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        let enrollment = state
            .enrollments
            .get_mut(&enrollment_id)
            .ok_or_else(|| AppError::NotFound(format!("Enrollment {enrollment_id} not found")))?;
        enrollment.progress_percentage = progress.progress_percentage;
        enrollment.status = progress.status;
        enrollment.completed_at = enrollment.completed_at.or(progress.completed_at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlanTier, Role};
    use chrono::Duration;

    #[tokio::test]
    async fn test_counts_respect_window_and_job() {
        let store = MemoryStore::new();
        let applicant = Uuid::new_v4();
        let job_a = Uuid::new_v4();
        let job_b = Uuid::new_v4();
        let now = Utc::now();

        store.insert_application(applicant, job_a, now - Duration::days(40)).await;
        store.insert_application(applicant, job_a, now - Duration::days(3)).await;
        store.insert_application(applicant, job_b, now).await;

        let since = now - Duration::days(30);
        assert_eq!(store.count_applications_since(applicant, since).await.unwrap(), 2);
        assert_eq!(store.count_job_applications(job_a).await.unwrap(), 2);
        assert_eq!(store.count_accepted_applications(job_a).await.unwrap(), 0);

        assert!(store.accept(applicant, job_a).await);
        assert_eq!(store.count_accepted_applications(job_a).await.unwrap(), 1);
        assert!(!store.accept(applicant, Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn test_save_progress_never_clears_completion() {
        let store = MemoryStore::new();
        let user = Actor {
            id: Uuid::new_v4(),
            role: Role::User,
            plan_tier: PlanTier::Free,
        };
        store.insert_actor(user.clone()).await;
        let mut enrollment = Enrollment::new(user.id, Uuid::new_v4());
        let done_at = Utc::now();
        enrollment.completed_at = Some(done_at);
        store.insert_enrollment(enrollment.clone()).await;

        let progress = EnrollmentProgress {
            progress_percentage: 50,
            status: crate::models::EnrollmentStatus::InProgress,
            completed_at: None,
            completed_lessons: 1,
            total_lessons: 2,
        };
        store.save_progress(enrollment.id, &progress).await.unwrap();

        let saved = store.enrollment(enrollment.id).await.unwrap();
        assert_eq!(saved.progress_percentage, 50);
        assert_eq!(saved.completed_at, Some(done_at));
    }

    #[tokio::test]
    async fn test_missing_rows_are_not_found() {
        let store = MemoryStore::new();
        let err = store
            .save_job_status(Uuid::new_v4(), JobStatus::Closed)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
