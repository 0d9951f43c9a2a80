use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::EligibilityStore;
use crate::errors::AppError;
use crate::models::{
    Actor, ActorRow, CompletionRecord, Course, Enrollment, EnrollmentRow, Job, JobRow, JobStatus,
};
use crate::progress::EnrollmentProgress;

/// Postgres-backed store over the job board's relational schema
/// (`users`, `jobs`, `applications`, `courses`, `course_lessons`,
/// `enrollments`, `lesson_progress`).
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool and wraps it.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        info!("Connecting to PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("failed to connect to PostgreSQL")?;

        info!("PostgreSQL connection pool established");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn to_count(n: i64) -> u32 {
    u32::try_from(n.max(0)).unwrap_or(u32::MAX)
}

#[async_trait]
impl EligibilityStore for PgStore {
    async fn load_actor(&self, actor_id: Uuid) -> Result<Option<Actor>, AppError> {
        let row: Option<ActorRow> =
            sqlx::query_as("SELECT id, role, plan, created_at FROM users WHERE id = $1")
                .bind(actor_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Actor::try_from).transpose()?)
    }

    async fn count_applications_since(
        &self,
        applicant_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<u32, AppError> {
        let n: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM applications WHERE applicant_id = $1 AND created_at >= $2",
        )
        .bind(applicant_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(to_count(n))
    }

    async fn count_jobs_posted(&self, company_id: Uuid) -> Result<u32, AppError> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE company_id = $1")
            .bind(company_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(to_count(n))
    }

    async fn count_job_applications(&self, job_id: Uuid) -> Result<u32, AppError> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE job_id = $1")
            .bind(job_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(to_count(n))
    }

    async fn count_accepted_applications(&self, job_id: Uuid) -> Result<u32, AppError> {
        let n: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM applications WHERE job_id = $1 AND status = 'accepted'",
        )
        .bind(job_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(to_count(n))
    }

    async fn load_job(&self, job_id: Uuid) -> Result<Option<Job>, AppError> {
        let row: Option<JobRow> = sqlx::query_as(
            r#"
            SELECT id, company_id, title, location, requirements,
                   salary_min, salary_max, vacancies, status, created_at
            FROM jobs
            WHERE id = $1
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Job::try_from).transpose()?)
    }

    async fn save_job_status(&self, job_id: Uuid, status: JobStatus) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE jobs SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Job {job_id} not found")));
        }
        Ok(())
    }

    async fn load_enrollment(&self, enrollment_id: Uuid) -> Result<Option<Enrollment>, AppError> {
        let row: Option<EnrollmentRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, course_id, progress_percentage, status, completed_at
            FROM enrollments
            WHERE id = $1
            "#,
        )
        .bind(enrollment_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Enrollment::try_from).transpose()?)
    }

    async fn load_course(&self, course_id: Uuid) -> Result<Option<Course>, AppError> {
        let title: Option<String> = sqlx::query_scalar("SELECT title FROM courses WHERE id = $1")
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(title) = title else {
            return Ok(None);
        };

        let lessons: Vec<String> = sqlx::query_scalar(
            "SELECT title FROM course_lessons WHERE course_id = $1 ORDER BY position ASC",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Course {
            id: course_id,
            title,
            lessons,
        }))
    }

    async fn load_completion_records(
        &self,
        enrollment_id: Uuid,
    ) -> Result<Vec<CompletionRecord>, AppError> {
        Ok(sqlx::query_as::<_, CompletionRecord>(
            r#"
            SELECT enrollment_id, lesson_id, is_completed, completed_at
            FROM lesson_progress
            WHERE enrollment_id = $1
            "#,
        )
        .bind(enrollment_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_completion_record(&self, record: &CompletionRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO lesson_progress (enrollment_id, lesson_id, is_completed, completed_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (enrollment_id, lesson_id) DO UPDATE
            SET is_completed = TRUE,
                completed_at = COALESCE(lesson_progress.completed_at, EXCLUDED.completed_at)
            "#,
        )
        .bind(record.enrollment_id)
        .bind(&record.lesson_id)
        .bind(record.is_completed)
        .bind(record.completed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save_progress(
        &self,
        enrollment_id: Uuid,
        progress: &EnrollmentProgress,
    ) -> Result<(), AppError> {
        // COALESCE keeps the first completion timestamp.
        let result = sqlx::query(
            r#"
            UPDATE enrollments
            SET progress_percentage = $1,
                status = $2,
                completed_at = COALESCE(completed_at, $3)
            WHERE id = $4
            "#,
        )
        .bind(i32::from(progress.progress_percentage))
        .bind(progress.status.as_str())
        .bind(progress.completed_at)
        .bind(enrollment_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Enrollment {enrollment_id} not found"
            )));
        }
        Ok(())
    }
}
