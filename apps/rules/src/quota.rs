//! Plan-tier quotas — decides whether a free-tier account may perform one more
//! create-action. Pure: all counting happens in storage before the call.
//!
//! Professional accounts are never limited. The thresholds live in
//! `QuotaLimits` so deployments can tune them without touching the rules.

use std::fmt;

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::Actor;

/// The create-action being gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// An applicant submitting an application. Counted over a rolling window.
    SubmitApplication,
    /// A company publishing a job. Counted over all time.
    PostJob,
    /// A job owned by a free-tier company receiving one more application.
    /// The actor is the job's owner, not the applicant.
    CountJobApplications,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenialReason {
    ApplicationLimitReached,
    JobLimitReached,
    JobApplicationCapReached,
}

impl DenialReason {
    /// Stable, client-facing error code.
    pub fn code(&self) -> &'static str {
        match self {
            DenialReason::ApplicationLimitReached => "APPLICATION_LIMIT_REACHED",
            DenialReason::JobLimitReached => "JOB_LIMIT_REACHED",
            DenialReason::JobApplicationCapReached => "JOB_APPLICATION_CAP_REACHED",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            DenialReason::ApplicationLimitReached => {
                "Free plan allows a limited number of applications per month. Upgrade to apply to more jobs."
            }
            DenialReason::JobLimitReached => {
                "Free plan allows a limited number of job postings. Upgrade to publish more jobs."
            }
            DenialReason::JobApplicationCapReached => {
                "This job is no longer accepting applications."
            }
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum QuotaDecision {
    Allow,
    Deny(DenialReason),
}

impl QuotaDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, QuotaDecision::Allow)
    }
}

/// Input to a single quota evaluation. Never persisted.
#[derive(Debug, Clone)]
pub struct QuotaContext<'a> {
    pub actor: &'a Actor,
    pub action: ActionKind,
    /// Prior actions of this kind, counted by the caller. Ignored for
    /// professional accounts.
    pub current_count: u32,
    /// Lower bound of the counting window, when the action is windowed.
    pub window_start: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaLimits {
    pub applications_per_window: u32,
    pub job_postings: u32,
    pub applications_per_job: u32,
    /// Length of the rolling application window.
    pub window_months: u32,
}

impl Default for QuotaLimits {
    fn default() -> Self {
        Self {
            applications_per_window: 2,
            job_postings: 2,
            applications_per_job: 5,
            window_months: 1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QuotaPolicy {
    limits: QuotaLimits,
}

impl QuotaPolicy {
    pub fn new(limits: QuotaLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &QuotaLimits {
        &self.limits
    }

    /// Evaluates the quota rules in order; the first one that applies decides.
    pub fn evaluate(&self, ctx: &QuotaContext<'_>) -> QuotaDecision {
        if ctx.actor.is_professional() {
            return QuotaDecision::Allow;
        }

        let (limit, reason) = match ctx.action {
            ActionKind::SubmitApplication => (
                self.limits.applications_per_window,
                DenialReason::ApplicationLimitReached,
            ),
            ActionKind::PostJob => (self.limits.job_postings, DenialReason::JobLimitReached),
            ActionKind::CountJobApplications => (
                self.limits.applications_per_job,
                DenialReason::JobApplicationCapReached,
            ),
        };

        if ctx.current_count >= limit {
            info!(
                actor_id = %ctx.actor.id,
                action = ?ctx.action,
                count = ctx.current_count,
                limit,
                "Quota denied: {reason}"
            );
            QuotaDecision::Deny(reason)
        } else {
            QuotaDecision::Allow
        }
    }

    /// Start of the rolling application window ending at `now`.
    pub fn application_window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_months(Months::new(self.limits.window_months))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlanTier, Role};
    use chrono::TimeZone;
    use uuid::Uuid;

    const ALL_ACTIONS: [ActionKind; 3] = [
        ActionKind::SubmitApplication,
        ActionKind::PostJob,
        ActionKind::CountJobApplications,
    ];

    fn actor(role: Role, plan_tier: PlanTier) -> Actor {
        Actor {
            id: Uuid::new_v4(),
            role,
            plan_tier,
        }
    }

    fn decide(actor: &Actor, action: ActionKind, current_count: u32) -> QuotaDecision {
        QuotaPolicy::default().evaluate(&QuotaContext {
            actor,
            action,
            current_count,
            window_start: None,
        })
    }

    #[test]
    fn test_professional_is_never_limited() {
        let pro = actor(Role::Company, PlanTier::Professional);
        for action in ALL_ACTIONS {
            for count in [0, 1, 2, 5, 100, u32::MAX] {
                assert_eq!(decide(&pro, action, count), QuotaDecision::Allow);
            }
        }
    }

    #[test]
    fn test_application_limit_boundary() {
        let free = actor(Role::User, PlanTier::Free);
        assert!(decide(&free, ActionKind::SubmitApplication, 0).is_allowed());
        assert!(decide(&free, ActionKind::SubmitApplication, 1).is_allowed());
        for count in [2, 3, 50] {
            assert_eq!(
                decide(&free, ActionKind::SubmitApplication, count),
                QuotaDecision::Deny(DenialReason::ApplicationLimitReached)
            );
        }
    }

    #[test]
    fn test_job_limit_boundary() {
        let free = actor(Role::Company, PlanTier::Free);
        assert!(decide(&free, ActionKind::PostJob, 1).is_allowed());
        assert_eq!(
            decide(&free, ActionKind::PostJob, 2),
            QuotaDecision::Deny(DenialReason::JobLimitReached)
        );
    }

    #[test]
    fn test_job_application_cap_boundary() {
        let owner = actor(Role::Company, PlanTier::Free);
        for count in 0..5 {
            assert!(decide(&owner, ActionKind::CountJobApplications, count).is_allowed());
        }
        assert_eq!(
            decide(&owner, ActionKind::CountJobApplications, 5),
            QuotaDecision::Deny(DenialReason::JobApplicationCapReached)
        );
    }

    #[test]
    fn test_custom_limits_are_honoured() {
        let policy = QuotaPolicy::new(QuotaLimits {
            applications_per_window: 10,
            ..QuotaLimits::default()
        });
        let free = actor(Role::User, PlanTier::Free);
        let ctx = QuotaContext {
            actor: &free,
            action: ActionKind::SubmitApplication,
            current_count: 9,
            window_start: None,
        };
        assert!(policy.evaluate(&ctx).is_allowed());
    }

    #[test]
    fn test_window_start_is_one_month_back() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let start = QuotaPolicy::default().application_window_start(now);
        // Clamped to the last day of February.
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_denial_codes_are_stable() {
        let json = serde_json::to_string(&QuotaDecision::Deny(DenialReason::JobLimitReached))
            .unwrap();
        assert_eq!(json, r#"{"decision":"deny","reason":"JOB_LIMIT_REACHED"}"#);
        assert_eq!(
            DenialReason::JobApplicationCapReached.code(),
            "JOB_APPLICATION_CAP_REACHED"
        );
    }
}
