use serde::Serialize;
use uuid::Uuid;

use crate::quota::DenialReason;

/// Transitions the caller may want to notify someone about. The engine only
/// reports them; dispatching is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Signal {
    QuotaDenied { actor_id: Uuid, reason: DenialReason },
    CourseCompleted { enrollment_id: Uuid, user_id: Uuid },
    JobAutoClosed { job_id: Uuid, company_id: Uuid },
}
