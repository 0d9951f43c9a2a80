use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::ParseEnumError;

/// Which side of the board an account sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Company,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Company => "company",
        }
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "company" => Ok(Role::Company),
            _ => Err(ParseEnumError::new("role", s)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscription level. Only `Free` accounts are subject to quotas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    #[default]
    Free,
    Professional,
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Professional => "professional",
        }
    }
}

impl FromStr for PlanTier {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(PlanTier::Free),
            "professional" => Ok(PlanTier::Professional),
            _ => Err(ParseEnumError::new("plan tier", s)),
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user or company as seen by the rules engine. Read-only during evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
    pub plan_tier: PlanTier,
}

impl Actor {
    pub fn is_professional(&self) -> bool {
        self.plan_tier == PlanTier::Professional
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActorRow {
    pub id: Uuid,
    pub role: String,
    pub plan: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ActorRow> for Actor {
    type Error = ParseEnumError;

    fn try_from(row: ActorRow) -> Result<Self, Self::Error> {
        Ok(Actor {
            id: row.id,
            role: row.role.parse()?,
            plan_tier: row.plan.parse()?,
        })
    }
}
