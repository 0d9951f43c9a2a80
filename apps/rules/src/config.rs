use anyhow::{bail, Context, Result};

use crate::quota::QuotaLimits;

/// Rules-engine configuration loaded from environment variables.
/// Every variable is optional; quota limits default to the free-plan values.
#[derive(Debug, Clone)]
pub struct RulesConfig {
    /// Only needed when the Postgres store is used.
    pub database_url: Option<String>,
    pub quota: QuotaLimits,
    pub rust_log: String,
}

impl RulesConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = QuotaLimits::default();
        let quota = QuotaLimits {
            applications_per_window: parse_or(
                &lookup,
                "FREE_APPLICATIONS_PER_MONTH",
                defaults.applications_per_window,
            )?,
            job_postings: parse_or(&lookup, "FREE_JOB_POSTINGS", defaults.job_postings)?,
            applications_per_job: parse_or(
                &lookup,
                "FREE_APPLICATIONS_PER_JOB",
                defaults.applications_per_job,
            )?,
            window_months: parse_or(&lookup, "APPLICATION_WINDOW_MONTHS", defaults.window_months)?,
        };
        if quota.window_months == 0 {
            bail!("APPLICATION_WINDOW_MONTHS must be at least 1");
        }

        Ok(RulesConfig {
            database_url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            quota,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .context("Required environment variable 'DATABASE_URL' is not set")
    }
}

fn parse_or<F>(lookup: &F, key: &str, default: u32) -> Result<u32>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .with_context(|| format!("{key} must be a non-negative integer, got '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<RulesConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RulesConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.quota, QuotaLimits::default());
        assert_eq!(config.rust_log, "info");
        assert!(config.database_url.is_none());
        assert!(config.require_database_url().is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("FREE_APPLICATIONS_PER_MONTH", "4"),
            ("FREE_APPLICATIONS_PER_JOB", " 10 "),
            ("DATABASE_URL", "postgres://localhost/jobs"),
            ("RUST_LOG", "debug"),
        ])
        .unwrap();
        assert_eq!(config.quota.applications_per_window, 4);
        assert_eq!(config.quota.applications_per_job, 10);
        assert_eq!(config.quota.job_postings, 2);
        assert_eq!(config.require_database_url().unwrap(), "postgres://localhost/jobs");
        assert_eq!(config.rust_log, "debug");
    }

    #[test]
    fn test_invalid_number_is_reported() {
        let err = config_from(&[("FREE_JOB_POSTINGS", "two")]).unwrap_err();
        assert!(err.to_string().contains("FREE_JOB_POSTINGS"));
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(config_from(&[("APPLICATION_WINDOW_MONTHS", "0")]).is_err());
    }
}
