pub mod analytics;
pub mod assessment;
pub mod catalog;
pub mod config;
pub mod project;

use chrono::{DateTime, NaiveDate, Utc};
use impact_core::{Caller, Config, CoreError, ImpactService};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Caller identity from the global flags.
pub struct Identity {
    pub user: Option<String>,
    pub org: Option<String>,
    pub admin: bool,
}

impl Identity {
    pub fn caller(&self) -> Result<Caller, CoreError> {
        match (self.user.as_deref(), self.org.as_deref()) {
            (Some(user), Some(org)) if !user.trim().is_empty() && !org.trim().is_empty() => {
                let caller = Caller::new(user, org);
                Ok(if self.admin { caller.admin() } else { caller })
            }
            _ => Err(CoreError::Unauthenticated),
        }
    }
}

pub fn open_service(config: &Config) -> Result<ImpactService, CoreError> {
    tracing::debug!(database = %config.database.name, "opening service");
    ImpactService::from_config(config)
}

pub fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parse a snake_case enum value through its serde representation.
pub fn parse_enum<T: DeserializeOwned>(s: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(s.to_string())).map_err(|_| format!("invalid value '{s}'"))
}

/// RFC 3339 timestamp or plain `YYYY-MM-DD` (midnight UTC).
pub fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid date '{s}', expected RFC 3339 or YYYY-MM-DD"))
}

/// `key=value` argument.
pub fn parse_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.to_string())),
        _ => Err(format!("expected key=value, got '{s}'")),
    }
}

/// `Some(list)` only when at least one value was given.
pub fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use impact_core::workflow::TaskStatus;
    use impact_core::PhaseId;

    #[test]
    fn enums_parse_from_snake_case() {
        assert_eq!(parse_enum::<TaskStatus>("in_progress"), Ok(TaskStatus::InProgress));
        assert_eq!(parse_enum::<PhaseId>("mobilize"), Ok(PhaseId::Mobilize));
        assert!(parse_enum::<PhaseId>("launch").is_err());
    }

    #[test]
    fn dates_accept_plain_days() {
        let d = parse_date("2026-03-01").unwrap();
        assert_eq!(d.to_rfc3339(), "2026-03-01T00:00:00+00:00");
        assert!(parse_date("2026-03-01T12:00:00Z").is_ok());
        assert!(parse_date("March").is_err());
    }

    #[test]
    fn pairs_need_a_key() {
        assert_eq!(parse_pair("vision=4"), Ok(("vision".into(), "4".into())));
        assert!(parse_pair("=4").is_err());
        assert!(parse_pair("vision").is_err());
    }

    #[test]
    fn identity_requires_user_and_org() {
        let id = Identity {
            user: Some("alice".into()),
            org: None,
            admin: false,
        };
        assert!(id.caller().is_err());
        let id = Identity {
            user: Some("alice".into()),
            org: Some("acme".into()),
            admin: true,
        };
        assert!(id.caller().unwrap().is_admin);
    }
}
