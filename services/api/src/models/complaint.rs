//! Complaint (рекламация) models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Reference, machine::MachineSummary, required};

/// A complaint about a machine failure
#[derive(Debug, Clone, Serialize)]
pub struct Complaint {
    pub id: i64,
    pub machine: MachineSummary,
    pub failure_date: NaiveDate,
    pub operating_hours: i32,
    pub failure_node: Reference,
    pub failure_description: String,
    pub recovery_method: Reference,
    pub spare_parts: String,
    pub recovery_date: NaiveDate,
    /// Days between failure and recovery
    pub downtime: i32,
    pub service_company: Option<Reference>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Days the machine stood idle. Never negative.
pub fn downtime_days(failure_date: NaiveDate, recovery_date: NaiveDate) -> i32 {
    (recovery_date - failure_date).num_days().clamp(0, i32::MAX as i64) as i32
}

/// Body of complaint create and update requests. Downtime is derived.
#[derive(Debug, Clone, Deserialize)]
pub struct ComplaintPayload {
    pub machine_id: i64,
    pub failure_date: NaiveDate,
    pub operating_hours: i32,
    pub failure_node_id: i64,
    pub failure_description: String,
    pub recovery_method_id: i64,
    #[serde(default)]
    pub spare_parts: String,
    pub recovery_date: NaiveDate,
    pub service_company_id: Option<i64>,
}

impl ComplaintPayload {
    /// Trimmed copy, or the validation message
    pub fn validated(&self) -> Result<ComplaintPayload, String> {
        if self.operating_hours < 0 {
            return Err("operating_hours must not be negative".to_string());
        }
        if self.recovery_date < self.failure_date {
            return Err("recovery_date must not be earlier than failure_date".to_string());
        }

        Ok(ComplaintPayload {
            failure_description: required(&self.failure_description, "failure_description")?,
            spare_parts: self.spare_parts.trim().to_string(),
            ..self.clone()
        })
    }

    pub fn downtime(&self) -> i32 {
        downtime_days(self.failure_date, self.recovery_date)
    }
}

/// Query parameters for complaint listing and statistics
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComplaintQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub failure_node: Option<i64>,
    pub recovery_method: Option<i64>,
    pub service_company: Option<i64>,
    pub machine_serial: Option<String>,
    pub machine: Option<i64>,
    pub failure_date_from: Option<NaiveDate>,
    pub failure_date_to: Option<NaiveDate>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

/// Complaint count for one failure node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureNodeCount {
    pub failure_node: Reference,
    pub count: i64,
}

/// Aggregates over the complaints visible to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplaintStatistics {
    pub total: i64,
    pub by_failure_node: Vec<FailureNodeCount>,
    pub average_downtime: f64,
    pub total_downtime: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn payload() -> ComplaintPayload {
        ComplaintPayload {
            machine_id: 1,
            failure_date: date(2023, 1, 10),
            operating_hours: 300,
            failure_node_id: 1,
            failure_description: " Течь масла ".to_string(),
            recovery_method_id: 2,
            spare_parts: String::new(),
            recovery_date: date(2023, 1, 14),
            service_company_id: Some(3),
        }
    }

    #[test]
    fn test_downtime_days() {
        assert_eq!(downtime_days(date(2023, 1, 10), date(2023, 1, 14)), 4);
        assert_eq!(downtime_days(date(2023, 1, 10), date(2023, 1, 10)), 0);
        assert_eq!(downtime_days(date(2023, 1, 10), date(2023, 1, 1)), 0);
        assert_eq!(downtime_days(date(2023, 2, 27), date(2023, 3, 2)), 3);
    }

    #[test]
    fn test_payload_validation() {
        let valid = payload().validated().unwrap();
        assert_eq!(valid.failure_description, "Течь масла");
        assert_eq!(valid.downtime(), 4);
    }

    #[test]
    fn test_recovery_before_failure_rejected() {
        let payload = ComplaintPayload {
            recovery_date: date(2023, 1, 9),
            ..payload()
        };
        assert_eq!(
            payload.validated().unwrap_err(),
            "recovery_date must not be earlier than failure_date"
        );
    }

    #[test]
    fn test_downtime_is_not_accepted_from_clients() {
        let payload: ComplaintPayload = serde_json::from_value(serde_json::json!({
            "machine_id": 1,
            "failure_date": "2023-01-10",
            "operating_hours": 10,
            "failure_node_id": 1,
            "failure_description": "x",
            "recovery_method_id": 1,
            "recovery_date": "2023-01-12",
            "service_company_id": null,
            "downtime": 100
        }))
        .unwrap();
        assert_eq!(payload.downtime(), 2);
    }
}
