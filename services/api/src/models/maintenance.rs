//! Maintenance record models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Reference, machine::MachineSummary, required};

/// A maintenance (ТО) record
#[derive(Debug, Clone, Serialize)]
pub struct Maintenance {
    pub id: i64,
    pub machine: MachineSummary,
    pub maintenance_type: Reference,
    pub maintenance_date: NaiveDate,
    pub operating_hours: i32,
    pub work_order_number: String,
    pub work_order_date: NaiveDate,
    /// Organization that did the work, as typed in
    pub maintenance_company: String,
    pub service_company: Option<Reference>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Body of maintenance create and update requests
#[derive(Debug, Clone, Deserialize)]
pub struct MaintenancePayload {
    pub machine_id: i64,
    pub maintenance_type_id: i64,
    pub maintenance_date: NaiveDate,
    pub operating_hours: i32,
    pub work_order_number: String,
    pub work_order_date: NaiveDate,
    #[serde(default)]
    pub maintenance_company: String,
    pub service_company_id: Option<i64>,
}

impl MaintenancePayload {
    /// Trimmed copy, or the validation message
    pub fn validated(&self) -> Result<MaintenancePayload, String> {
        if self.operating_hours < 0 {
            return Err("operating_hours must not be negative".to_string());
        }

        Ok(MaintenancePayload {
            work_order_number: required(&self.work_order_number, "work_order_number")?,
            maintenance_company: self.maintenance_company.trim().to_string(),
            ..self.clone()
        })
    }
}

/// Query parameters for maintenance listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaintenanceQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub maintenance_type: Option<i64>,
    pub machine_serial: Option<String>,
    pub service_company: Option<i64>,
    pub machine: Option<i64>,
    pub maintenance_date_from: Option<NaiveDate>,
    pub maintenance_date_to: Option<NaiveDate>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> MaintenancePayload {
        serde_json::from_value(serde_json::json!({
            "machine_id": 1,
            "maintenance_type_id": 2,
            "maintenance_date": "2023-03-15",
            "operating_hours": 120,
            "work_order_number": " #2023-12ТО ",
            "work_order_date": "2023-03-10",
            "service_company_id": null
        }))
        .unwrap()
    }

    #[test]
    fn test_payload_defaults_and_trim() {
        let valid = payload().validated().unwrap();
        assert_eq!(valid.work_order_number, "#2023-12ТО");
        assert_eq!(valid.maintenance_company, "");
        assert_eq!(valid.service_company_id, None);
    }

    #[test]
    fn test_negative_hours_rejected() {
        let payload = MaintenancePayload {
            operating_hours: -1,
            ..payload()
        };
        assert!(payload.validated().is_err());
    }

    #[test]
    fn test_blank_work_order_rejected() {
        let payload = MaintenancePayload {
            work_order_number: "   ".to_string(),
            ..payload()
        };
        assert_eq!(
            payload.validated().unwrap_err(),
            "work_order_number must not be empty"
        );
    }
}
