//! Machine models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{AccountReference, Reference, required};

/// Full machine card for signed-in users
#[derive(Debug, Clone, Serialize)]
pub struct MachineDetail {
    pub id: i64,
    pub serial_number: String,
    pub technique_model: Reference,
    pub engine_model: Reference,
    pub engine_serial: String,
    pub transmission_model: Reference,
    pub transmission_serial: String,
    pub drive_axle_model: Reference,
    pub drive_axle_serial: String,
    pub steer_axle_model: Reference,
    pub steer_axle_serial: String,
    pub supply_contract: String,
    pub shipment_date: NaiveDate,
    pub consignee: String,
    pub delivery_address: String,
    pub equipment: String,
    pub client: Option<AccountReference>,
    pub service_organization: Option<AccountReference>,
}

/// What anonymous visitors see: the serial number lookup fields only
#[derive(Debug, Clone, Serialize)]
pub struct MachinePublic {
    pub id: i64,
    pub serial_number: String,
    pub technique_model: String,
    pub engine_model: String,
    pub engine_serial: String,
    pub transmission_model: String,
    pub transmission_serial: String,
    pub drive_axle_model: String,
    pub drive_axle_serial: String,
    pub steer_axle_model: String,
    pub steer_axle_serial: String,
}

impl From<MachineDetail> for MachinePublic {
    fn from(m: MachineDetail) -> Self {
        Self {
            id: m.id,
            serial_number: m.serial_number,
            technique_model: m.technique_model.name,
            engine_model: m.engine_model.name,
            engine_serial: m.engine_serial,
            transmission_model: m.transmission_model.name,
            transmission_serial: m.transmission_serial,
            drive_axle_model: m.drive_axle_model.name,
            drive_axle_serial: m.drive_axle_serial,
            steer_axle_model: m.steer_axle_model.name,
            steer_axle_serial: m.steer_axle_serial,
        }
    }
}

/// Machine as rendered for a particular caller
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MachineView {
    Public(MachinePublic),
    Detailed(MachineDetail),
}

impl MachineView {
    pub fn for_caller(machine: MachineDetail, authenticated: bool) -> Self {
        if authenticated {
            MachineView::Detailed(machine)
        } else {
            MachineView::Public(machine.into())
        }
    }
}

/// Machine as shown on maintenance and complaint records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MachineSummary {
    pub id: i64,
    pub serial_number: String,
    pub model: String,
}

/// Who a machine belongs to, for ownership checks on dependent records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineOwners {
    pub client_id: Option<i64>,
    pub service_organization_id: Option<i64>,
}

/// Body of machine create and update requests
#[derive(Debug, Clone, Deserialize)]
pub struct MachinePayload {
    pub serial_number: String,
    pub technique_model_id: i64,
    pub engine_model_id: i64,
    pub engine_serial: String,
    pub transmission_model_id: i64,
    pub transmission_serial: String,
    pub drive_axle_model_id: i64,
    pub drive_axle_serial: String,
    pub steer_axle_model_id: i64,
    pub steer_axle_serial: String,
    #[serde(default)]
    pub supply_contract: String,
    pub shipment_date: NaiveDate,
    #[serde(default)]
    pub consignee: String,
    #[serde(default)]
    pub delivery_address: String,
    #[serde(default)]
    pub equipment: String,
    pub client_id: Option<i64>,
    pub service_organization_id: Option<i64>,
}

impl MachinePayload {
    /// Trimmed copy, or the validation message
    pub fn validated(&self) -> Result<MachinePayload, String> {
        Ok(MachinePayload {
            serial_number: required(&self.serial_number, "serial_number")?,
            engine_serial: required(&self.engine_serial, "engine_serial")?,
            transmission_serial: required(&self.transmission_serial, "transmission_serial")?,
            drive_axle_serial: required(&self.drive_axle_serial, "drive_axle_serial")?,
            steer_axle_serial: required(&self.steer_axle_serial, "steer_axle_serial")?,
            supply_contract: self.supply_contract.trim().to_string(),
            consignee: self.consignee.trim().to_string(),
            delivery_address: self.delivery_address.trim().to_string(),
            equipment: self.equipment.trim().to_string(),
            ..self.clone()
        })
    }
}

/// Query parameters for machine listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MachineQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub technique_model: Option<i64>,
    pub engine_model: Option<i64>,
    pub transmission_model: Option<i64>,
    pub drive_axle_model: Option<i64>,
    pub steer_axle_model: Option<i64>,
    /// Case-insensitive substring of the serial number
    pub serial_number: Option<String>,
    pub shipment_date_from: Option<NaiveDate>,
    pub shipment_date_to: Option<NaiveDate>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(id: i64, name: &str) -> Reference {
        Reference {
            id,
            name: name.to_string(),
            description: format!("{} description", name),
        }
    }

    fn machine() -> MachineDetail {
        MachineDetail {
            id: 7,
            serial_number: "0017".to_string(),
            technique_model: reference(1, "ПД1,5"),
            engine_model: reference(2, "Kubota D1803"),
            engine_serial: "7U5042".to_string(),
            transmission_model: reference(3, "10VB-00106"),
            transmission_serial: "20R0050".to_string(),
            drive_axle_model: reference(4, "20VA-00101"),
            drive_axle_serial: "20R0071".to_string(),
            steer_axle_model: reference(5, "VS20-00001"),
            steer_axle_serial: "20R0067".to_string(),
            supply_contract: "#2022-09-01ИС".to_string(),
            shipment_date: NaiveDate::from_ymd_opt(2022, 11, 7).unwrap(),
            consignee: "ООО Ромашка".to_string(),
            delivery_address: "г. Москва".to_string(),
            equipment: "Стандарт".to_string(),
            client: Some(AccountReference {
                id: 3,
                name: "Клиент".to_string(),
            }),
            service_organization: None,
        }
    }

    #[test]
    fn test_public_view_hides_private_fields() {
        let json = serde_json::to_value(MachineView::for_caller(machine(), false)).unwrap();
        assert_eq!(json["serial_number"], "0017");
        assert_eq!(json["technique_model"], "ПД1,5");
        assert_eq!(json["steer_axle_serial"], "20R0067");
        for hidden in ["supply_contract", "shipment_date", "consignee", "client", "equipment"] {
            assert!(json.get(hidden).is_none(), "{} leaked", hidden);
        }
    }

    #[test]
    fn test_detailed_view() {
        let json = serde_json::to_value(MachineView::for_caller(machine(), true)).unwrap();
        assert_eq!(json["technique_model"]["name"], "ПД1,5");
        assert_eq!(json["technique_model"]["description"], "ПД1,5 description");
        assert_eq!(json["shipment_date"], "2022-11-07");
        assert_eq!(json["client"]["name"], "Клиент");
        assert!(json["service_organization"].is_null());
    }

    #[test]
    fn test_payload_validation() {
        let payload: MachinePayload = serde_json::from_value(serde_json::json!({
            "serial_number": " 0017 ",
            "technique_model_id": 1,
            "engine_model_id": 2,
            "engine_serial": "7U5042",
            "transmission_model_id": 3,
            "transmission_serial": "20R0050",
            "drive_axle_model_id": 4,
            "drive_axle_serial": "20R0071",
            "steer_axle_model_id": 5,
            "steer_axle_serial": "20R0067",
            "shipment_date": "2022-11-07",
            "client_id": 3,
            "service_organization_id": null
        }))
        .unwrap();

        let valid = payload.validated().unwrap();
        assert_eq!(valid.serial_number, "0017");
        assert_eq!(valid.consignee, "");
        assert_eq!(valid.client_id, Some(3));

        let blank = MachinePayload {
            engine_serial: "  ".to_string(),
            ..payload
        };
        assert_eq!(
            blank.validated().unwrap_err(),
            "engine_serial must not be empty"
        );
    }
}
