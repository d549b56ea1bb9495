//! Directory (lookup table) models

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::required;

/// The lookup tables records refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectoryKind {
    TechniqueModel,
    EngineModel,
    TransmissionModel,
    DriveAxleModel,
    SteerAxleModel,
    MaintenanceType,
    FailureNode,
    RecoveryMethod,
    ServiceCompany,
}

/// Path segment that names no directory
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown directory: {0:?}")]
pub struct UnknownDirectory(pub String);

impl DirectoryKind {
    pub const ALL: [DirectoryKind; 9] = [
        DirectoryKind::TechniqueModel,
        DirectoryKind::EngineModel,
        DirectoryKind::TransmissionModel,
        DirectoryKind::DriveAxleModel,
        DirectoryKind::SteerAxleModel,
        DirectoryKind::MaintenanceType,
        DirectoryKind::FailureNode,
        DirectoryKind::RecoveryMethod,
        DirectoryKind::ServiceCompany,
    ];

    /// URL path segment
    pub fn slug(self) -> &'static str {
        match self {
            DirectoryKind::TechniqueModel => "technique-models",
            DirectoryKind::EngineModel => "engine-models",
            DirectoryKind::TransmissionModel => "transmission-models",
            DirectoryKind::DriveAxleModel => "drive-axle-models",
            DirectoryKind::SteerAxleModel => "steer-axle-models",
            DirectoryKind::MaintenanceType => "maintenance-types",
            DirectoryKind::FailureNode => "failure-nodes",
            DirectoryKind::RecoveryMethod => "recovery-methods",
            DirectoryKind::ServiceCompany => "service-companies",
        }
    }

    /// Backing table. Only ever one of these fixed names is spliced into SQL.
    pub fn table(self) -> &'static str {
        match self {
            DirectoryKind::TechniqueModel => "technique_models",
            DirectoryKind::EngineModel => "engine_models",
            DirectoryKind::TransmissionModel => "transmission_models",
            DirectoryKind::DriveAxleModel => "drive_axle_models",
            DirectoryKind::SteerAxleModel => "steer_axle_models",
            DirectoryKind::MaintenanceType => "maintenance_types",
            DirectoryKind::FailureNode => "failure_nodes",
            DirectoryKind::RecoveryMethod => "recovery_methods",
            DirectoryKind::ServiceCompany => "service_companies",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DirectoryKind::TechniqueModel => "Модель техники",
            DirectoryKind::EngineModel => "Модель двигателя",
            DirectoryKind::TransmissionModel => "Модель трансмиссии",
            DirectoryKind::DriveAxleModel => "Модель ведущего моста",
            DirectoryKind::SteerAxleModel => "Модель управляемого моста",
            DirectoryKind::MaintenanceType => "Вид ТО",
            DirectoryKind::FailureNode => "Узел отказа",
            DirectoryKind::RecoveryMethod => "Способ восстановления",
            DirectoryKind::ServiceCompany => "Сервисная компания",
        }
    }
}

impl FromStr for DirectoryKind {
    type Err = UnknownDirectory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DirectoryKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| UnknownDirectory(s.to_string()))
    }
}

impl fmt::Display for DirectoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Entry of `GET /directories`
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryInfo {
    pub kind: &'static str,
    pub label: &'static str,
}

impl From<DirectoryKind> for DirectoryInfo {
    fn from(kind: DirectoryKind) -> Self {
        Self {
            kind: kind.slug(),
            label: kind.label(),
        }
    }
}

/// A row of any directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// Body of directory create and update requests
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryPayload {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl DirectoryPayload {
    /// Trimmed copy, or the validation message
    pub fn validated(&self) -> Result<DirectoryPayload, String> {
        Ok(DirectoryPayload {
            name: required(&self.name, "name")?,
            description: self.description.trim().to_string(),
        })
    }
}

/// Query parameters for directory listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugs_parse_back() {
        for kind in DirectoryKind::ALL {
            assert_eq!(kind.slug().parse::<DirectoryKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_slug() {
        let err = "users".parse::<DirectoryKind>().unwrap_err();
        assert_eq!(err, UnknownDirectory("users".to_string()));
        assert!("technique_models".parse::<DirectoryKind>().is_err());
    }

    #[test]
    fn test_tables_are_distinct() {
        let mut tables: Vec<_> = DirectoryKind::ALL.iter().map(|k| k.table()).collect();
        tables.sort();
        tables.dedup();
        assert_eq!(tables.len(), DirectoryKind::ALL.len());
    }

    #[test]
    fn test_payload_validation() {
        let payload = DirectoryPayload {
            name: "  ДВС  ".to_string(),
            description: " d ".to_string(),
        };
        let valid = payload.validated().unwrap();
        assert_eq!(valid.name, "ДВС");
        assert_eq!(valid.description, "d");

        let blank = DirectoryPayload {
            name: " ".to_string(),
            description: String::new(),
        };
        assert!(blank.validated().is_err());
    }

    #[test]
    fn test_payload_description_defaults() {
        let payload: DirectoryPayload = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert_eq!(payload.description, "");
    }
}
