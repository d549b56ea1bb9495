//! Repositories for database operations

use sqlx::{Row, postgres::PgRow};

use crate::models::{AccountReference, Reference, machine::MachineSummary};

pub mod complaint;
pub mod directory;
pub mod machine;
pub mod maintenance;

pub use complaint::ComplaintRepository;
pub use directory::DirectoryRepository;
pub use machine::MachineRepository;
pub use maintenance::MaintenanceRepository;

/// Directory entry selected as `<prefix>_id`, `<prefix>_name`, `<prefix>_description`
fn reference(row: &PgRow, prefix: &str) -> Reference {
    Reference {
        id: row.get(format!("{}_id", prefix).as_str()),
        name: row.get(format!("{}_name", prefix).as_str()),
        description: row.get(format!("{}_description", prefix).as_str()),
    }
}

/// Same as [`reference`] for a nullable foreign key
fn optional_reference(row: &PgRow, prefix: &str) -> Option<Reference> {
    let id: Option<i64> = row.get(format!("{}_id", prefix).as_str());
    id.map(|_| reference(row, prefix))
}

/// Account selected as `<prefix>_id`, `<prefix>_name`
fn account_reference(row: &PgRow, prefix: &str) -> Option<AccountReference> {
    let id: Option<i64> = row.get(format!("{}_id", prefix).as_str());
    id.map(|id| AccountReference {
        id,
        name: row.get(format!("{}_name", prefix).as_str()),
    })
}

/// Machine selected as `machine_id`, `machine_serial`, `machine_model`
fn machine_summary(row: &PgRow) -> MachineSummary {
    MachineSummary {
        id: row.get("machine_id"),
        serial_number: row.get("machine_serial"),
        model: row.get("machine_model"),
    }
}
