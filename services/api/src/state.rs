//! Application state shared across handlers

use common::principal::PrincipalResolver;
use permissions::PermissionResolver;

use crate::repositories::{
    ComplaintRepository, DirectoryRepository, MachineRepository, MaintenanceRepository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub principals: PrincipalResolver,
    pub permissions: PermissionResolver,
    pub machine_repository: MachineRepository,
    pub maintenance_repository: MaintenanceRepository,
    pub complaint_repository: ComplaintRepository,
    pub directory_repository: DirectoryRepository,
    pub cookie_name: String,
}
