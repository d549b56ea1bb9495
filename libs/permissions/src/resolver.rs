//! Capability flags derived from a principal
//!
//! [`PermissionSet::resolve`] is a pure function of the principal and the
//! group-label table. It performs no I/O and cannot fail: missing users,
//! roles or groups all fall back to the anonymous defaults.
//!
//! These flags gate what the console offers. Ownership of individual records
//! is enforced by the record services, not here.

use serde::Serialize;

use crate::principal::Principal;
use crate::role::{GroupLabels, RoleSet};

/// A single gated action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ViewMachines,
    ViewMaintenance,
    ViewComplaints,
    ViewDirectories,
    CreateMachine,
    CreateMaintenance,
    CreateComplaint,
    EditMachine,
    EditMaintenance,
    EditComplaint,
    ManageDirectories,
}

/// Capability flags and role predicates for one principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSet {
    pub can_view_machines: bool,
    pub can_view_maintenance: bool,
    pub can_view_complaints: bool,
    pub can_view_directories: bool,

    pub can_create_machine: bool,
    pub can_create_maintenance: bool,
    pub can_create_complaint: bool,

    pub can_edit_machine: bool,
    pub can_edit_maintenance: bool,
    pub can_edit_complaint: bool,

    pub can_manage_directories: bool,

    pub is_manager: bool,
    pub is_client: bool,
    pub is_service_company: bool,
    pub is_authenticated: bool,
}

impl PermissionSet {
    /// Flags for a caller without a session: the equipment list only
    pub fn anonymous() -> Self {
        Self {
            can_view_machines: true,
            ..Self::default()
        }
    }

    /// Flags for an authenticated caller holding `roles`
    pub fn for_roles(roles: RoleSet) -> Self {
        let manager = roles.manager;
        let client = roles.client;
        let service = roles.service;

        Self {
            can_view_machines: true,
            can_view_maintenance: true,
            can_view_complaints: true,
            can_view_directories: manager,

            can_create_machine: manager,
            can_create_maintenance: client || service || manager,
            can_create_complaint: service || manager,

            can_edit_machine: manager,
            can_edit_maintenance: client || service || manager,
            can_edit_complaint: service || manager,

            can_manage_directories: manager,

            is_manager: manager,
            is_client: client,
            is_service_company: service,
            is_authenticated: true,
        }
    }

    pub fn resolve(principal: &Principal, labels: &GroupLabels) -> Self {
        match principal {
            Principal::Anonymous => Self::anonymous(),
            Principal::Authenticated(user) => Self::for_roles(user.roles(labels)),
        }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::ViewMachines => self.can_view_machines,
            Capability::ViewMaintenance => self.can_view_maintenance,
            Capability::ViewComplaints => self.can_view_complaints,
            Capability::ViewDirectories => self.can_view_directories,
            Capability::CreateMachine => self.can_create_machine,
            Capability::CreateMaintenance => self.can_create_maintenance,
            Capability::CreateComplaint => self.can_create_complaint,
            Capability::EditMachine => self.can_edit_machine,
            Capability::EditMaintenance => self.can_edit_maintenance,
            Capability::EditComplaint => self.can_edit_complaint,
            Capability::ManageDirectories => self.can_manage_directories,
        }
    }

    // Per-record checks. Ownership is not modelled here, so any authenticated
    // caller passes; the record services filter by owner.

    pub fn can_access_machine(&self, _machine_id: i64) -> bool {
        self.is_authenticated
    }

    pub fn can_access_maintenance(&self, _maintenance_id: i64) -> bool {
        self.is_authenticated
    }

    pub fn can_access_complaint(&self, _complaint_id: i64) -> bool {
        self.is_authenticated
    }
}

/// Resolver bound to a configured group-label table
#[derive(Debug, Clone, Default)]
pub struct PermissionResolver {
    labels: GroupLabels,
}

impl PermissionResolver {
    pub fn new(labels: GroupLabels) -> Self {
        Self { labels }
    }

    pub fn labels(&self) -> &GroupLabels {
        &self.labels
    }

    pub fn resolve(&self, principal: &Principal) -> PermissionSet {
        PermissionSet::resolve(principal, &self.labels)
    }

    pub fn roles(&self, principal: &Principal) -> RoleSet {
        principal.roles(&self.labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::principal::User;
    use crate::role::Role;

    fn user(role: Option<Role>, groups: &[&str]) -> Principal {
        Principal::Authenticated(User {
            id: 1,
            username: "user".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            role,
            groups: groups.iter().map(|g| g.to_string()).collect(),
        })
    }

    fn resolve(principal: &Principal) -> PermissionSet {
        PermissionResolver::default().resolve(principal)
    }

    #[test]
    fn test_anonymous_defaults() {
        let perms = resolve(&Principal::Anonymous);
        assert_eq!(
            perms,
            PermissionSet {
                can_view_machines: true,
                ..PermissionSet::default()
            }
        );
        assert!(!perms.can_view_maintenance);
        assert!(!perms.can_view_complaints);
        assert!(!perms.is_authenticated);
        assert!(!perms.can_access_machine(1));
    }

    #[test]
    fn test_manager_by_role() {
        let perms = resolve(&user(Some(Role::Manager), &[]));
        assert!(perms.is_manager);
        assert!(perms.can_create_machine);
        assert!(perms.can_edit_machine);
        assert!(perms.can_manage_directories);
        assert!(perms.can_view_directories);
        assert!(perms.can_create_maintenance);
        assert!(perms.can_create_complaint);
    }

    #[test]
    fn test_manager_by_group_without_role() {
        let perms = resolve(&user(None, &["Менеджеры"]));
        assert!(perms.is_manager);
        assert!(perms.can_manage_directories);
        assert!(perms.can_create_machine);
    }

    #[test]
    fn test_client_role() {
        let perms = resolve(&user(Some(Role::Client), &[]));
        assert!(perms.is_client);
        assert!(!perms.is_manager);
        assert!(!perms.is_service_company);
        assert!(perms.can_create_maintenance);
        assert!(perms.can_edit_maintenance);
        assert!(!perms.can_create_complaint);
        assert!(!perms.can_edit_complaint);
        assert!(!perms.can_create_machine);
        assert!(!perms.can_view_directories);
        assert!(perms.can_view_complaints);
    }

    #[test]
    fn test_client_by_group() {
        let perms = resolve(&user(None, &["Клиенты"]));
        assert!(perms.is_client);
        assert!(perms.can_create_maintenance);
        assert!(!perms.can_create_complaint);
    }

    #[test]
    fn test_client_with_service_group_can_file_complaints() {
        let perms = resolve(&user(Some(Role::Client), &["Сервисные организации"]));
        assert!(perms.is_client);
        assert!(perms.is_service_company);
        assert!(perms.can_create_complaint);
    }

    #[test]
    fn test_service_role() {
        let perms = resolve(&user(Some(Role::Service), &[]));
        assert!(perms.is_service_company);
        assert!(perms.can_create_complaint);
        assert!(perms.can_create_maintenance);
        assert!(!perms.can_create_machine);
        assert!(!perms.can_manage_directories);
    }

    #[test]
    fn test_group_signal_never_overrides_role() {
        let perms = resolve(&user(Some(Role::Manager), &["Клиенты"]));
        assert!(perms.is_manager);
        assert!(perms.is_client);
    }

    #[test]
    fn test_authenticated_without_role() {
        let perms = resolve(&user(None, &["Прочие"]));
        assert!(perms.is_authenticated);
        assert!(perms.can_view_machines);
        assert!(perms.can_view_maintenance);
        assert!(perms.can_view_complaints);
        assert!(!perms.can_create_maintenance);
        assert!(!perms.can_create_complaint);
        assert!(!perms.is_manager && !perms.is_client && !perms.is_service_company);
        assert!(perms.can_access_maintenance(42));
        assert!(perms.can_access_complaint(42));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let principal = user(Some(Role::Client), &["Менеджеры", "Клиенты"]);
        assert_eq!(resolve(&principal), resolve(&principal));
    }

    #[test]
    fn test_custom_labels_are_honoured() {
        let resolver = PermissionResolver::new(GroupLabels {
            manager: "Managers".to_string(),
            ..GroupLabels::default()
        });
        assert!(resolver.resolve(&user(None, &["Managers"])).is_manager);
        assert!(!resolver.resolve(&user(None, &["Менеджеры"])).is_manager);
    }

    #[test]
    fn test_allows_matches_flags() {
        let perms = resolve(&user(Some(Role::Service), &[]));
        assert!(perms.allows(Capability::CreateComplaint));
        assert!(perms.allows(Capability::EditMaintenance));
        assert!(!perms.allows(Capability::EditMachine));
        assert!(!perms.allows(Capability::ViewDirectories));
    }

    #[test]
    fn test_serializes_with_camel_case_names() {
        let value = serde_json::to_value(PermissionSet::anonymous()).unwrap();
        assert_eq!(value["canViewMachines"], true);
        assert_eq!(value["canViewMaintenance"], false);
        assert_eq!(value["isServiceCompany"], false);
        assert_eq!(value["isAuthenticated"], false);
    }
}
