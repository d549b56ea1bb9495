//! Role resolution and capability flags for the Silant console
//!
//! This crate is deliberately free of I/O. Services load a [`User`] from
//! storage, wrap it in a [`Principal`] and ask a [`PermissionResolver`] which
//! actions to expose.
//!
//! ```rust
//! use permissions::{PermissionResolver, Principal, Role, User};
//!
//! let resolver = PermissionResolver::default();
//! let client = Principal::Authenticated(User {
//!     id: 1,
//!     username: "client1".to_string(),
//!     first_name: String::new(),
//!     last_name: String::new(),
//!     email: String::new(),
//!     role: Some(Role::Client),
//!     groups: vec![],
//! });
//!
//! let perms = resolver.resolve(&client);
//! assert!(perms.can_create_maintenance);
//! assert!(!perms.can_create_complaint);
//! ```

pub mod principal;
pub mod resolver;
pub mod role;

pub use principal::{Principal, User};
pub use resolver::{Capability, PermissionResolver, PermissionSet};
pub use role::{GroupLabels, Role, RoleSet, UnknownRole, role_display_name};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_scenario() {
        let principal = Principal::Authenticated(User {
            id: 3,
            username: "client".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            role: Some(Role::Client),
            groups: vec![],
        });
        let perms = PermissionResolver::default().resolve(&principal);
        assert!(perms.is_client);
        assert!(!perms.is_manager);
        assert!(!perms.is_service_company);
        assert!(perms.can_create_maintenance);
        assert!(!perms.can_create_complaint);
        assert!(!perms.can_create_machine);
    }

    #[test]
    fn test_anonymous_scenario() {
        let perms = PermissionResolver::default().resolve(&Principal::Anonymous);
        assert!(perms.can_view_machines);
        assert!(!perms.can_view_maintenance);
        assert!(!perms.is_authenticated);
    }

    #[test]
    fn test_legacy_manager_group_scenario() {
        let principal = Principal::Authenticated(User {
            id: 4,
            username: "legacy".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            role: Role::parse_optional(Some("")),
            groups: vec!["Менеджеры".to_string()],
        });
        let perms = PermissionResolver::default().resolve(&principal);
        assert!(perms.is_manager);
        assert!(perms.can_manage_directories);
    }
}
