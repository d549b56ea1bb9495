//! The resolved caller of a request

use permissions::{Capability, PermissionResolver, PermissionSet, Principal, RoleSet};

use crate::{
    error::{ApiError, ApiResult},
    scope::Scope,
};

/// Principal plus everything derived from it, computed once per request
#[derive(Debug, Clone)]
pub struct Caller {
    pub principal: Principal,
    pub permissions: PermissionSet,
    pub roles: RoleSet,
}

impl Caller {
    pub fn new(principal: Principal, resolver: &PermissionResolver) -> Self {
        Self {
            permissions: resolver.resolve(&principal),
            roles: resolver.roles(&principal),
            principal,
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        self.principal.user_id()
    }

    /// 401 for anonymous callers, 403 for authenticated ones lacking `capability`
    pub fn require(&self, capability: Capability) -> ApiResult<()> {
        if self.permissions.allows(capability) {
            Ok(())
        } else if !self.permissions.is_authenticated {
            Err(ApiError::Unauthorized)
        } else {
            Err(ApiError::Forbidden(
                "You do not have permission to perform this action".to_string(),
            ))
        }
    }

    pub fn machine_scope(&self) -> Scope {
        Scope::for_machines(&self.principal, self.roles)
    }

    pub fn record_scope(&self) -> Scope {
        Scope::for_records(&self.principal, self.roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permissions::{Role, User};

    fn caller(role: Option<Role>) -> Caller {
        let principal = Principal::Authenticated(User {
            id: 5,
            username: "u".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            role,
            groups: vec![],
        });
        Caller::new(principal, &PermissionResolver::default())
    }

    #[test]
    fn test_anonymous_gets_401() {
        let caller = Caller::new(Principal::Anonymous, &PermissionResolver::default());
        assert!(caller.require(Capability::ViewMachines).is_ok());
        assert!(matches!(
            caller.require(Capability::ViewMaintenance),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn test_client_gets_403_for_complaints() {
        let caller = caller(Some(Role::Client));
        assert!(caller.require(Capability::CreateMaintenance).is_ok());
        assert!(matches!(
            caller.require(Capability::CreateComplaint),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn test_scopes_follow_roles() {
        assert_eq!(caller(Some(Role::Manager)).record_scope(), Scope::All);
        assert_eq!(
            caller(Some(Role::Client)).machine_scope(),
            Scope::Owned {
                user_id: 5,
                as_client: true,
                as_service: false
            }
        );
    }
}
