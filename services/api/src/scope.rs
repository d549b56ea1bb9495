//! Record ownership scopes
//!
//! Capability flags decide whether a caller may list or change a kind of
//! record at all. The scope decides which rows: managers see everything,
//! clients the machines they own, service organizations the machines they
//! service, and the records hanging off those machines.

use permissions::{Principal, RoleSet};
use sqlx::{Postgres, QueryBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every row
    All,
    /// Rows whose machine is owned or serviced by `user_id`
    Owned {
        user_id: i64,
        as_client: bool,
        as_service: bool,
    },
    /// No rows
    Nothing,
}

impl Scope {
    fn owned(principal: &Principal, roles: RoleSet) -> Option<Self> {
        let user_id = principal.user_id()?;
        if roles.manager {
            return Some(Scope::All);
        }
        if roles.client || roles.service {
            return Some(Scope::Owned {
                user_id,
                as_client: roles.client,
                as_service: roles.service,
            });
        }
        None
    }

    /// Scope for the machine list. The public list is unrestricted, and so
    /// is the list for accounts without a role.
    pub fn for_machines(principal: &Principal, roles: RoleSet) -> Self {
        Self::owned(principal, roles).unwrap_or(Scope::All)
    }

    /// Scope for maintenance and complaint records
    pub fn for_records(principal: &Principal, roles: RoleSet) -> Self {
        Self::owned(principal, roles).unwrap_or(Scope::Nothing)
    }

    /// Whether a machine with the given owners falls inside the scope
    pub fn permits(&self, client_id: Option<i64>, service_organization_id: Option<i64>) -> bool {
        match *self {
            Scope::All => true,
            Scope::Nothing => false,
            Scope::Owned {
                user_id,
                as_client,
                as_service,
            } => {
                (as_client && client_id == Some(user_id))
                    || (as_service && service_organization_id == Some(user_id))
            }
        }
    }

    /// Append ` AND <predicate>` restricting the machine columns given
    pub fn push_filter(
        &self,
        qb: &mut QueryBuilder<'_, Postgres>,
        client_column: &str,
        service_column: &str,
    ) {
        match *self {
            Scope::All => {}
            Scope::Nothing => {
                qb.push(" AND FALSE");
            }
            Scope::Owned {
                user_id,
                as_client,
                as_service,
            } => {
                qb.push(" AND (FALSE");
                if as_client {
                    qb.push(" OR ")
                        .push(client_column)
                        .push(" = ")
                        .push_bind(user_id);
                }
                if as_service {
                    qb.push(" OR ")
                        .push(service_column)
                        .push(" = ")
                        .push_bind(user_id);
                }
                qb.push(")");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permissions::{GroupLabels, Role, User};

    fn principal(role: Option<Role>, groups: &[&str]) -> (Principal, RoleSet) {
        let principal = Principal::Authenticated(User {
            id: 10,
            username: "u".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            role,
            groups: groups.iter().map(|g| g.to_string()).collect(),
        });
        let roles = principal.roles(&GroupLabels::default());
        (principal, roles)
    }

    #[test]
    fn test_anonymous_scopes() {
        let roles = RoleSet::default();
        assert_eq!(Scope::for_machines(&Principal::Anonymous, roles), Scope::All);
        assert_eq!(
            Scope::for_records(&Principal::Anonymous, roles),
            Scope::Nothing
        );
    }

    #[test]
    fn test_manager_sees_everything() {
        let (p, roles) = principal(Some(Role::Manager), &[]);
        assert_eq!(Scope::for_records(&p, roles), Scope::All);
        assert!(Scope::for_records(&p, roles).permits(None, None));
    }

    #[test]
    fn test_client_scope() {
        let (p, roles) = principal(Some(Role::Client), &[]);
        let scope = Scope::for_records(&p, roles);
        assert!(scope.permits(Some(10), None));
        assert!(!scope.permits(Some(11), Some(10)));
    }

    #[test]
    fn test_client_and_service_by_group() {
        let (p, roles) = principal(Some(Role::Client), &["Сервисные организации"]);
        let scope = Scope::for_records(&p, roles);
        assert!(scope.permits(Some(10), None));
        assert!(scope.permits(None, Some(10)));
        assert!(!scope.permits(Some(1), Some(2)));
    }

    #[test]
    fn test_roleless_user() {
        let (p, roles) = principal(None, &[]);
        assert_eq!(Scope::for_machines(&p, roles), Scope::All);
        assert_eq!(Scope::for_records(&p, roles), Scope::Nothing);
    }

    #[test]
    fn test_push_filter_sql() {
        let (p, roles) = principal(Some(Role::Service), &[]);
        let scope = Scope::for_records(&p, roles);

        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM machines m WHERE TRUE");
        scope.push_filter(&mut qb, "m.client_id", "m.service_organization_id");
        assert_eq!(
            qb.sql(),
            "SELECT 1 FROM machines m WHERE TRUE AND (FALSE OR m.service_organization_id = $1)"
        );

        let mut qb = QueryBuilder::<Postgres>::new("WHERE TRUE");
        Scope::Nothing.push_filter(&mut qb, "c", "s");
        assert_eq!(qb.sql(), "WHERE TRUE AND FALSE");
    }
}
