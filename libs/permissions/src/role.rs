//! User roles and the legacy group-label bridge
//!
//! Newer accounts carry an explicit role; older ones only carry group names
//! such as `Менеджеры`. Both signals are folded into a [`RoleSet`] here so the
//! resolver never has to look at raw strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of account roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Client,
    /// Service organization
    Service,
}

/// Returned when a stored role string is not one of the known roles
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0:?}")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 3] = [Role::Manager, Role::Client, Role::Service];

    /// Wire name, as stored in the `users.role` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Client => "client",
            Role::Service => "service",
        }
    }

    /// Human readable label shown in the console
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Manager => "Менеджер",
            Role::Client => "Клиент",
            Role::Service => "Сервисная организация",
        }
    }

    /// Lenient parse used for stored values: empty or unknown strings mean no role.
    pub fn parse_optional(value: Option<&str>) -> Option<Role> {
        value.and_then(|v| v.trim().parse().ok())
    }
}

/// Display name for an optional role, falling back to a generic label
pub fn role_display_name(role: Option<Role>) -> &'static str {
    role.map(|r| r.display_name()).unwrap_or("Пользователь")
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manager" => Ok(Role::Manager),
            "client" => Ok(Role::Client),
            "service" => Ok(Role::Service),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Group names that imply a role for accounts without an explicit one.
///
/// The labels are presentation strings, so they are loaded from
/// configuration rather than hard-wired; [`Default`] carries the labels used
/// by existing deployments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupLabels {
    pub manager: String,
    pub client: String,
    pub service: String,
}

impl Default for GroupLabels {
    fn default() -> Self {
        Self {
            manager: "Менеджеры".to_string(),
            client: "Клиенты".to_string(),
            service: "Сервисные организации".to_string(),
        }
    }
}

impl GroupLabels {
    /// Group label mapped to a role
    pub fn label_for(&self, role: Role) -> &str {
        match role {
            Role::Manager => &self.manager,
            Role::Client => &self.client,
            Role::Service => &self.service,
        }
    }

    /// Role implied by a group name, if any. Matching is exact.
    pub fn role_for(&self, group: &str) -> Option<Role> {
        Role::ALL
            .into_iter()
            .find(|role| self.label_for(*role) == group)
    }
}

/// Resolved role predicates of a single account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RoleSet {
    pub manager: bool,
    pub client: bool,
    pub service: bool,
}

impl RoleSet {
    /// Union of the explicit role and every role implied by the group names.
    ///
    /// A predicate set by either source stays set.
    pub fn resolve<S: AsRef<str>>(role: Option<Role>, groups: &[S], labels: &GroupLabels) -> Self {
        let mut set = RoleSet::default();
        if let Some(role) = role {
            set.insert(role);
        }
        for group in groups {
            if let Some(role) = labels.role_for(group.as_ref()) {
                set.insert(role);
            }
        }
        set
    }

    pub fn insert(&mut self, role: Role) {
        match role {
            Role::Manager => self.manager = true,
            Role::Client => self.client = true,
            Role::Service => self.service = true,
        }
    }

    pub fn contains(&self, role: Role) -> bool {
        match role {
            Role::Manager => self.manager,
            Role::Client => self.client,
            Role::Service => self.service,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.manager || self.client || self.service)
    }

    /// Most privileged role held, manager > service > client
    pub fn primary(&self) -> Option<Role> {
        [Role::Manager, Role::Service, Role::Client]
            .into_iter()
            .find(|role| self.contains(*role))
    }
}
