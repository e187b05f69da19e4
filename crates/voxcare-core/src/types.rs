//! Shared value types: portal roles and the role-scoped route table.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Role
// =============================================================================

/// Portal role of the current user. Supplied by the caller, never derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Patient,
    Provider,
    Admin,
    Owner,
}

impl Role {
    /// Every role, in the order the navigation fallback sweep visits them.
    pub const ALL: [Role; 4] = [Role::Patient, Role::Provider, Role::Admin, Role::Owner];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Patient => write!(f, "patient"),
            Role::Provider => write!(f, "provider"),
            Role::Admin => write!(f, "admin"),
            Role::Owner => write!(f, "owner"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patient" => Ok(Role::Patient),
            "provider" => Ok(Role::Provider),
            "admin" => Ok(Role::Admin),
            "owner" => Ok(Role::Owner),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

// =============================================================================
// RouteTable
// =============================================================================

/// Per-role mapping from a short spoken keyword to a portal route path.
///
/// Static configuration: read-only once handed to the interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteTable {
    pub patient: BTreeMap<String, String>,
    pub provider: BTreeMap<String, String>,
    pub admin: BTreeMap<String, String>,
    pub owner: BTreeMap<String, String>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::portal_default()
    }
}

impl RouteTable {
    /// An empty table with no routes for any role.
    pub fn empty() -> Self {
        Self {
            patient: BTreeMap::new(),
            provider: BTreeMap::new(),
            admin: BTreeMap::new(),
            owner: BTreeMap::new(),
        }
    }

    /// The compiled-in portal route table.
    pub fn portal_default() -> Self {
        let mut table = Self::empty();
        let sections: [(Role, &[&str]); 4] = [
            (
                Role::Patient,
                &[
                    "appointments",
                    "medications",
                    "labs",
                    "documents",
                    "billing",
                    "messages",
                    "profile",
                ],
            ),
            (
                Role::Provider,
                &[
                    "schedule",
                    "patients",
                    "appointments",
                    "prescriptions",
                    "messages",
                ],
            ),
            (
                Role::Admin,
                &["invoices", "billing", "audit", "users", "reports", "backups"],
            ),
            (
                Role::Owner,
                &["launchboard", "branding", "employers", "backups", "analytics"],
            ),
        ];

        for (role, keywords) in sections {
            for keyword in keywords {
                table.insert(role, keyword, &format!("/{}/{}", role, keyword));
            }
            table.insert(role, "dashboard", &format!("/{}", role));
        }
        table
    }

    /// Add or replace a single route.
    pub fn insert(&mut self, role: Role, keyword: &str, path: &str) {
        self.for_role_mut(role)
            .insert(keyword.to_lowercase(), path.to_string());
    }

    /// Lowercase every keyword, as [`insert`](Self::insert) does. Needed for
    /// tables that arrive through deserialization.
    pub fn normalize_keys(&mut self) {
        for role in Role::ALL {
            let table = self.for_role_mut(role);
            *table = std::mem::take(table)
                .into_iter()
                .map(|(keyword, path)| (keyword.to_lowercase(), path))
                .collect();
        }
    }

    /// The keyword table for one role.
    pub fn for_role(&self, role: Role) -> &BTreeMap<String, String> {
        match role {
            Role::Patient => &self.patient,
            Role::Provider => &self.provider,
            Role::Admin => &self.admin,
            Role::Owner => &self.owner,
        }
    }

    fn for_role_mut(&mut self, role: Role) -> &mut BTreeMap<String, String> {
        match role {
            Role::Patient => &mut self.patient,
            Role::Provider => &mut self.provider,
            Role::Admin => &mut self.admin,
            Role::Owner => &mut self.owner,
        }
    }

    /// Look up a keyword within a single role's table.
    pub fn lookup(&self, role: Role, keyword: &str) -> Option<&str> {
        self.for_role(role)
            .get(&keyword.to_lowercase())
            .map(String::as_str)
    }

    /// Look up a keyword in `role` first, then in every role in sweep order.
    pub fn lookup_any(&self, role: Role, keyword: &str) -> Option<(Role, &str)> {
        if let Some(path) = self.lookup(role, keyword) {
            return Some((role, path));
        }
        Role::ALL
            .iter()
            .find_map(|r| self.lookup(*r, keyword).map(|p| (*r, p)))
    }

    /// Iterate every `(role, keyword, path)` triple.
    pub fn entries(&self) -> impl Iterator<Item = (Role, &str, &str)> {
        Role::ALL.into_iter().flat_map(move |role| {
            self.for_role(role)
                .iter()
                .map(move |(k, p)| (role, k.as_str(), p.as_str()))
        })
    }

    pub fn is_empty(&self) -> bool {
        Role::ALL.iter().all(|r| self.for_role(*r).is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display_and_parse() {
        for role in Role::ALL {
            let parsed: Role = role.to_string().parse().unwrap();
            assert_eq!(parsed, role);
        }
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("janitor".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_snake_case() {
        let json = serde_json::to_string(&Role::Provider).unwrap();
        assert_eq!(json, "\"provider\"");
    }

    #[test]
    fn test_portal_default_paths() {
        let table = RouteTable::portal_default();
        assert_eq!(table.lookup(Role::Patient, "labs"), Some("/patient/labs"));
        assert_eq!(table.lookup(Role::Admin, "invoices"), Some("/admin/invoices"));
        assert_eq!(table.lookup(Role::Owner, "dashboard"), Some("/owner"));
        assert_eq!(table.lookup(Role::Patient, "invoices"), None);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = RouteTable::portal_default();
        assert_eq!(table.lookup(Role::Patient, "LABS"), Some("/patient/labs"));
    }

    #[test]
    fn test_lookup_any_prefers_requested_role() {
        let table = RouteTable::portal_default();
        // "appointments" exists for both patient and provider
        let (role, path) = table.lookup_any(Role::Provider, "appointments").unwrap();
        assert_eq!(role, Role::Provider);
        assert_eq!(path, "/provider/appointments");
    }

    #[test]
    fn test_lookup_any_sweeps_other_roles() {
        let table = RouteTable::portal_default();
        let (role, path) = table.lookup_any(Role::Patient, "branding").unwrap();
        assert_eq!(role, Role::Owner);
        assert_eq!(path, "/owner/branding");
        assert!(table.lookup_any(Role::Patient, "spaceship").is_none());
    }

    #[test]
    fn test_normalize_keys() {
        let mut table = RouteTable::empty();
        table.patient.insert("Labs".to_string(), "/p/labs".to_string());
        assert_eq!(table.lookup(Role::Patient, "labs"), None);

        table.normalize_keys();
        assert_eq!(table.lookup(Role::Patient, "labs"), Some("/p/labs"));
        assert_eq!(table.lookup(Role::Patient, "LABS"), Some("/p/labs"));
    }

    #[test]
    fn test_insert_overrides() {
        let mut table = RouteTable::empty();
        assert!(table.is_empty());
        table.insert(Role::Patient, "Labs", "/p/labs");
        table.insert(Role::Patient, "labs", "/p/lab-results");
        assert_eq!(table.lookup(Role::Patient, "labs"), Some("/p/lab-results"));
        assert_eq!(table.entries().count(), 1);
    }
}
