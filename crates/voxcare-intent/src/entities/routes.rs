//! Spoken keyword to portal route resolution.

use serde::{Deserialize, Serialize};
use voxcare_core::{Role, RouteTable};

use super::{contains_any, word_position};

/// A resolved navigation target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMatch {
    /// Role whose table supplied the route (may differ from the caller's role
    /// when the fallback sweep found it).
    pub role: Role,
    /// Table keyword, e.g. `"invoices"`.
    pub keyword: String,
    /// Route path, e.g. `"/admin/invoices"`.
    pub path: String,
    /// Byte offset of the matched word in the lowercased utterance.
    pub position: usize,
    /// Length of the matched word (the singular form when that is what was said).
    pub len: usize,
}

/// Guess a role from the words of an utterance when the caller did not supply one.
///
/// Checked in order: admin words, then owner words, then provider words.
/// Defaults to [`Role::Patient`].
pub fn infer_role(text: &str) -> Role {
    let lower = text.to_lowercase();
    if contains_any(&lower, &["admin", "audit"]) {
        Role::Admin
    } else if contains_any(&lower, &["employer", "employers", "owner", "branding"]) {
        Role::Owner
    } else if contains_any(&lower, &["provider", "providers", "schedule"]) {
        Role::Provider
    } else {
        Role::Patient
    }
}

fn singular(keyword: &str) -> Option<&str> {
    if keyword.len() > 3 && keyword.ends_with('s') && !keyword.ends_with("ss") {
        Some(&keyword[..keyword.len() - 1])
    } else {
        None
    }
}

/// Earliest keyword mention within one role's table.
///
/// Ties at the same offset go to the longer keyword.
fn best_in_role(lower: &str, role: Role, table: &RouteTable) -> Option<RouteMatch> {
    let mut best: Option<RouteMatch> = None;
    for (keyword, path) in table.for_role(role) {
        let hit = word_position(lower, keyword)
            .map(|pos| (pos, keyword.len()))
            .or_else(|| {
                singular(keyword)
                    .and_then(|s| word_position(lower, s).map(|pos| (pos, s.len())))
            });
        let Some((position, len)) = hit else {
            continue;
        };
        let better = match &best {
            None => true,
            Some(current) => {
                position < current.position
                    || (position == current.position && keyword.len() > current.keyword.len())
            }
        };
        if better {
            best = Some(RouteMatch {
                role,
                keyword: keyword.clone(),
                path: path.clone(),
                position,
                len,
            });
        }
    }
    best
}

/// Resolve the first route keyword mentioned in `text`.
///
/// The caller's role table is searched first; when it has no match every
/// other role is swept in [`Role::ALL`] order.
pub fn resolve_route(text: &str, role: Role, table: &RouteTable) -> Option<RouteMatch> {
    let lower = text.to_lowercase();
    best_in_role(&lower, role, table).or_else(|| {
        Role::ALL
            .into_iter()
            .filter(|r| *r != role)
            .find_map(|r| best_in_role(&lower, r, table))
    })
}
