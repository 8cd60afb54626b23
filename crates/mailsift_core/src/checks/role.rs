//! Role account checker

use crate::checks::{details_map, extract_local_part};
use crate::loader::{FileLoader, LoadError};
use crate::ValidationResult;
use serde_json::json;
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

/// Flags addresses whose local part designates a function rather than a
/// person (`admin`, `support`, ...). Matching is exact, never substring.
pub struct RoleCheck {
    roles: HashSet<String>,
}

impl RoleCheck {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let roles = FileLoader::new().load_from_file(path)?;
        Ok(Self::from_roles(roles))
    }

    fn from_roles(roles: Vec<String>) -> Self {
        Self {
            roles: roles
                .into_iter()
                .map(|role| role.trim().to_lowercase())
                .filter(|role| !role.is_empty())
                .collect(),
        }
    }

    pub fn validate(&self, email: &str) -> ValidationResult {
        let start = Instant::now();

        let local_part = extract_local_part(email);
        let is_role = self.roles.contains(&local_part);

        ValidationResult {
            valid: !is_role,
            message: if is_role {
                "Role-based email address".to_string()
            } else {
                "Not a role-based email".to_string()
            },
            details: details_map(json!({
                "local_part": local_part,
                "is_role": is_role,
            })),
            duration: start.elapsed(),
            error: None,
        }
    }
}
