use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission label attached to a staff account (e.g. "bookings.manage").
///
/// Permissions are informational only: endpoint access is decided by role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Collapse a client-supplied list into a set: trimmed, non-empty, first occurrence wins.
pub fn normalize(permissions: Vec<Permission>) -> Vec<Permission> {
    let mut out: Vec<Permission> = Vec::with_capacity(permissions.len());
    for p in permissions {
        let trimmed = p.as_str().trim();
        if trimmed.is_empty() || out.iter().any(|q| q.as_str() == trimmed) {
            continue;
        }
        out.push(Permission::new(trimmed.to_string()));
    }
    out
}
