use thiserror::Error;

use crate::{Role, User};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// Missing, invalid or expired credential, or the account no longer exists.
    #[error("could not validate credentials")]
    Unauthorized,

    #[error("requires {0}")]
    Forbidden(&'static str),
}

/// Access requirement of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Any resolved account.
    Authenticated,
    /// Exactly this role.
    Role(Role),
    /// Back-office accounts (staff or admin).
    StaffOrAdmin,
}

impl Access {
    fn requirement(&self) -> &'static str {
        match self {
            Access::Authenticated => "authentication",
            Access::Role(Role::Admin) => "admin role",
            Access::Role(Role::Staff) => "staff role",
            Access::Role(Role::Customer) => "customer role",
            Access::StaffOrAdmin => "staff or admin role",
        }
    }
}

/// Decide whether an already-resolved user satisfies `access`.
///
/// - No IO
/// - No panics
/// - The role comes from the stored record, never from the token or the request
pub fn ensure(user: &User, access: Access) -> Result<(), AuthzError> {
    let allowed = match access {
        Access::Authenticated => true,
        Access::Role(role) => user.role == role,
        Access::StaffOrAdmin => user.role.is_back_office(),
    };

    if allowed {
        Ok(())
    } else {
        tracing::debug!(
            user_id = %user.id,
            role = %user.role,
            "access denied: {}",
            access.requirement()
        );
        Err(AuthzError::Forbidden(access.requirement()))
    }
}
