use careops_auth::{Role, User};
use careops_core::UserId;

/// The resolved caller of a request.
///
/// Inserted by the auth middleware after the account has been re-read from the
/// store; handlers never see an unresolved token.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    user: User,
}

impl CurrentUser {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn id(&self) -> UserId {
        self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn user(&self) -> &User {
        &self.user
    }
}
