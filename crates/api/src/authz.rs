//! Role checks at the handler boundary.
//!
//! Authentication has already happened in the middleware; this only decides
//! whether the resolved caller's stored role is sufficient.

use careops_auth::{Access, ensure};

use crate::app::errors::ApiError;
use crate::context::CurrentUser;

pub fn require(caller: &CurrentUser, access: Access) -> Result<(), ApiError> {
    ensure(caller.user(), access).map_err(ApiError::from)
}

pub fn require_staff_or_admin(caller: &CurrentUser) -> Result<(), ApiError> {
    require(caller, Access::StaffOrAdmin)
}
