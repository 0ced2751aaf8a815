//! `careops-auth`: credential handling and access policy.
//!
//! This crate is intentionally decoupled from HTTP and storage: it hashes and
//! verifies passwords, issues and verifies bearer tokens, and decides whether an
//! already-resolved user may perform an action.

pub mod authorize;
pub mod claims;
pub mod credentials;
pub mod permissions;
pub mod roles;
pub mod user;

pub use authorize::{Access, AuthzError, ensure};
pub use claims::{DEFAULT_TOKEN_TTL_MINUTES, TokenClaims, TokenError, TokenService};
pub use credentials::{CredentialError, MAX_PASSWORD_CHARS, PasswordHasher};
pub use jsonwebtoken::Algorithm;
pub use permissions::Permission;
pub use roles::Role;
pub use user::{LoginStamp, NewStaff, Registration, StaffPatch, StaffStatus, User};
