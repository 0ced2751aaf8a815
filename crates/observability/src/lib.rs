//! Process-wide tracing setup shared by the binaries.

pub mod tracing;

pub use self::tracing::{DEFAULT_FILTER, init, init_with};
