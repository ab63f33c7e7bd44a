#![forbid(unsafe_code)]

#[cfg(feature = "clarabel")]
pub mod clarabel;

#[cfg(feature = "clarabel")]
pub use self::clarabel::{ClarabelBackend, ClarabelSession};
