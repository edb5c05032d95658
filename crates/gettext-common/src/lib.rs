//! # Gettext Common
//!
//! Shared utilities and common functionality for the gettext translator
//! workspace.
//!
//! This crate provides logging initialisation, the timestamp formats used by
//! the catalog serializers, and (behind the `testing` feature) helpers for
//! writing raw MO fixtures in tests.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod logging;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use logging::*;
pub use utils::*;
