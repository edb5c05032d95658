//! # Gettext Tool
//!
//! Command line front end for the gettext catalog engine: inspect MO files,
//! evaluate plural formulas, translate through configured catalogs and
//! re-save a source as MO and PO.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod commands;

pub use cli::*;
pub use commands::run;
