//! Common utilities for the weft layout engine.
//!
//! This crate provides shared infrastructure used by the layout core and
//! its hosts:
//! - **Warning System** - deduplicated warnings for unsupported CSS values
//! - **Error Reports** - the error taxonomy and the non-throwing error sink

pub mod report;
pub mod warning;
