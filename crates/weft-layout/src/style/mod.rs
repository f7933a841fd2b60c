//! Style values: raw strings from the cascade and their resolved, device
//! unit counterparts.
//!
//! - [`cache`] - Per-box raw/actual slots
//! - [`actual`] - Resolution against the box tree
//! - [`keywords`] - Keyword properties
//! - [`values`] - Lengths, colors, angles

pub mod actual;
pub mod cache;
pub mod keywords;
pub mod values;

pub use actual::Side;
pub use cache::{Actual, Property, Slot, StyleValueCache};
pub use values::{Color, LengthValue};
