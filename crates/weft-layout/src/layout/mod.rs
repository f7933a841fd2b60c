//! CSS 2.1 block-and-float layout.
//!
//! # Relevant Specifications
//!
//! - [CSS 2.1 Visual Formatting Model](https://www.w3.org/TR/CSS2/visuren.html)
//! - [CSS 2.1 Visual Formatting Model Details](https://www.w3.org/TR/CSS2/visudet.html)
//! - [CSS 2.1 Box Model](https://www.w3.org/TR/CSS2/box.html)
//!
//! # Module Structure
//!
//! - [`block`] - The per-box layout pass and the tree entry point
//! - [`float`] - Block formatting contexts, float placement, and clearance
//! - [`margin`] - Vertical margin collapsing
//! - [`sizing`] - Word measurement and intrinsic widths
//! - [`inline`] - Line boxes and the default line breaker
//! - [`positioned`] - Relative, absolute, and fixed positioning
//! - [`table`] - The table layout seam and its block fallback
//! - [`list_marker`] - List item marker boxes

pub mod block;
pub mod float;
pub mod inline;
pub mod list_marker;
pub mod margin;
pub mod positioned;
pub mod sizing;
pub mod table;

pub use block::{layout, layout_box, translate_subtree};
pub use float::{FloatPlacement, MAX_FLOAT_ITERATIONS, establishes_bfc};
pub use inline::{GreedyLineBreaker, InlineFormatter, LineBox, WordRef};
pub use table::{BlockTableFallback, TableFormatter};

/// Paddings and margins below this many pixels count as absent.
pub(crate) const NEGLIGIBLE: f64 = 0.1;
