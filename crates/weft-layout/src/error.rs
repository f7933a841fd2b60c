//! Error types for the layout core.
//!
//! Every per-box step returns `Result<_, LayoutError>`. The per-box
//! boundary in [`crate::layout::layout_box`] turns an error into an
//! [`ErrorSink`](weft_common::report::ErrorSink) report and moves on to the
//! next sibling.

use thiserror::Error;
use weft_common::report::ErrorKind;

use crate::tree::BoxId;

/// Failure of the injected text/font measurement capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeasureError {
    /// No font could be produced for the requested family.
    #[error("font '{family}' is unavailable")]
    FontUnavailable {
        /// The requested font family.
        family: String,
    },
    /// The measurer failed on a specific run of text.
    #[error("could not measure '{text}': {reason}")]
    TextMeasurement {
        /// The text that failed to measure.
        text: String,
        /// Measurer-specific failure description.
        reason: String,
    },
}

/// Failure while laying out a single box.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Walking parent links never reached a block-level ancestor or the
    /// tree root. The box is detached or the tree is malformed.
    #[error("no containing block found for box {0}")]
    NoContainingBlock(BoxId),

    /// [§ 9.5.1 Positioning the float](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    ///
    /// Collision avoidance did not settle within the iteration cap.
    #[error("float placement for box {box_id} did not settle after {iterations} iterations")]
    FloatPlacementExhausted {
        /// The float being placed.
        box_id: BoxId,
        /// Iterations performed before giving up.
        iterations: usize,
    },

    /// Text or font measurement failed.
    #[error("measurement failed: {0}")]
    Measurement(#[from] MeasureError),

    /// The injected table formatter failed.
    #[error("table layout failed: {0}")]
    Table(String),
}

impl LayoutError {
    /// The report classification for this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NoContainingBlock(_) | Self::FloatPlacementExhausted { .. } => {
                ErrorKind::InvariantViolation
            }
            Self::Measurement(_) => ErrorKind::Measurement,
            Self::Table(_) => ErrorKind::Resource,
        }
    }
}
