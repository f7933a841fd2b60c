//! CSS 2.1 block-and-float layout for the weft engine.
//!
//! # Scope
//!
//! This crate implements:
//! - **Box tree** ([§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen))
//!   - Arena of boxes addressed by [`BoxId`]
//!   - Words and line boxes for inline content
//!
//! - **Style value cache** ([§ 6.1 Specified, computed, and actual values](https://www.w3.org/TR/CSS2/cascade.html#value-stages))
//!   - Raw cascade strings with lazily memoized actual values
//!   - Lengths, percentages, colors, fonts
//!
//! - **Block layout** ([§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting))
//!   - Width and height resolution
//!   - Margin collapsing
//!   - Floats, clearance, and float avoidance
//!   - Relative, absolute, and fixed positioning
//!   - List markers, horizontal rules, images, paged mode
//!
//! - **Host seams**
//!   - [`TextMeasurer`] for fonts and text
//!   - [`LayoutHost`] for error reports and refresh requests
//!   - [`InlineFormatter`] and [`TableFormatter`] for line breaking and tables
//!
//! # Not Yet Implemented
//!
//! - Negative margins
//! - `vertical-align` other than baseline
//! - A real table algorithm (the default formatter stacks rows)
//!
//! # Example
//!
//! ```
//! use weft_layout::{
//!     ApproximateMeasurer, BoxId, BoxKind, BoxTree, Container, ContainerConfig, FontCache,
//!     LayoutContext, Property, RecordingHost, layout,
//! };
//!
//! let mut tree = BoxTree::new();
//! let child = tree.append_new(BoxId::ROOT, BoxKind::Generic, None);
//! tree.set_style(child, Property::Display, "block");
//! tree.set_style(child, Property::Height, "40px");
//!
//! let mut host = RecordingHost::new();
//! let mut container = Container::new(ContainerConfig {
//!     max_width: Some(300.0),
//!     ..ContainerConfig::default()
//! });
//! let mut fonts = FontCache::new();
//! let mut ctx = LayoutContext::new(&ApproximateMeasurer, &mut host, &mut container, &mut fonts);
//! layout(&mut tree, &mut ctx);
//!
//! assert_eq!(tree[child].size.width, 300.0);
//! assert_eq!(container.actual_size().height, 40.0);
//! ```

pub mod description;
pub mod error;
pub mod fonts;
pub mod geometry;
pub mod host;
pub mod layout;
pub mod style;
pub mod tree;

pub use description::{BoxDescription, DocumentDescription, GeometrySnapshot};
pub use error::{LayoutError, MeasureError};
pub use fonts::{ApproximateMeasurer, Font, FontCache, FontRequest, TextMeasurer};
pub use geometry::{BoxEdges, Point, Rect, Size};
pub use host::{Container, ContainerConfig, LayoutContext, LayoutHost, RecordingHost};
pub use layout::{
    BlockTableFallback, GreedyLineBreaker, InlineFormatter, LineBox, TableFormatter, layout,
    layout_box,
};
pub use style::{Actual, Color, Property, Side, StyleValueCache};
pub use tree::{BoxId, BoxKind, BoxNode, BoxTree, ImageState, Tag, Word, WordContent};
