//! The boundary between the layout core and its host.
//!
//! A host provides the error sink, the refresh signal, container
//! configuration, and the text measurer. It reads the aggregate document
//! size back after each pass.

use std::error::Error;

use serde::{Deserialize, Serialize};
use weft_common::report::{CollectingSink, ErrorKind, ErrorReport, ErrorSink};

use crate::fonts::{FontCache, TextMeasurer};
use crate::geometry::{Point, Size};
use crate::layout::inline::{GreedyLineBreaker, InlineFormatter};
use crate::layout::table::{BlockTableFallback, TableFormatter};
use crate::tree::{BoxId, BoxKind, BoxTree, ImageState};

/// Everything the layout core calls back into on the host.
pub trait LayoutHost: ErrorSink {
    /// Ask for a new, separate layout pass (`needs_relayout`) or just a
    /// repaint.
    fn request_refresh(&mut self, needs_relayout: bool);
}

/// A host that records reports and refresh requests in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingHost {
    errors: CollectingSink,
    /// `needs_relayout` of every refresh request, in arrival order.
    pub refresh_requests: Vec<bool>,
}

impl RecordingHost {
    /// Create an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Error reports in arrival order.
    #[must_use]
    pub fn reports(&self) -> &[ErrorReport] {
        self.errors.reports()
    }
}

impl ErrorSink for RecordingHost {
    fn report_error(&mut self, kind: ErrorKind, message: &str, cause: Option<&(dyn Error + 'static)>) {
        log::error!(target: "weft", "{kind} error: {message}");
        self.errors.report_error(kind, message, cause);
    }
}

impl LayoutHost for RecordingHost {
    fn request_refresh(&mut self, needs_relayout: bool) {
        self.refresh_requests.push(needs_relayout);
    }
}

/// Read-only container configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Width available to the root box. `None` measures: the root shrinks
    /// to its preferred width.
    pub max_width: Option<f64>,
    /// Height of the viewport, the basis of root-relative percentages.
    pub viewport_height: Option<f64>,
    /// Where the root box is placed.
    pub root_location: Point,
    /// Page size. Set to lay out in paged mode.
    pub page_size: Option<Size>,
    /// Offset of the first page's top from `root_location.y`.
    pub page_margin_top: f64,
    /// Gap between a list marker and its item's content edge.
    pub marker_gap: f64,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            max_width: None,
            viewport_height: None,
            root_location: Point::ZERO,
            page_size: None,
            page_margin_top: 0.0,
            marker_gap: 5.0,
        }
    }
}

/// Container configuration plus the aggregate document size.
#[derive(Debug, Clone, Default)]
pub struct Container {
    /// Configuration for the next pass.
    pub config: ContainerConfig,
    actual_size: Size,
}

impl Container {
    /// Wrap a configuration.
    #[must_use]
    pub const fn new(config: ContainerConfig) -> Self {
        Self {
            config,
            actual_size: Size::ZERO,
        }
    }

    /// The document size covered by the last pass.
    #[must_use]
    pub const fn actual_size(&self) -> Size {
        self.actual_size
    }

    /// Reset before a fresh pass.
    pub const fn reset_actual_size(&mut self) {
        self.actual_size = Size::ZERO;
    }

    /// Grow monotonically to cover `size`.
    pub fn grow_actual_size(&mut self, size: Size) {
        self.actual_size = self.actual_size.max(size);
    }
}

/// The collaborators one layout pass runs against.
pub struct LayoutContext<'a> {
    /// Text and font measurement.
    pub measurer: &'a dyn TextMeasurer,
    /// Error sink and refresh signal.
    pub host: &'a mut dyn LayoutHost,
    /// Line breaking for inline content.
    pub inline: &'a dyn InlineFormatter,
    /// Table layout.
    pub table: &'a dyn TableFormatter,
    /// Configuration and aggregate size.
    pub container: &'a mut Container,
    /// Font memo shared by every box.
    pub fonts: &'a mut FontCache,
}

impl<'a> LayoutContext<'a> {
    /// A context using the default inline and table formatters.
    pub fn new(
        measurer: &'a dyn TextMeasurer,
        host: &'a mut dyn LayoutHost,
        container: &'a mut Container,
        fonts: &'a mut FontCache,
    ) -> Self {
        Self {
            measurer,
            host,
            inline: &GreedyLineBreaker,
            table: &BlockTableFallback,
            container,
            fonts,
        }
    }

    /// Replace the inline formatter.
    #[must_use]
    pub fn with_inline_formatter(mut self, inline: &'a dyn InlineFormatter) -> Self {
        self.inline = inline;
        self
    }

    /// Replace the table formatter.
    #[must_use]
    pub fn with_table_formatter(mut self, table: &'a dyn TableFormatter) -> Self {
        self.table = table;
        self
    }

    /// Report a failure without interrupting the pass.
    pub fn report(&mut self, kind: ErrorKind, message: &str, cause: Option<&(dyn Error + 'static)>) {
        self.host.report_error(kind, message, cause);
    }
}

impl BoxTree {
    /// An image finished loading: record its intrinsic size and ask the
    /// host for a fresh layout pass. Returns false if `id` is not an image.
    pub fn complete_image_load(
        &mut self,
        id: BoxId,
        width: f64,
        height: f64,
        host: &mut dyn LayoutHost,
    ) -> bool {
        self.set_image_state(id, ImageState::Loaded { width, height }, host, true)
    }

    /// An image failed to load: lay it out as "no image" from now on. Only
    /// a repaint is requested; a failed image keeps its explicit size or
    /// measures 0x0 like a pending one.
    pub fn fail_image_load(&mut self, id: BoxId, host: &mut dyn LayoutHost) -> bool {
        self.set_image_state(id, ImageState::Failed, host, false)
    }

    fn set_image_state(
        &mut self,
        id: BoxId,
        state: ImageState,
        host: &mut dyn LayoutHost,
        needs_relayout: bool,
    ) -> bool {
        let Some(BoxKind::Image(current)) = self.get_mut(id).map(|node| &mut node.kind) else {
            log::warn!(target: "weft", "image load finished for {id}, which is not an image box");
            return false;
        };
        *current = state;
        log::debug!(target: "weft", "{id} image state is now {state:?}");
        host.request_refresh(needs_relayout);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actual_size_grows_monotonically() {
        let mut container = Container::default();
        container.grow_actual_size(Size::new(100.0, 20.0));
        container.grow_actual_size(Size::new(50.0, 40.0));
        assert_eq!(container.actual_size(), Size::new(100.0, 40.0));
        container.reset_actual_size();
        assert_eq!(container.actual_size(), Size::ZERO);
    }

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let config: ContainerConfig = serde_json::from_str(r#"{"max_width": 300}"#).unwrap();
        assert_eq!(config.max_width, Some(300.0));
        assert_eq!(config.marker_gap, 5.0);
        assert_eq!(config.page_size, None);
    }

    #[test]
    fn test_image_load_requests_refresh() {
        let mut tree = BoxTree::new();
        let img = tree.append_new(BoxId::ROOT, BoxKind::Image(ImageState::Pending), None);
        let mut host = RecordingHost::new();

        assert!(tree.complete_image_load(img, 40.0, 30.0, &mut host));
        assert_eq!(
            tree[img].kind,
            BoxKind::Image(ImageState::Loaded {
                width: 40.0,
                height: 30.0
            })
        );
        assert!(!tree.complete_image_load(BoxId::ROOT, 1.0, 1.0, &mut host));
        assert!(tree.fail_image_load(img, &mut host));
        assert_eq!(host.refresh_requests, vec![true, false]);
    }
}
