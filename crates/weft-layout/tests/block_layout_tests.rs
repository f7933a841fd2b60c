//! Integration tests for block layout: widths, heights, margin collapsing,
//! positioning, paged mode, and error continuation.

use weft_common::report::ErrorKind;
use weft_layout::{
    ApproximateMeasurer, BoxId, BoxKind, BoxTree, Container, ContainerConfig, Font, FontCache,
    FontRequest, LayoutContext, MeasureError, Property, RecordingHost, Size, TextMeasurer, layout,
    layout_box,
};

/// Helper: append a block box with the given declarations.
fn block(tree: &mut BoxTree, parent: BoxId, styles: &[(Property, &str)]) -> BoxId {
    let id = tree.append_new(parent, BoxKind::Generic, None);
    tree.set_style(id, Property::Display, "block");
    for &(property, value) in styles {
        tree.set_style(id, property, value);
    }
    id
}

/// Helper: run one pass in a container of the given configuration.
fn run(tree: &mut BoxTree, config: ContainerConfig) -> (RecordingHost, Size) {
    let mut host = RecordingHost::new();
    let mut container = Container::new(config);
    let mut fonts = FontCache::new();
    let mut ctx = LayoutContext::new(&ApproximateMeasurer, &mut host, &mut container, &mut fonts);
    layout(tree, &mut ctx);
    (host, container.actual_size())
}

/// Helper: run one pass with a fixed root width.
fn run_at(tree: &mut BoxTree, width: f64) -> (RecordingHost, Size) {
    run(
        tree,
        ContainerConfig {
            max_width: Some(width),
            ..ContainerConfig::default()
        },
    )
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

/// Helper: the four-sided declarations of a 2px solid border.
const BORDER_2PX: [(Property, &str); 8] = [
    (Property::BorderTopStyle, "solid"),
    (Property::BorderRightStyle, "solid"),
    (Property::BorderBottomStyle, "solid"),
    (Property::BorderLeftStyle, "solid"),
    (Property::BorderTopWidth, "2px"),
    (Property::BorderRightWidth, "2px"),
    (Property::BorderBottomWidth, "2px"),
    (Property::BorderLeftWidth, "2px"),
];

// ---------------------------------------------------------------------------
// Width and height
//
// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
//
// "'margin-left' + 'border-left-width' + 'padding-left' + 'width' +
// 'padding-right' + 'border-right-width' + 'margin-right' = width of
// containing block"
// ---------------------------------------------------------------------------

/// Explicit width and height are content sizes; padding and border add to
/// them.
#[test]
fn test_content_box_sizing() {
    let mut tree = BoxTree::new();
    let mut styles = vec![
        (Property::Width, "200px"),
        (Property::Height, "100px"),
        (Property::PaddingTop, "10px"),
        (Property::PaddingRight, "10px"),
        (Property::PaddingBottom, "10px"),
        (Property::PaddingLeft, "10px"),
    ];
    styles.extend(BORDER_2PX);
    let boxed = block(&mut tree, BoxId::ROOT, &styles);

    let (host, document) = run_at(&mut tree, 500.0);

    assert_eq!(tree[boxed].size, Size::new(224.0, 124.0));
    assert_eq!(tree.client_left(boxed), 12.0);
    assert_eq!(tree.client_top(boxed), 12.0);
    assert_eq!(document.height, 124.0);
    assert!(host.reports().is_empty());
}

/// An auto width fills the containing block minus margins.
#[test]
fn test_auto_width_fills_containing_block() {
    let mut tree = BoxTree::new();
    let outer = block(
        &mut tree,
        BoxId::ROOT,
        &[(Property::PaddingLeft, "20px"), (Property::PaddingRight, "20px")],
    );
    let inner = block(
        &mut tree,
        outer,
        &[
            (Property::MarginLeft, "15px"),
            (Property::MarginRight, "5px"),
            (Property::Height, "10px"),
        ],
    );

    let _ = run_at(&mut tree, 400.0);

    assert_eq!(tree[outer].size.width, 400.0);
    assert_eq!(tree[inner].location.x, 35.0);
    assert_eq!(tree[inner].size.width, 340.0);
}

/// [§ 10.4 Minimum and maximum widths](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
#[test]
fn test_min_and_max_width() {
    let mut tree = BoxTree::new();
    let capped = block(&mut tree, BoxId::ROOT, &[(Property::MaxWidth, "120px")]);
    let floored = block(
        &mut tree,
        BoxId::ROOT,
        &[(Property::Width, "50px"), (Property::MinWidth, "80px")],
    );
    let both = block(
        &mut tree,
        BoxId::ROOT,
        &[(Property::MaxWidth, "100px"), (Property::MinWidth, "150px")],
    );

    let _ = run_at(&mut tree, 400.0);

    assert_eq!(tree[capped].size.width, 120.0);
    assert_eq!(tree[floored].size.width, 80.0);
    // min-width wins over max-width.
    assert_eq!(tree[both].size.width, 150.0);
}

/// Percentages resolve against the containing block's content width.
#[test]
fn test_percentage_width() {
    let mut tree = BoxTree::new();
    let outer = block(&mut tree, BoxId::ROOT, &[(Property::Width, "300px")]);
    let inner = block(&mut tree, outer, &[(Property::Width, "50%")]);

    let _ = run_at(&mut tree, 800.0);
    assert_eq!(tree[inner].size.width, 150.0);

    // The next pass sees the new containing block width.
    tree.set_style(outer, Property::Width, "200px");
    let _ = run_at(&mut tree, 800.0);
    assert_eq!(tree[inner].size.width, 100.0);
}

/// Auto heights cover the in-flow children.
#[test]
fn test_auto_height_covers_children() {
    let mut tree = BoxTree::new();
    let outer = block(&mut tree, BoxId::ROOT, &[(Property::PaddingBottom, "5px")]);
    let _ = block(&mut tree, outer, &[(Property::Height, "30px")]);
    let _ = block(&mut tree, outer, &[(Property::Height, "20px")]);

    let (_, document) = run_at(&mut tree, 300.0);

    assert_eq!(tree[outer].size.height, 55.0);
    assert_eq!(document, Size::new(300.0, 55.0));
}

// ---------------------------------------------------------------------------
// Margin collapsing tests
//
// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
//
// "When two or more margins collapse, the resulting margin width is the
// maximum of the collapsing margins' widths."
// ---------------------------------------------------------------------------

/// Adjacent siblings: the gap is max(margin-bottom, margin-top).
#[test]
fn test_sibling_margins_collapse_to_the_larger() {
    let mut tree = BoxTree::new();
    let first = block(
        &mut tree,
        BoxId::ROOT,
        &[(Property::Height, "10px"), (Property::MarginBottom, "20px")],
    );
    let second = block(
        &mut tree,
        BoxId::ROOT,
        &[(Property::Height, "10px"), (Property::MarginTop, "10px")],
    );

    let _ = run_at(&mut tree, 300.0);

    assert_eq!(tree[first].location.y, 0.0);
    assert_eq!(tree[second].location.y, tree[first].bottom() + 20.0);
    assert_eq!(tree[second].collapsed_margin_top, 20.0);
}

/// A first child's margin collapses through a parent without padding.
#[test]
fn test_first_child_margin_collapses_with_parent() {
    let mut tree = BoxTree::new();
    let parent = block(&mut tree, BoxId::ROOT, &[(Property::MarginTop, "10px")]);
    let child = block(
        &mut tree,
        parent,
        &[(Property::MarginTop, "25px"), (Property::Height, "10px")],
    );

    let _ = run_at(&mut tree, 300.0);

    assert_eq!(tree[parent].location.y, 10.0);
    // Only the excess over the parent's margin is applied.
    assert_eq!(tree[child].location.y, 25.0);
}

/// Padding on the parent separates the margins.
#[test]
fn test_padding_prevents_parent_child_collapse() {
    let mut tree = BoxTree::new();
    let parent = block(
        &mut tree,
        BoxId::ROOT,
        &[(Property::MarginTop, "10px"), (Property::PaddingTop, "5px")],
    );
    let child = block(
        &mut tree,
        parent,
        &[(Property::MarginTop, "25px"), (Property::Height, "10px")],
    );

    let _ = run_at(&mut tree, 300.0);

    assert_eq!(tree[child].location.y, 10.0 + 5.0 + 25.0);
}

// ---------------------------------------------------------------------------
// Positioning
//
// [§ 9.3 Positioning schemes](https://www.w3.org/TR/CSS2/visuren.html#positioning-scheme)
// ---------------------------------------------------------------------------

/// [§ 9.4.3 Relative positioning](https://www.w3.org/TR/CSS2/visuren.html#relative-positioning)
///
/// "Once a box has been laid out according to the normal flow or floated,
/// it may be shifted relative to this position."
#[test]
fn test_relative_offset_does_not_move_siblings() {
    let mut tree = BoxTree::new();
    let shifted = block(
        &mut tree,
        BoxId::ROOT,
        &[
            (Property::Position, "relative"),
            (Property::Left, "10px"),
            (Property::Top, "5px"),
            (Property::Height, "20px"),
        ],
    );
    let next = block(&mut tree, BoxId::ROOT, &[(Property::Height, "10px")]);

    let _ = run_at(&mut tree, 300.0);

    assert_eq!(tree[shifted].location.x, 10.0);
    assert_eq!(tree[shifted].location.y, 5.0);
    assert_eq!(tree[shifted].relative_offset.x, 10.0);
    assert_eq!(tree[next].location.y, 20.0);
}

/// `left` wins over `right` when both are set.
#[test]
fn test_relative_left_wins_over_right() {
    let mut tree = BoxTree::new();
    let shifted = block(
        &mut tree,
        BoxId::ROOT,
        &[
            (Property::Position, "relative"),
            (Property::Left, "10px"),
            (Property::Right, "40px"),
        ],
    );
    let _ = run_at(&mut tree, 300.0);
    assert_eq!(tree[shifted].location.x, 10.0);
}

/// Absolutely positioned boxes take no space in the flow.
#[test]
fn test_absolute_box_leaves_the_flow() {
    let mut tree = BoxTree::new();
    let absolute = block(
        &mut tree,
        BoxId::ROOT,
        &[
            (Property::Position, "absolute"),
            (Property::Left, "30px"),
            (Property::Top, "40px"),
            (Property::Width, "50px"),
            (Property::Height, "20px"),
            (Property::ZIndex, "3"),
        ],
    );
    let next = block(&mut tree, BoxId::ROOT, &[(Property::Height, "10px")]);

    let (host, document) = run_at(&mut tree, 300.0);

    assert_eq!(tree[absolute].location.x, 30.0);
    assert_eq!(tree[absolute].location.y, 40.0);
    assert_eq!(tree[absolute].size, Size::new(50.0, 20.0));
    assert_eq!(tree[absolute].stack_level, 3);
    assert_eq!(tree[next].location.y, 0.0);
    assert_eq!(tree[BoxId::ROOT].size.height, 10.0);
    // It still counts towards the document size.
    assert_eq!(document.height, 60.0);
    assert!(host.reports().is_empty());
}

/// Offsets resolve against the nearest positioned ancestor.
#[test]
fn test_absolute_box_uses_positioned_ancestor() {
    let mut tree = BoxTree::new();
    let _ = block(&mut tree, BoxId::ROOT, &[(Property::Height, "50px")]);
    let anchor = block(
        &mut tree,
        BoxId::ROOT,
        &[(Property::Position, "relative"), (Property::Height, "100px")],
    );
    let absolute = block(
        &mut tree,
        anchor,
        &[
            (Property::Position, "absolute"),
            (Property::Right, "10px"),
            (Property::Bottom, "10px"),
            (Property::Width, "40px"),
            (Property::Height, "20px"),
        ],
    );

    let _ = run_at(&mut tree, 300.0);

    assert_eq!(tree[absolute].location.x, 300.0 - 10.0 - 40.0);
    assert_eq!(tree[absolute].location.y, 50.0 + 100.0 - 10.0 - 20.0);
}

/// Fixed boxes do not grow the document.
#[test]
fn test_fixed_box_is_not_counted_in_document_size() {
    let mut tree = BoxTree::new();
    let _ = block(&mut tree, BoxId::ROOT, &[(Property::Height, "10px")]);
    let fixed = block(
        &mut tree,
        BoxId::ROOT,
        &[
            (Property::Position, "fixed"),
            (Property::Top, "1000px"),
            (Property::Height, "10px"),
        ],
    );

    let (_, document) = run_at(&mut tree, 300.0);

    assert_eq!(tree[fixed].location.y, 1000.0);
    assert_eq!(document.height, 10.0);
}

/// The root box starts at the configured location.
#[test]
fn test_root_location() {
    let mut tree = BoxTree::new();
    let child = block(&mut tree, BoxId::ROOT, &[(Property::Height, "10px")]);
    let _ = run(
        &mut tree,
        ContainerConfig {
            max_width: Some(200.0),
            root_location: weft_layout::Point::new(15.0, 25.0),
            ..ContainerConfig::default()
        },
    );
    assert_eq!(tree[BoxId::ROOT].location, weft_layout::Point::new(15.0, 25.0));
    assert_eq!(tree[child].location.y, 25.0);
}

// ---------------------------------------------------------------------------
// Measure mode, rules, paged mode
// ---------------------------------------------------------------------------

/// Without a maximum width the root shrinks to its preferred width.
#[test]
fn test_measure_mode_uses_preferred_width() {
    let mut tree = BoxTree::new();
    let paragraph = block(&mut tree, BoxId::ROOT, &[]);
    tree.set_text(paragraph, "hello world");

    let (host, document) = run(&mut tree, ContainerConfig::default());

    // Two 5-character words and one space at 0.6em of 16px.
    let expected = 11.0 * 16.0 * 0.6;
    assert_close(tree[BoxId::ROOT].size.width, expected);
    assert_close(document.width, expected);
    assert_eq!(tree[paragraph].line_boxes.len(), 1);
    assert!(host.reports().is_empty());
}

/// A horizontal rule without a height is 2px of content between 1px
/// borders.
#[test]
fn test_rule_defaults() {
    let mut tree = BoxTree::new();
    let rule = tree.append_new(BoxId::ROOT, BoxKind::Rule, None);
    tree.set_style(rule, Property::Display, "block");
    tree.set_style(rule, Property::MarginTop, "8px");

    let _ = run_at(&mut tree, 300.0);

    assert_eq!(tree[rule].location.y, 8.0);
    assert_eq!(tree[rule].size.height, 4.0);
    assert_eq!(tree.border_width(rule, weft_layout::Side::Top), 1.0);
}

/// A rule whose collapsed top margin is zero keeps a gap of 1.1 line
/// heights of its font above it.
#[test]
fn test_rule_without_margin_gets_font_gap() {
    let mut tree = BoxTree::new();
    let above = block(&mut tree, BoxId::ROOT, &[(Property::Height, "10px")]);
    let rule = tree.append_new(BoxId::ROOT, BoxKind::Rule, None);
    tree.set_style(rule, Property::Display, "block");

    let (host, _) = run_at(&mut tree, 300.0);
    assert!(host.reports().is_empty());

    // 16px at 1.2 line spacing.
    let gap = 16.0 * 1.2 * 1.1;
    assert_close(tree[rule].collapsed_margin_top, gap);
    assert_close(tree[rule].location.y, tree[above].bottom() + gap);
}

/// [§ 13.3.2 Breaks inside elements](https://www.w3.org/TR/CSS2/page.html#break-inside)
#[test]
fn test_page_break_inside_avoid_moves_to_next_page() {
    let mut tree = BoxTree::new();
    let _ = block(&mut tree, BoxId::ROOT, &[(Property::Height, "80px")]);
    let kept = block(
        &mut tree,
        BoxId::ROOT,
        &[(Property::Height, "50px"), (Property::PageBreakInside, "avoid")],
    );
    let after = block(&mut tree, BoxId::ROOT, &[(Property::Height, "10px")]);

    let _ = run(
        &mut tree,
        ContainerConfig {
            max_width: Some(300.0),
            page_size: Some(Size::new(300.0, 100.0)),
            ..ContainerConfig::default()
        },
    );

    assert_eq!(tree[kept].location.y, 100.0);
    assert_eq!(tree[after].location.y, 150.0);
}

/// Outside paged mode nothing moves.
#[test]
fn test_page_break_ignored_without_page_size() {
    let mut tree = BoxTree::new();
    let _ = block(&mut tree, BoxId::ROOT, &[(Property::Height, "80px")]);
    let kept = block(
        &mut tree,
        BoxId::ROOT,
        &[(Property::Height, "50px"), (Property::PageBreakInside, "avoid")],
    );
    let _ = run_at(&mut tree, 300.0);
    assert_eq!(tree[kept].location.y, 80.0);
}

/// Boxes taller than a page stay where they are.
#[test]
fn test_box_taller_than_page_is_not_moved() {
    let mut tree = BoxTree::new();
    let _ = block(&mut tree, BoxId::ROOT, &[(Property::Height, "80px")]);
    let tall = block(
        &mut tree,
        BoxId::ROOT,
        &[(Property::Height, "150px"), (Property::PageBreakInside, "avoid")],
    );
    let _ = run(
        &mut tree,
        ContainerConfig {
            max_width: Some(300.0),
            page_size: Some(Size::new(300.0, 100.0)),
            ..ContainerConfig::default()
        },
    );
    assert_eq!(tree[tall].location.y, 80.0);
}

// ---------------------------------------------------------------------------
// Error continuation
// ---------------------------------------------------------------------------

/// Fails to measure the word "boom".
struct FailingMeasurer;

impl TextMeasurer for FailingMeasurer {
    fn font_for(&self, request: &FontRequest) -> Result<Font, MeasureError> {
        ApproximateMeasurer.font_for(request)
    }

    fn measure_text(&self, text: &str, font: &Font) -> Result<Size, MeasureError> {
        if text == "boom" {
            return Err(MeasureError::TextMeasurement {
                text: text.to_string(),
                reason: "glyph missing".to_string(),
            });
        }
        ApproximateMeasurer.measure_text(text, font)
    }
}

/// A failing box is reported and its siblings still lay out.
#[test]
fn test_measurement_failure_is_reported_and_siblings_continue() {
    let mut tree = BoxTree::new();
    let before = block(&mut tree, BoxId::ROOT, &[]);
    tree.set_text(before, "fine");
    let failing = block(&mut tree, BoxId::ROOT, &[]);
    tree.set_text(failing, "boom");
    let after = block(&mut tree, BoxId::ROOT, &[]);
    tree.set_text(after, "fine too");

    let mut host = RecordingHost::new();
    let mut container = Container::new(ContainerConfig {
        max_width: Some(300.0),
        ..ContainerConfig::default()
    });
    let mut fonts = FontCache::new();
    let mut ctx = LayoutContext::new(&FailingMeasurer, &mut host, &mut container, &mut fonts);
    layout(&mut tree, &mut ctx);

    let reports = host.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].kind, ErrorKind::Measurement);
    assert_eq!(reports[0].message, format!("layout of box {failing} failed"));
    assert_eq!(
        reports[0].cause.as_deref(),
        Some("measurement failed: could not measure 'boom': glyph missing")
    );
    assert_eq!(tree[before].line_boxes.len(), 1);
    assert_eq!(tree[after].line_boxes.len(), 1);
    assert!(tree[after].size.height > 0.0);
    assert!(container.actual_size().height > 0.0);
}

/// A box outside the tree has no containing block.
#[test]
fn test_detached_box_reports_invariant_violation() {
    let mut tree = BoxTree::new();
    let detached = tree.alloc(BoxKind::Generic, None);
    tree.set_style(detached, Property::Display, "block");

    let mut host = RecordingHost::new();
    let mut container = Container::new(ContainerConfig {
        max_width: Some(300.0),
        ..ContainerConfig::default()
    });
    let mut fonts = FontCache::new();
    let mut ctx = LayoutContext::new(&ApproximateMeasurer, &mut host, &mut container, &mut fonts);
    layout_box(&mut tree, detached, &mut ctx);

    let reports = host.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].kind, ErrorKind::InvariantViolation);
    assert_eq!(
        reports[0].cause.as_deref(),
        Some(format!("no containing block found for box {detached}").as_str())
    );
}

/// Hidden boxes take no space and are not laid out.
#[test]
fn test_display_none_is_skipped() {
    let mut tree = BoxTree::new();
    let hidden = block(
        &mut tree,
        BoxId::ROOT,
        &[(Property::Display, "none"), (Property::Height, "50px")],
    );
    let shown = block(&mut tree, BoxId::ROOT, &[(Property::Height, "10px")]);

    let _ = run_at(&mut tree, 300.0);

    assert_eq!(tree[hidden].size, Size::ZERO);
    assert_eq!(tree[shown].location.y, 0.0);
}

/// A second pass over an unchanged tree gives the same geometry.
#[test]
fn test_relayout_is_stable() {
    let mut tree = BoxTree::new();
    let a = block(&mut tree, BoxId::ROOT, &[(Property::MarginBottom, "12px")]);
    tree.set_text(a, "some words that wrap across lines in a narrow box");
    let b = block(
        &mut tree,
        BoxId::ROOT,
        &[(Property::Position, "relative"), (Property::Top, "7px")],
    );
    tree.set_text(b, "more");

    let (_, first) = run_at(&mut tree, 120.0);
    let snapshot: Vec<_> = tree.ids().map(|id| tree[id].rect()).collect();
    let (_, second) = run_at(&mut tree, 120.0);
    let again: Vec<_> = tree.ids().map(|id| tree[id].rect()).collect();

    assert_eq!(first, second);
    assert_eq!(snapshot, again);
}
