//! Block layout: one box's layout pass.
//!
//! [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
//!
//! "In a block formatting context, boxes are laid out one after the other,
//! vertically, beginning at the top of a containing block. The vertical
//! distance between two sibling boxes is determined by the 'margin'
//! properties. Vertical margins between adjacent block-level boxes in a
//! block formatting context collapse."
//!
//! "In a block formatting context, each box's left outer edge touches the
//! left edge of the containing block (for right-to-left formatting, right
//! edges touch). This is true even in the presence of floats (although a
//! box's line boxes may shrink due to the floats), unless the box
//! establishes a new block formatting context (in which case the box itself
//! may become narrower due to the floats)."

use weft_common::report::ErrorKind;

use super::float::{self, clearance, collect_preceding_floats_in_bfc, float_edges_at};
use super::list_marker::layout_marker;
use super::margin::{collapse_bottom, collapse_top, flow_previous};
use super::positioned::{apply_relative_offset, place_out_of_flow, settle_bottom};
use super::sizing::{
    deep_margin_sum, has_inline_content, measure_words, minimum_width, preferred_width,
};
use crate::error::LayoutError;
use crate::geometry::{Point, Size};
use crate::host::LayoutContext;
use crate::style::actual::Side;
use crate::style::cache::Property;
use crate::style::keywords::{Display, PageBreakInside, Position};
use crate::tree::{BoxId, BoxKind, BoxTree};

/// Lay out the whole tree.
///
/// Resets the container's aggregate size, establishes the initial
/// containing block and lays out the root. Failures are reported per box
/// through the host; the pass always completes.
pub fn layout(tree: &mut BoxTree, ctx: &mut LayoutContext<'_>) {
    ctx.container.reset_actual_size();
    let config = ctx.container.config.clone();
    let root = tree.root();

    // [§ 10.1 Definition of "containing block"](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
    //
    // "The containing block in which the root element lives is a rectangle
    // called the initial containing block."
    let width = match config.max_width {
        Some(width) => width,
        None => match preferred_width(tree, root, ctx) {
            Ok(preferred) => preferred + tree.margins(root).horizontal(),
            Err(err) => {
                ctx.report(err.kind(), "measuring the preferred width failed", Some(&err));
                0.0
            }
        },
    };
    let height = config.viewport_height.unwrap_or(0.0);
    tree.set_initial_containing_block(Size::new(width, height));
    log::debug!(target: "weft::block", "initial containing block {width}x{height}");

    layout_box(tree, root, ctx);
}

/// Lay out one box and its subtree.
///
/// Errors never escape: they are reported to the host and the box keeps
/// whatever geometry it reached, so siblings still lay out.
pub fn layout_box(tree: &mut BoxTree, id: BoxId, ctx: &mut LayoutContext<'_>) {
    if let Err(err) = try_layout_box(tree, id, ctx) {
        let kind: ErrorKind = err.kind();
        ctx.report(kind, &format!("layout of box {id} failed"), Some(&err));
    }
}

fn try_layout_box(
    tree: &mut BoxTree,
    id: BoxId,
    ctx: &mut LayoutContext<'_>,
) -> Result<(), LayoutError> {
    // STEP 1: Skip boxes that generate nothing.
    let display = tree.used_display(id);
    if display == Display::None {
        return Ok(());
    }
    log::trace!(target: "weft::block", "layout {id} ({display:?})");

    // STEP 2: Reset per-pass state.
    //
    // Containing block widths may have changed since the last pass.
    tree[id].style.invalidate_percentages();
    tree[id].relative_offset = Point::ZERO;
    tree[id].line_boxes.clear();
    measure_words(tree, id, ctx)?;

    let kind = tree[id].kind.clone();
    if let BoxKind::SpacingCell { .. } = kind {
        return Ok(());
    }

    if display.is_block_like() {
        // STEP 3: Width.
        // Table boxes and cells are sized by the table formatter.
        if !matches!(display, Display::Table | Display::TableCell) {
            resolve_width(tree, id, ctx)?;
        }

        // STEP 4: Position.
        if display != Display::TableCell {
            resolve_position(tree, id, ctx)?;
        }
        if let Some(page) = ctx.container.config.page_size
            && tree.page_break_inside(id) == PageBreakInside::Avoid
        {
            break_page(tree, id, page.height, ctx);
        }
        tree[id].size.height = 0.0;

        // STEP 5: Content.
        match kind {
            BoxKind::Rule => rule_content(tree, id),
            _ if matches!(display, Display::Table | Display::InlineTable) => {
                let table = ctx.table;
                table.format(tree, id, ctx)?;
            }
            _ if has_inline_content(tree, id) => {
                let inline = ctx.inline;
                inline.format(tree, id, ctx)?;
            }
            _ => {
                for child in tree.children(id).to_vec() {
                    layout_box(tree, child, ctx);
                }
                let bottom = collapse_bottom(tree, id);
                tree[id].set_bottom(bottom);
            }
        }

        // STEP 6: Height.
        resolve_height(tree, id);
        if tree.is_floated(id) {
            place_float(tree, id)?;
        }
        if tree.position(id).is_out_of_flow() {
            settle_bottom(tree, id, ctx);
        }

        // STEP 7: Relative offset.
        apply_relative_offset(tree, id);

        // STEP 8: List marker.
        if display == Display::ListItem {
            layout_marker(tree, id, ctx)?;
        }
    } else {
        inline_in_block_flow(tree, id, ctx)?;
    }

    // [§ 9.9.1 Specifying the stack level: the 'z-index' property](https://www.w3.org/TR/CSS2/visuren.html#z-index)
    tree[id].stack_level = if tree.position(id) == Position::Static {
        0
    } else {
        tree.z_index(id).unwrap_or(0)
    };

    // STEP 9: Grow the document size.
    if tree.position(id) != Position::Fixed {
        let origin = ctx.container.config.root_location;
        let width = (minimum_width(tree, id) + deep_margin_sum(tree, id))
            .max(tree[id].right() - origin.x);
        let height = tree[id].bottom() - origin.y;
        ctx.container.grow_actual_size(Size::new(width, height));
    }
    Ok(())
}

/// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
///
/// "'margin-left' + 'border-left-width' + 'padding-left' + 'width' +
/// 'padding-right' + 'border-right-width' + 'margin-right' = width of
/// containing block"
///
/// An `auto` width fills the containing block minus margins. An explicit
/// width is the content width: padding and border are added to it and
/// margins only move the box.
///
/// # Errors
///
/// [`LayoutError::NoContainingBlock`] for a box outside any block
/// container; measurement failures while shrinking to fit.
pub(crate) fn resolve_width(
    tree: &mut BoxTree,
    id: BoxId,
    ctx: &mut LayoutContext<'_>,
) -> Result<(), LayoutError> {
    let containing_block = tree.containing_block(id)?;
    let available = if containing_block == id {
        tree.initial_containing_block.width
    } else {
        tree.content_width(containing_block)
    };
    let margins = tree.margins(id).horizontal();
    let insets = tree.paddings(id).horizontal() + tree.borders(id).horizontal();

    let mut content = match tree.actual_definite(id, Property::Width) {
        Some(width) => width,
        None if matches!(tree[id].kind, BoxKind::Image(_)) => {
            tree[id].words.first().map_or(0.0, |w| w.width)
        }
        // [§ 10.3.5 Floating, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#float-width)
        //
        // "If 'width' is computed as 'auto', the used value is the
        // 'shrink-to-fit' width."
        None if tree.is_floated(id) || tree.position(id).is_out_of_flow() => {
            let preferred = preferred_width(tree, id, ctx)?;
            preferred.min(available - margins) - insets
        }
        None => available - margins - insets,
    };

    // [§ 10.4 Minimum and maximum widths](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
    //
    // "If the tentative used width is greater than 'max-width', the rules
    // above are applied again, but this time using the computed value of
    // 'max-width' as the computed value for 'width'."
    if let Some(max) = tree.actual_definite(id, Property::MaxWidth) {
        content = content.min(max);
    }
    if let Some(min) = tree.actual_definite(id, Property::MinWidth) {
        content = content.max(min);
    }
    tree[id].size.width = content.max(0.0) + insets;
    Ok(())
}

/// Normal-flow position, clearance, and either out-of-flow offsets or
/// avoidance of preceding floats.
fn resolve_position(
    tree: &mut BoxTree,
    id: BoxId,
    ctx: &mut LayoutContext<'_>,
) -> Result<(), LayoutError> {
    // STEP 1: Flow position.
    let previous = flow_previous(tree, id);
    let collapsed = collapse_top(tree, id, previous, ctx)?;
    let margin_left = tree.margin(id, Side::Left);
    let (mut left, mut top) = match tree.parent(id) {
        None => {
            let origin = ctx.container.config.root_location;
            (origin.x + margin_left, origin.y + collapsed)
        }
        Some(parent) => {
            let flow_top = match previous {
                Some(previous) => tree[previous].flow_bottom(),
                None => tree.client_top(parent),
            };
            (tree.client_left(parent) + margin_left, flow_top + collapsed)
        }
    };

    // STEP 2: Clearance.
    if let Some(cleared) = clearance(tree, id) {
        top = top.max(cleared);
    }

    // STEP 3: Positioned and floated boxes leave the flow.
    if tree.position(id).is_out_of_flow() {
        tree[id].location = place_out_of_flow(tree, id, Point::new(left, top), ctx);
        return Ok(());
    }
    if tree.is_floated(id) {
        // Tentative; `place_float` settles it once the size is known.
        tree[id].location = Point::new(left, top);
        return Ok(());
    }

    // STEP 4: Avoid floats beside the top edge.
    let floats = collect_preceding_floats_in_bfc(tree, id);
    if !floats.is_empty() {
        let (left_edge, right_edge) = float_edges_at(tree, &floats, top);
        if let Some(edge) = left_edge {
            left = left.max(edge + margin_left);
        }
        let auto_width = tree.actual_definite(id, Property::Width).is_none()
            && tree.display(id) != Display::Table;
        if auto_width
            && (left_edge.is_some() || right_edge.is_some())
            && let Some(parent) = tree.parent(id)
        {
            let margin_right = tree.margin(id, Side::Right);
            let mut right = tree.client_right(parent) - margin_right;
            if let Some(edge) = right_edge {
                right = right.min(edge - margin_right);
            }
            let width = tree[id].size.width.min(right - left).max(0.0);
            tree[id].size.width = width;
        }
    }
    tree[id].location = Point::new(left, top);
    Ok(())
}

/// [§ 10.6.3 Block-level non-replaced elements in normal flow when
/// 'overflow' computes to 'visible'](https://www.w3.org/TR/CSS2/visudet.html#normal-block)
///
/// "If 'height' is 'auto', the height depends on whether the element has
/// any block-level children and whether it has padding or borders."
///
/// An explicit height is the content height; padding and border are added.
fn resolve_height(tree: &mut BoxTree, id: BoxId) {
    let padding_bottom = tree.padding(id, Side::Bottom);
    let border_bottom = tree.border_width(id, Side::Bottom);
    let Some(height) = tree.actual_definite(id, Property::Height) else {
        let minimum = tree.client_top(id) + padding_bottom + border_bottom;
        if tree[id].bottom() < minimum {
            tree[id].set_bottom(minimum);
        }
        return;
    };

    let insets = tree.paddings(id).vertical() + tree.borders(id).vertical();
    let target = tree[id].location.y + height + insets;
    if tree.is_floated(id) {
        // A float's formatting context is its own; nested floats do not
        // stretch an explicit height.
        tree[id].set_bottom(target);
    } else {
        let bottom = tree[id].bottom().max(target);
        tree[id].set_bottom(bottom);
    }
}

/// Move a laid-out float to its final position.
fn place_float(tree: &mut BoxTree, id: BoxId) -> Result<(), LayoutError> {
    let tentative = tree[id].location;
    let placement = float::place(tree, id, tentative.y)?;
    translate_subtree(tree, id, placement.left - tentative.x, placement.top - tentative.y);
    Ok(())
}

/// [§ 13.3.2 Breaks inside elements: 'orphans', 'widows'](https://www.w3.org/TR/CSS2/page.html#break-inside)
///
/// "avoid: Avoid a page break inside the generated box."
///
/// Moves `id` to the top of the next page when it would straddle a page
/// boundary and fits on one page. Its height is the explicit height, or
/// the height from the previous pass.
fn break_page(tree: &mut BoxTree, id: BoxId, page_height: f64, ctx: &LayoutContext<'_>) {
    if page_height <= 0.0 {
        return;
    }
    let height = match tree.actual_definite(id, Property::Height) {
        Some(height) => height + tree.paddings(id).vertical() + tree.borders(id).vertical(),
        None => tree[id].size.height,
    };
    let origin = ctx.container.config.root_location.y + ctx.container.config.page_margin_top;
    let top = tree[id].location.y;
    let page = ((top - origin) / page_height).floor();
    let page_top = origin + page * page_height;
    let page_bottom = page_top + page_height;
    if top > page_top && top + height > page_bottom && height <= page_height {
        log::debug!(target: "weft::block", "{id} moved to the page starting at {page_bottom}");
        let dy = page_bottom - top;
        tree[id].location.y += dy;
    }
}

/// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
///
/// A horizontal rule is a block with a thin border. Without an explicit
/// height it is 2px tall; a rule that thin with no vertical borders gets a
/// 1px solid top and bottom border.
fn rule_content(tree: &mut BoxTree, id: BoxId) {
    if !tree[id].style.is_specified(Property::Height) {
        tree.set_style(id, Property::Height, "2px");
    }
    let thin = tree.actual_definite(id, Property::Height).unwrap_or(0.0) <= 2.0;
    if thin
        && tree.border_width(id, Side::Top) < 1.0
        && tree.border_width(id, Side::Bottom) < 1.0
    {
        for (style, width) in [
            (Property::BorderTopStyle, Property::BorderTopWidth),
            (Property::BorderBottomStyle, Property::BorderBottomWidth),
        ] {
            tree.set_style(id, style, "solid");
            tree.set_style(id, width, "1px");
        }
    }
}

/// An inline-level box met in block flow (mixed content that was not
/// wrapped in an anonymous block) lays out its words as an anonymous block
/// would: full width, below its flow predecessor.
fn inline_in_block_flow(
    tree: &mut BoxTree,
    id: BoxId,
    ctx: &mut LayoutContext<'_>,
) -> Result<(), LayoutError> {
    let Some(parent) = tree.parent(id) else {
        return Err(LayoutError::NoContainingBlock(id));
    };
    let top = match flow_previous(tree, id) {
        Some(previous) => tree[previous].flow_bottom(),
        None => tree.client_top(parent),
    };
    let left = tree.client_left(parent);
    let width = tree.content_width(parent);
    let node = &mut tree[id];
    node.location = Point::new(left, top);
    node.size = Size::new(width, 0.0);
    let inline = ctx.inline;
    inline.format(tree, id, ctx)
}

/// Move `id`, its descendants, their words and line boxes, and any list
/// markers by `(dx, dy)`.
pub fn translate_subtree(tree: &mut BoxTree, id: BoxId, dx: f64, dy: f64) {
    if dx == 0.0 && dy == 0.0 {
        return;
    }
    let mut boxes = vec![id];
    boxes.extend(tree.descendants(id));
    let markers: Vec<BoxId> = boxes.iter().filter_map(|&b| tree[b].list_marker).collect();
    boxes.extend(markers);

    for box_id in boxes {
        let node = &mut tree[box_id];
        node.location.x += dx;
        node.location.y += dy;
        for word in &mut node.words {
            word.left += dx;
            word.top += dy;
        }
        for line in &mut node.line_boxes {
            for rect in line.rects.values_mut() {
                rect.translate(dx, dy);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::{ApproximateMeasurer, FontCache};
    use crate::host::{Container, ContainerConfig, RecordingHost};

    #[test]
    fn test_explicit_width_ignores_margins() {
        let mut tree = BoxTree::new();
        let child = tree.append_new(BoxId::ROOT, BoxKind::Generic, None);
        tree.set_style(child, Property::Display, "block");
        tree.set_style(child, Property::Width, "100px");
        tree.set_style(child, Property::MarginLeft, "30px");
        tree.set_style(child, Property::PaddingLeft, "5px");

        let mut host = RecordingHost::new();
        let mut container = Container::new(ContainerConfig {
            max_width: Some(400.0),
            ..ContainerConfig::default()
        });
        let mut fonts = FontCache::new();
        let mut ctx = LayoutContext::new(&ApproximateMeasurer, &mut host, &mut container, &mut fonts);
        layout(&mut tree, &mut ctx);

        assert_eq!(tree[child].size.width, 105.0);
        assert_eq!(tree[child].location.x, 30.0);
        assert!(host.reports().is_empty());
    }

    #[test]
    fn test_translate_moves_words_and_lines() {
        let mut tree = BoxTree::new();
        let p = tree.append_new(BoxId::ROOT, BoxKind::Generic, None);
        tree.set_text(p, "hello");
        tree[p].line_boxes.push(crate::layout::inline::LineBox::default());
        translate_subtree(&mut tree, BoxId::ROOT, 3.0, 4.0);
        assert_eq!(tree[p].location, Point::new(3.0, 4.0));
        assert_eq!(tree[p].words[0].left, 3.0);
        assert_eq!(tree[p].words[0].top, 4.0);
    }
}
