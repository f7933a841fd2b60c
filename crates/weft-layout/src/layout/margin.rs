//! Vertical margin collapsing.
//!
//! [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
//!
//! "In CSS, the adjoining margins of two or more boxes (which might or might
//! not be siblings) can combine to form a single margin. Margins that combine
//! this way are said to collapse, and the resulting combined margin is called
//! a collapsed margin."
//!
//! Negative margins are not modeled: every collapse takes the larger value.

use super::NEGLIGIBLE;
use super::float::{establishes_bfc, floats_within, margin_box};
use crate::error::LayoutError;
use crate::host::LayoutContext;
use crate::style::actual::Side;
use crate::style::cache::Property;
use crate::style::keywords::Display;
use crate::tree::{BoxId, BoxKind, BoxTree};

/// Whether a child takes part in its parent's normal flow.
pub(crate) fn is_in_flow(tree: &BoxTree, id: BoxId) -> bool {
    tree.display(id) != Display::None
        && !tree.is_floated(id)
        && !tree.position(id).is_out_of_flow()
}

/// The in-flow sibling whose bottom edge `id` flows from.
///
/// A box that is not floated skips preceding floats: it lays out as if they
/// did not exist. A floated box flows from its immediate (displayed,
/// non-positioned) predecessor, float or not.
#[must_use]
pub fn flow_previous(tree: &BoxTree, id: BoxId) -> Option<BoxId> {
    let floated = tree.is_floated(id);
    tree.preceding_siblings(id).find(|&sibling| {
        tree.display(sibling) != Display::None
            && !tree.position(sibling).is_out_of_flow()
            && (floated || !tree.is_floated(sibling))
    })
}

/// Whether `id` is the last in-flow child of its parent.
fn is_last_in_flow_child(tree: &BoxTree, id: BoxId) -> bool {
    let Some(parent) = tree.parent(id) else {
        return false;
    };
    tree.children(parent)
        .iter()
        .rev()
        .find(|&&c| is_in_flow(tree, c))
        .is_some_and(|&last| last == id)
}

/// Top margin of `id` after collapsing with its flow predecessor or its
/// parent. Stored on the box as `collapsed_margin_top`.
///
/// # Errors
///
/// Propagates font measurement failures (horizontal rules fall back to a
/// font-relative gap).
pub fn collapse_top(
    tree: &mut BoxTree,
    id: BoxId,
    previous: Option<BoxId>,
    ctx: &mut LayoutContext<'_>,
) -> Result<f64, LayoutError> {
    let margin_top = tree.margin(id, Side::Top);

    let mut collapsed = if let Some(previous) = previous {
        // "bottom margin of box and top margin of its next in-flow following
        // sibling"
        tree.margin(previous, Side::Bottom).max(margin_top)
    } else if let Some(parent) = tree.parent(id)
        && no_vertical_padding(tree, id)
        && no_vertical_padding(tree, parent)
    {
        // "top margin of a box and top margin of its first in-flow child"
        //
        // The parent already advanced by its own (collapsed) margin; only the
        // excess of the child's margin is left to apply.
        let parent_margin = tree
            .margin(parent, Side::Top)
            .max(tree[parent].collapsed_margin_top);
        (margin_top - parent_margin).max(0.0)
    } else {
        margin_top
    };

    if matches!(tree[id].kind, BoxKind::Rule) && collapsed < NEGLIGIBLE {
        let font = tree.actual_font(id, ctx.fonts, ctx.measurer)?;
        collapsed = font.height * 1.1;
    }

    tree[id].collapsed_margin_top = collapsed;
    Ok(collapsed)
}

fn no_vertical_padding(tree: &mut BoxTree, id: BoxId) -> bool {
    tree.padding(id, Side::Top) < NEGLIGIBLE && tree.padding(id, Side::Bottom) < NEGLIGIBLE
}

/// Bottom edge of a block container after its children were laid out.
///
/// [§ 10.6.3 Block-level non-replaced elements in normal flow when
/// 'overflow' computes to 'visible'](https://www.w3.org/TR/CSS2/visudet.html#normal-block)
///
/// "Only children in the normal flow are taken into account (i.e., floating
/// boxes and absolutely positioned boxes are ignored [...])"
///
/// [§ 10.6.7 'Auto' heights for block formatting context roots](https://www.w3.org/TR/CSS2/visudet.html#root-height)
///
/// "In addition, if the element has any floating descendants whose bottom
/// margin edge is below the element's bottom content edge, then the height
/// is increased to include those edges."
///
/// When `id` is the last in-flow child of a parent without a bottom margin,
/// the last child's bottom margin collapses through `id`'s bottom edge.
pub fn collapse_bottom(tree: &mut BoxTree, id: BoxId) -> f64 {
    let contains_floats = establishes_bfc(tree, id);
    let mut max_child_bottom = tree.client_top(id);
    let mut last_child = None;

    for child in tree.children(id).to_vec() {
        if tree.display(child) == Display::None || tree.position(child).is_out_of_flow() {
            continue;
        }
        if tree.is_floated(child) {
            continue;
        }
        max_child_bottom = max_child_bottom.max(tree[child].flow_bottom());
        last_child = Some(child);
    }
    if contains_floats {
        for float in floats_within(tree, id) {
            max_child_bottom = max_child_bottom.max(margin_box(tree, float).bottom());
        }
    }

    let mut margin = 0.0;
    if let Some(last_child) = last_child
        && let Some(parent) = tree.parent(id)
        && is_last_in_flow_child(tree, id)
        && tree.margin(parent, Side::Bottom) < NEGLIGIBLE
    {
        let last_margin = tree.margin(last_child, Side::Bottom);
        margin = if tree.actual_definite(id, Property::Height).is_none() {
            tree.margin(id, Side::Bottom).max(last_margin)
        } else {
            last_margin
        };
    }

    let padding_bottom = tree.padding(id, Side::Bottom);
    let border_bottom = tree.border_width(id, Side::Bottom);
    tree[id]
        .bottom()
        .max(max_child_bottom + margin + padding_bottom + border_bottom)
}
