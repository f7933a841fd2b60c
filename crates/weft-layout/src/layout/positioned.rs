//! CSS Positioned Layout.
//!
//! [§ 9.3 Positioning schemes](https://www.w3.org/TR/CSS2/visuren.html#positioning-scheme)
//!
//! "In CSS 2.1, a box may be laid out according to three positioning
//! schemes: normal flow, floats, absolute positioning."
//!
//! Absolutely positioned and fixed boxes take no space in the flow. Their
//! horizontal offsets and `top` are applied before their content is laid
//! out; `bottom` is applied once their height is known.

use crate::geometry::{Point, Rect};
use crate::host::LayoutContext;
use crate::style::actual::Side;
use crate::style::cache::Property;
use crate::style::keywords::Position;
use crate::tree::{BoxId, BoxTree};

use super::block::translate_subtree;

/// [§ 10.1 Definition of "containing block"](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
///
/// "If the element has 'position: absolute', the containing block is
/// established by the nearest ancestor with a 'position' of 'absolute',
/// 'relative' or 'fixed' [...] the containing block is formed by the
/// padding edge of the ancestor."
///
/// "If the element has 'position: fixed', the containing block is
/// established by the viewport."
///
/// The rectangle offsets resolve against, and whether its height is known
/// yet (an ancestor with `height: auto` is still growing).
fn anchor_rect(tree: &mut BoxTree, id: BoxId, ctx: &LayoutContext<'_>) -> (Rect, bool) {
    let config = &ctx.container.config;
    if tree.position(id) == Position::Fixed {
        let icb = tree.initial_containing_block;
        let rect = Rect::new(
            config.root_location.x,
            config.root_location.y,
            config.max_width.unwrap_or(icb.width),
            config.viewport_height.unwrap_or(icb.height),
        );
        return (rect, true);
    }

    let anchor = tree
        .ancestors(id)
        .find(|&a| tree.position(a) != Position::Static)
        .unwrap_or(BoxId::ROOT);
    let borders = tree.borders(anchor);
    let paddings = tree.paddings(anchor);
    let explicit = tree.actual_definite(anchor, Property::Height);
    let (height, height_known) = match (anchor == BoxId::ROOT, config.viewport_height, explicit) {
        (true, Some(viewport), _) => (viewport, true),
        (_, _, Some(height)) => (height + paddings.vertical(), true),
        _ => (0.0, false),
    };
    let node = &tree[anchor];
    let rect = Rect::new(
        node.location.x + borders.left,
        node.location.y + borders.top,
        (node.size.width - borders.horizontal()).max(0.0),
        height,
    );
    (rect, height_known)
}

/// [§ 10.3.7 Absolutely positioned, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width)
///
/// Location of out-of-flow box `id` from its `left`/`right`/`top` offsets.
/// Offsets that are `auto` keep the static position.
pub fn place_out_of_flow(
    tree: &mut BoxTree,
    id: BoxId,
    static_position: Point,
    ctx: &LayoutContext<'_>,
) -> Point {
    let (anchor, _) = anchor_rect(tree, id, ctx);
    let margins = tree.margins(id);
    let width = tree[id].size.width;

    let x = if let Some(left) = tree.actual_definite(id, Property::Left) {
        anchor.x + left + margins.left
    } else if let Some(right) = tree.actual_definite(id, Property::Right) {
        anchor.right() - right - margins.right - width
    } else {
        static_position.x
    };
    let y = tree
        .actual_definite(id, Property::Top)
        .map_or(static_position.y, |top| anchor.y + top + margins.top);
    log::debug!(target: "weft::positioned", "{id} positioned at ({x}, {y})");
    Point::new(x, y)
}

/// Align an out-of-flow box with `top: auto` to its `bottom` offset, now
/// that its height is known.
pub fn settle_bottom(tree: &mut BoxTree, id: BoxId, ctx: &LayoutContext<'_>) {
    if tree.actual_definite(id, Property::Top).is_some() {
        return;
    }
    let Some(bottom) = tree.actual_definite(id, Property::Bottom) else {
        return;
    };
    let (anchor, height_known) = anchor_rect(tree, id, ctx);
    if !height_known {
        return;
    }
    let margin_bottom = tree.margin(id, Side::Bottom);
    let target = anchor.bottom() - bottom - margin_bottom - tree[id].size.height;
    let dy = target - tree[id].location.y;
    translate_subtree(tree, id, 0.0, dy);
}

/// [§ 9.4.3 Relative positioning](https://www.w3.org/TR/CSS2/visuren.html#relative-positioning)
///
/// "Once a box has been laid out according to the normal flow or floated,
/// it may be shifted relative to this position."
///
/// "If both 'left' and 'right' are not 'auto', [...] the used value of
/// 'right' is its negation." Likewise `top` wins over `bottom`.
pub fn apply_relative_offset(tree: &mut BoxTree, id: BoxId) {
    if tree.position(id) != Position::Relative {
        return;
    }
    let dx = match (
        tree.actual_definite(id, Property::Left),
        tree.actual_definite(id, Property::Right),
    ) {
        (Some(left), _) => left,
        (None, Some(right)) => -right,
        (None, None) => 0.0,
    };
    let dy = match (
        tree.actual_definite(id, Property::Top),
        tree.actual_definite(id, Property::Bottom),
    ) {
        (Some(top), _) => top,
        (None, Some(bottom)) => -bottom,
        (None, None) => 0.0,
    };
    if dx == 0.0 && dy == 0.0 {
        return;
    }
    translate_subtree(tree, id, dx, dy);
    tree[id].relative_offset = Point::new(dx, dy);
}
