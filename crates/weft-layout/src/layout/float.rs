//! CSS Float Layout.
//!
//! [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
//!
//! "A float is a box that is shifted to the left or right on the current line.
//! The most interesting characteristic of a float is that content may flow along
//! its side (or be prohibited from doing so by the 'clear' property)."
//!
//! "A floated box is shifted to the left or right until its outer edge touches
//! the containing block edge or the outer edge of another float."
//!
//! Floats are not tracked in a side table. Every query walks the box tree
//! for the floats that precede a box inside its block formatting context.

use crate::error::LayoutError;
use crate::geometry::Rect;
use crate::style::actual::Side;
use crate::style::keywords::{Clear, Display, Float, Overflow};
use crate::tree::{BoxId, BoxTree};

/// Upper bound on collision-avoidance rounds for one float.
pub const MAX_FLOAT_ITERATIONS: usize = 100;

/// Smallest vertical band a box occupies while testing for overlap, so
/// zero-height boxes still collide with the floats they sit next to.
const MIN_BAND: f64 = 0.01;

/// Result of [`place`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatPlacement {
    /// Border-box left edge.
    pub left: f64,
    /// Border-box top edge.
    pub top: f64,
    /// Collision-avoidance rounds used.
    pub iterations: usize,
}

/// [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
///
/// "Floats, absolutely positioned elements, block containers (such as
/// inline-blocks, table-cells, and table-captions) that are not block
/// boxes, and block boxes with 'overflow' other than 'visible' (except when
/// that value has been propagated to the viewport) establish new block
/// formatting contexts for their contents."
#[must_use]
pub fn establishes_bfc(tree: &BoxTree, id: BoxId) -> bool {
    tree.float(id) != Float::None
        || matches!(tree.display(id), Display::InlineBlock | Display::TableCell)
        || tree.position(id).is_out_of_flow()
        || tree.overflow(id) != Overflow::Visible
}

/// Floats laid out before `id` that share its block formatting context.
///
/// Walks the siblings before `id`, then the siblings before each ancestor,
/// until an ancestor establishes a block formatting context. A float's own
/// subtree is never entered, and neither is any other formatting context
/// root.
#[must_use]
pub fn collect_preceding_floats_in_bfc(tree: &BoxTree, id: BoxId) -> Vec<BoxId> {
    let mut floats = Vec::new();
    let mut current = id;
    while let Some(parent) = tree.parent(current) {
        for &sibling in tree.children(parent) {
            if sibling == current {
                break;
            }
            collect_floats_in(tree, sibling, &mut floats);
        }
        if establishes_bfc(tree, parent) {
            break;
        }
        current = parent;
    }
    floats
}

/// Floats inside `id` that belong to the block formatting context `id`
/// contains: found through non-root descendants, without entering a float
/// or another formatting context root.
#[must_use]
pub fn floats_within(tree: &BoxTree, id: BoxId) -> Vec<BoxId> {
    let mut floats = Vec::new();
    for &child in tree.children(id) {
        collect_floats_in(tree, child, &mut floats);
    }
    floats
}

fn collect_floats_in(tree: &BoxTree, id: BoxId, floats: &mut Vec<BoxId>) {
    if tree.display(id) == Display::None {
        return;
    }
    if tree.is_floated(id) {
        floats.push(id);
        return;
    }
    if establishes_bfc(tree, id) {
        return;
    }
    for &child in tree.children(id) {
        collect_floats_in(tree, child, floats);
    }
}

/// The margin box of a laid-out box.
pub fn margin_box(tree: &mut BoxTree, id: BoxId) -> Rect {
    let margins = tree.margins(id);
    let node = &tree[id];
    Rect::new(
        node.location.x - margins.left,
        node.location.y - margins.top,
        node.size.width + margins.horizontal(),
        node.size.height + margins.vertical(),
    )
}

/// [§ 9.5.2 Controlling flow next to floats](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
///
/// "Requires that the top border edge of the box be below the bottom outer
/// edge of any left-floating boxes that resulted from elements earlier in
/// the source document."
///
/// The lowest margin-box bottom among the preceding floats `clear` applies
/// to, or `None` when there is nothing to clear.
pub fn clearance(tree: &mut BoxTree, id: BoxId) -> Option<f64> {
    let clear = tree.clear(id);
    if clear == Clear::None {
        return None;
    }
    let mut lowest: Option<f64> = None;
    for float in collect_preceding_floats_in_bfc(tree, id) {
        if !clear.clears(tree.float(float)) {
            continue;
        }
        let bottom = margin_box(tree, float).bottom();
        lowest = Some(lowest.map_or(bottom, |l| l.max(bottom)));
    }
    if let Some(bottom) = lowest {
        log::debug!(target: "weft::float", "{id} clears {clear:?} floats down to {bottom}");
    }
    lowest
}

/// Horizontal limits imposed at vertical position `y` by `floats`: the
/// rightmost left-float edge and the leftmost right-float edge.
pub fn float_edges_at(
    tree: &mut BoxTree,
    floats: &[BoxId],
    y: f64,
) -> (Option<f64>, Option<f64>) {
    let mut left_edge: Option<f64> = None;
    let mut right_edge: Option<f64> = None;
    for &float in floats {
        let rect = margin_box(tree, float);
        if rect.height <= 0.0 || y < rect.y || y >= rect.bottom() {
            continue;
        }
        match tree.float(float) {
            Float::Left => left_edge = Some(left_edge.map_or(rect.right(), |e| e.max(rect.right()))),
            Float::Right => right_edge = Some(right_edge.map_or(rect.x, |e| e.min(rect.x))),
            Float::None => {}
        }
    }
    (left_edge, right_edge)
}

/// [§ 9.5.1 Positioning the float: the 'float' property](https://www.w3.org/TR/CSS2/visuren.html#float-position)
///
/// Place floated box `id`, whose size is already known, starting no
/// higher than `top`.
///
/// # Errors
///
/// [`LayoutError::FloatPlacementExhausted`] if no position is found within
/// [`MAX_FLOAT_ITERATIONS`] rounds.
pub fn place(tree: &mut BoxTree, id: BoxId, top: f64) -> Result<FloatPlacement, LayoutError> {
    let side = tree.float(id);
    let Some(parent) = tree.parent(id) else {
        return Ok(FloatPlacement {
            left: tree[id].location.x,
            top,
            iterations: 0,
        });
    };
    let margins = tree.margins(id);
    let width = tree[id].size.width;
    let outer_width = width + margins.horizontal();
    let outer_height = tree[id].size.height + margins.vertical();
    let container_left = tree.client_left(parent);
    let container_right = tree.client_right(parent);

    let floats: Vec<(Float, Rect)> = collect_preceding_floats_in_bfc(tree, id)
        .into_iter()
        .map(|f| (tree.float(f), margin_box(tree, f)))
        .collect();

    // STEP 1: Start at the highest allowed position.
    // [§ 9.5.1 Rule 5](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    //
    // "The outer top of a floating box may not be higher than the outer top
    // of any block or floated box generated by an element earlier in the
    // source document."
    //
    // A float directly after another float starts level with it.
    let mut top = top;
    let previous = tree
        .preceding_siblings(id)
        .find(|&s| tree.display(s) != Display::None);
    if let Some(previous) = previous
        && tree.is_floated(previous)
    {
        let previous_top = tree[previous].location.y - tree.margin(previous, Side::Top);
        top = previous_top + margins.top;
    }
    if let Some(cleared) = clearance(tree, id) {
        top = top.max(cleared);
    }

    // STEP 2: Find a position where the float fits.
    // [§ 9.5.1 Rules 2, 3, 7](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    for iteration in 1..=MAX_FLOAT_ITERATIONS {
        let band_top = top - margins.top;
        let band_bottom = band_top + outer_height.max(MIN_BAND);

        let mut left_edge = container_left;
        let mut right_edge = container_right;
        let mut lowest: Option<f64> = None;
        for (float_side, rect) in &floats {
            if rect.height <= 0.0 || rect.y >= band_bottom || rect.bottom() <= band_top {
                continue;
            }
            match float_side {
                Float::Left => left_edge = left_edge.max(rect.right()),
                Float::Right => right_edge = right_edge.min(rect.x),
                Float::None => continue,
            }
            lowest = Some(lowest.map_or(rect.bottom(), |l| l.max(rect.bottom())));
        }

        let fits = right_edge - left_edge + f64::EPSILON >= outer_width;
        match lowest {
            Some(lowest) if !fits => {
                // "If there is not enough horizontal room for the float, it
                // is shifted downward until either it fits or there are no
                // more floats present."
                log::debug!(
                    target: "weft::float",
                    "{id} does not fit between {left_edge} and {right_edge}; moving below {lowest}"
                );
                top = lowest + margins.top;
            }
            _ => {
                // STEP 3: Place the float.
                // [§ 9.5.1 Rule 9](https://www.w3.org/TR/CSS2/visuren.html#float-position)
                //
                // "A left-floating box must be put as far to the left as possible,
                // a right-floating box as far to the right as possible."
                let left = match side {
                    Float::Right => right_edge - margins.right - width,
                    Float::Left | Float::None => left_edge + margins.left,
                };
                log::debug!(target: "weft::float", "{id} floated {side:?} to ({left}, {top})");
                return Ok(FloatPlacement {
                    left,
                    top,
                    iterations: iteration,
                });
            }
        }
    }

    log::warn!(
        target: "weft::float",
        "{id}: float placement did not settle after {MAX_FLOAT_ITERATIONS} iterations"
    );
    Err(LayoutError::FloatPlacementExhausted {
        box_id: id,
        iterations: MAX_FLOAT_ITERATIONS,
    })
}
