//! Table layout seam.
//!
//! [§ 17 Tables](https://www.w3.org/TR/CSS2/tables.html)
//!
//! "In a visual medium, CSS tables can also be used to achieve specific
//! layouts."
//!
//! The table algorithm is injected through [`TableFormatter`]. The default
//! [`BlockTableFallback`] stacks rows as blocks and shares a row's width
//! evenly between its cells.

use weft_common::warning::warn_once;

use super::block::{layout_box, resolve_width};
use crate::error::LayoutError;
use crate::geometry::Point;
use crate::host::LayoutContext;
use crate::style::actual::Side;
use crate::style::keywords::Display;
use crate::tree::{BoxId, BoxKind, BoxTree};

/// Lays out the inside of a table box.
pub trait TableFormatter {
    /// Lay out the rows and cells of table `id`. The table's location is
    /// already resolved; its width is owned by the formatter.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Table`] for table structures the formatter
    /// cannot lay out.
    fn format(
        &self,
        tree: &mut BoxTree,
        id: BoxId,
        ctx: &mut LayoutContext<'_>,
    ) -> Result<(), LayoutError>;
}

/// Lays tables out as stacked blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockTableFallback;

impl TableFormatter for BlockTableFallback {
    fn format(
        &self,
        tree: &mut BoxTree,
        id: BoxId,
        ctx: &mut LayoutContext<'_>,
    ) -> Result<(), LayoutError> {
        warn_once(
            "Layout",
            "table layout is not available; tables are laid out as stacked blocks",
        );
        resolve_width(tree, id, ctx)?;
        stack(tree, id, ctx)
    }
}

/// Stack the row groups, rows, and captions of `container` top to bottom.
fn stack(tree: &mut BoxTree, container: BoxId, ctx: &mut LayoutContext<'_>) -> Result<(), LayoutError> {
    let left = tree.client_left(container);
    let width = tree.content_width(container);
    let mut y = tree.client_top(container);

    for child in tree.children(container).to_vec() {
        match tree.used_display(child) {
            Display::None => continue,
            Display::TableColumn | Display::TableColumnGroup => {
                let node = &mut tree[child];
                node.location = Point::new(left, y);
                node.size.width = 0.0;
                node.size.height = 0.0;
                continue;
            }
            Display::TableRowGroup | Display::TableHeaderGroup | Display::TableFooterGroup => {
                begin_row(tree, child, left, y, width);
                stack(tree, child, ctx)?;
            }
            Display::TableRow => {
                begin_row(tree, child, left, y, width);
                row(tree, child, ctx)?;
            }
            // Captions and stray content flow as blocks after the previous
            // row.
            _ => layout_box(tree, child, ctx),
        }
        y = y.max(tree[child].bottom());
    }

    let padding_bottom = tree.padding(container, Side::Bottom);
    let border_bottom = tree.border_width(container, Side::Bottom);
    let bottom = tree[container].bottom().max(y + padding_bottom + border_bottom);
    tree[container].set_bottom(bottom);
    Ok(())
}

fn begin_row(tree: &mut BoxTree, id: BoxId, left: f64, top: f64, width: f64) {
    let node = &mut tree[id];
    node.location = Point::new(left, top);
    node.size.width = width;
    node.size.height = 0.0;
}

/// Lay the cells of `row` side by side.
fn row(tree: &mut BoxTree, row: BoxId, ctx: &mut LayoutContext<'_>) -> Result<(), LayoutError> {
    let cells: Vec<BoxId> = tree
        .children(row)
        .iter()
        .copied()
        .filter(|&c| tree.display(c) != Display::None)
        .collect();
    if cells.is_empty() {
        return Ok(());
    }
    let top = tree[row].location.y;
    let left = tree[row].location.x;
    let slot = tree[row].size.width / cells.len() as f64;

    let mut bottom = top;
    for (i, &cell) in cells.iter().enumerate() {
        if let BoxKind::SpacingCell { extended, .. } = tree[cell].kind {
            // [§ 17.2 The CSS table model](https://www.w3.org/TR/CSS2/tables.html#table-display)
            //
            // A row-spanning cell occupies slots in later rows; the
            // placeholder mirrors its horizontal extent.
            if tree.display(extended) != Display::TableCell {
                return Err(LayoutError::Table(format!(
                    "spacing cell {cell} stands in for {extended}, which is not a table cell"
                )));
            }
            let x = tree[extended].location.x;
            let width = tree[extended].size.width;
            let node = &mut tree[cell];
            node.location = Point::new(x, top);
            node.size.width = width;
            node.size.height = 0.0;
            continue;
        }

        let node = &mut tree[cell];
        node.location = Point::new(left + slot * i as f64, top);
        node.size.width = slot;
        layout_box(tree, cell, ctx);
        bottom = bottom.max(tree[cell].bottom());
    }
    tree[row].set_bottom(bottom);
    Ok(())
}
