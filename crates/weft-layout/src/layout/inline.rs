//! CSS Inline Layout and Line Box Model.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "In an inline formatting context, boxes are laid out horizontally, one
//! after the other, beginning at the top of a containing block. Horizontal
//! margins, borders, and padding are respected between these boxes."
//!
//! [§ 10.8 Line height calculations: the 'line-height' and 'vertical-align' properties](https://www.w3.org/TR/CSS2/visudet.html#line-height)
//!
//! "The height of the line box is determined by the rules given in the
//! section on line height calculations."

use std::collections::BTreeMap;

use serde::Serialize;

use super::sizing::collect_inline_words;
use crate::error::LayoutError;
use crate::geometry::Rect;
use crate::host::LayoutContext;
use crate::style::actual::Side;
use crate::style::cache::Property;
use crate::style::keywords::{Display, TextAlign};
use crate::tree::{BoxId, BoxTree};

/// A word in an inline formatting context, addressed by its owning box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WordRef {
    /// Box that owns the word.
    pub owner: BoxId,
    /// Index into the owner's `words`.
    pub index: usize,
}

/// [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
///
/// "The rectangular area that contains the boxes that form a line is called
/// a line box."
///
/// A box may contribute to several lines; `rects` holds the part of each
/// contributing box that lies on this line.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineBox {
    /// Words placed on this line, in order.
    pub words: Vec<WordRef>,
    /// Contributing box to its accumulated rectangle on this line.
    pub rects: BTreeMap<BoxId, Rect>,
}

impl LineBox {
    /// Tallest rectangle on the line.
    #[must_use]
    pub fn line_height(&self) -> f64 {
        self.rects.values().map(|r| r.height).fold(0.0, f64::max)
    }

    /// Lowest rectangle bottom on the line.
    #[must_use]
    pub fn line_bottom(&self) -> f64 {
        self.rects.values().map(Rect::bottom).fold(0.0, f64::max)
    }

    fn include(&mut self, id: BoxId, rect: Rect) {
        let _ = self
            .rects
            .entry(id)
            .and_modify(|r| *r = r.union(&rect))
            .or_insert(rect);
    }
}

/// Lays out the inline content of a block container.
///
/// Implementations populate `line_boxes` of the block, position every word
/// owned by it or its inline-level descendants, give inline descendants
/// their geometry, and grow the block's bottom below the last line.
pub trait InlineFormatter {
    /// Format the inline content of block `id`, whose location and width
    /// are already resolved.
    ///
    /// # Errors
    ///
    /// Propagates measurement failures.
    fn format(
        &self,
        tree: &mut BoxTree,
        id: BoxId,
        ctx: &mut LayoutContext<'_>,
    ) -> Result<(), LayoutError>;
}

/// First-fit line breaking at word boundaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyLineBreaker;

impl InlineFormatter for GreedyLineBreaker {
    fn format(
        &self,
        tree: &mut BoxTree,
        id: BoxId,
        ctx: &mut LayoutContext<'_>,
    ) -> Result<(), LayoutError> {
        let mut words = Vec::new();
        collect_inline_words(tree, id, ctx, &mut words)?;

        let left = tree.client_left(id);
        let right = tree.client_right(id);
        let available = (right - left).max(0.0);
        let text_indent = tree.actual_length(id, Property::TextIndent);
        let align = tree.text_align(id);
        let font = tree.actual_font(id, ctx.fonts, ctx.measurer)?;
        let strut = tree
            .actual_definite(id, Property::LineHeight)
            .unwrap_or(font.height);

        // STEP 1: Break words into lines.
        // [§ 16.1 Indentation](https://www.w3.org/TR/CSS2/text.html#indentation-prop)
        //
        // "This property specifies the indentation of the first line of
        // text in a block container."
        let mut lines: Vec<Vec<(WordRef, f64)>> = Vec::new();
        let mut current: Vec<(WordRef, f64)> = Vec::new();
        let mut x = text_indent;
        for word_ref in words {
            let word = &tree[word_ref.owner].words[word_ref.index];
            let (width, space) = (word.width, word.space_width);
            if !current.is_empty() && x + width > available {
                lines.push(std::mem::take(&mut current));
                x = 0.0;
            }
            current.push((word_ref, x));
            x += width + space;
        }
        if !current.is_empty() {
            lines.push(current);
        }

        // STEP 2: Position each line.
        let mut line_top = tree.client_top(id);
        let mut line_boxes = Vec::with_capacity(lines.len());
        for line in lines {
            let tallest = line
                .iter()
                .map(|(w, _)| tree[w.owner].words[w.index].height)
                .fold(0.0, f64::max);
            // [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
            //
            // "The height of the line box is the distance between the
            // uppermost box top and the lowermost box bottom."
            let line_height = strut.max(tallest);

            // [§ 16.2 Alignment: the 'text-align' property](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
            let used = line.last().map_or(0.0, |(w, offset)| {
                offset + tree[w.owner].words[w.index].width
            });
            let shift = match align {
                TextAlign::Right => (available - used).max(0.0),
                TextAlign::Center => ((available - used) / 2.0).max(0.0),
                TextAlign::Left | TextAlign::Justify => 0.0,
            };

            let mut line_box = LineBox::default();
            for (word_ref, offset) in line {
                let word = &mut tree[word_ref.owner].words[word_ref.index];
                word.left = left + offset + shift;
                // Images sit on the baseline; text is centered in its
                // half-leading.
                word.top = if word.is_image() {
                    line_top + line_height - word.height
                } else {
                    line_top + (line_height - word.height) / 2.0
                };
                let rect = word.rect();
                line_box.words.push(word_ref);

                let mut owner = Some(word_ref.owner);
                while let Some(contributor) = owner {
                    line_box.include(contributor, rect);
                    owner = if contributor == id {
                        None
                    } else {
                        tree.parent(contributor)
                    };
                }
            }
            line_top += line_height;
            line_boxes.push(line_box);
        }

        // STEP 3: Inline boxes cover their fragments.
        let inline_boxes = inline_descendants(tree, id);
        for &inline in &inline_boxes {
            let mut bounds: Option<Rect> = None;
            for line in &line_boxes {
                if let Some(rect) = line.rects.get(&inline) {
                    bounds = Some(bounds.map_or(*rect, |b| b.union(rect)));
                }
            }
            let node = &mut tree[inline];
            match bounds {
                Some(bounds) => {
                    node.location.x = bounds.x;
                    node.location.y = bounds.y;
                    node.size.width = bounds.width;
                    node.size.height = bounds.height;
                }
                None => {
                    node.location.x = left;
                    node.location.y = line_top;
                    node.size.width = 0.0;
                    node.size.height = 0.0;
                }
            }
        }

        // STEP 4: Grow the block below its last line.
        let padding_bottom = tree.padding(id, Side::Bottom);
        let border_bottom = tree.border_width(id, Side::Bottom);
        let bottom = tree[id].bottom().max(line_top + padding_bottom + border_bottom);
        log::trace!(
            target: "weft::inline",
            "{id}: {} line(s), {} inline box(es)",
            line_boxes.len(),
            inline_boxes.len()
        );
        let node = &mut tree[id];
        node.set_bottom(bottom);
        node.line_boxes = line_boxes;
        Ok(())
    }
}

/// Displayed inline-level descendants of `id` that belong to its inline
/// formatting context.
fn inline_descendants(tree: &BoxTree, id: BoxId) -> Vec<BoxId> {
    let mut out = Vec::new();
    let mut stack: Vec<BoxId> = tree.children(id).iter().rev().copied().collect();
    while let Some(next) = stack.pop() {
        let display = tree.used_display(next);
        if display == Display::None || !display.is_inline_level() {
            continue;
        }
        out.push(next);
        stack.extend(tree.children(next).iter().rev());
    }
    out
}
