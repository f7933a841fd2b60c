//! Word measurement and intrinsic widths.
//!
//! [§ 10.3.5 Floating, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#float-width)
//!
//! "Calculation of the shrink-to-fit width is similar to calculating the
//! width of a table cell using the automatic table layout algorithm.
//! Roughly: calculate the preferred width by formatting the content without
//! breaking lines other than where explicit line breaks occur, and also
//! calculate the preferred minimum width, e.g., by trying all possible line
//! breaks."

use super::inline::WordRef;
use crate::error::LayoutError;
use crate::geometry::Size;
use crate::host::LayoutContext;
use crate::style::cache::Property;
use crate::style::keywords::Display;
use crate::tree::{BoxId, BoxKind, BoxTree, ImageState, WordContent};

/// Measure every word owned directly by `id`.
///
/// # Errors
///
/// Propagates failures of the injected measurer.
pub fn measure_words(
    tree: &mut BoxTree,
    id: BoxId,
    ctx: &mut LayoutContext<'_>,
) -> Result<(), LayoutError> {
    if tree[id].words.is_empty() {
        return Ok(());
    }
    if let BoxKind::Image(state) = tree[id].kind {
        let size = image_size(tree, id, state);
        if let Some(word) = tree[id].words.first_mut() {
            word.width = size.width;
            word.height = size.height;
        }
        return Ok(());
    }

    let font = tree.actual_font(id, ctx.fonts, ctx.measurer)?;
    let word_spacing = tree.actual_length(id, Property::WordSpacing);
    let space = ctx.measurer.measure_text(" ", &font)?.width + word_spacing;
    for index in 0..tree[id].words.len() {
        let WordContent::Text(text) = &tree[id].words[index].content else {
            continue;
        };
        let measured = ctx.measurer.measure_text(text, &font)?;
        let word = &mut tree[id].words[index];
        word.width = measured.width;
        word.height = measured.height.max(font.height);
        word.space_width = if word.has_space_after { space } else { 0.0 };
    }
    Ok(())
}

/// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
///
/// "If 'height' and 'width' both have computed values of 'auto' and the
/// element also has an intrinsic width, then that intrinsic width is the
/// used value of 'width'."
///
/// "Otherwise, if 'width' has a computed value of 'auto', and the element
/// has an intrinsic ratio then the used value of 'width' is: (used height) *
/// (intrinsic ratio)"
///
/// Pending and failed images without an explicit size measure 0x0.
pub fn image_size(tree: &mut BoxTree, id: BoxId, state: ImageState) -> Size {
    let width = tree.actual_definite(id, Property::Width);
    let height = tree.actual_definite(id, Property::Height);
    let intrinsic = match state {
        ImageState::Loaded { width, height } => Some((width, height)),
        ImageState::Pending | ImageState::Failed => None,
    };

    let (mut w, mut h) = match (width, height, intrinsic) {
        (Some(w), Some(h), _) => (w, h),
        (Some(w), None, Some((iw, ih))) if iw > 0.0 => (w, w * ih / iw),
        (None, Some(h), Some((iw, ih))) if ih > 0.0 => (h * iw / ih, h),
        (Some(w), None, _) => (w, 0.0),
        (None, Some(h), _) => (0.0, h),
        (None, None, Some((iw, ih))) => (iw, ih),
        (None, None, None) => (0.0, 0.0),
    };

    if let Some(max) = tree.actual_definite(id, Property::MaxWidth)
        && w > max
    {
        if w > 0.0 {
            h *= max / w;
        }
        w = max;
    }
    Size::new(w, h)
}

/// Whether every displayed child of `id` is inline-level, so its content
/// lays out as lines.
#[must_use]
pub fn has_inline_content(tree: &BoxTree, id: BoxId) -> bool {
    tree.children(id).iter().all(|&child| {
        let display = tree.used_display(child);
        display == Display::None || display.is_inline_level()
    })
}

/// Words of `id` and its inline-level descendants, in document order,
/// measured.
///
/// # Errors
///
/// Propagates measurement failures.
pub fn collect_inline_words(
    tree: &mut BoxTree,
    id: BoxId,
    ctx: &mut LayoutContext<'_>,
    out: &mut Vec<WordRef>,
) -> Result<(), LayoutError> {
    measure_words(tree, id, ctx)?;
    out.extend((0..tree[id].words.len()).map(|index| WordRef { owner: id, index }));
    for child in tree.children(id).to_vec() {
        let display = tree.used_display(child);
        if display == Display::None || !display.is_inline_level() {
            continue;
        }
        collect_inline_words(tree, child, ctx, out)?;
    }
    Ok(())
}

/// Width of the widest word below `id`, plus the horizontal padding and
/// borders of every box between that word and `id`.
pub fn minimum_width(tree: &mut BoxTree, id: BoxId) -> f64 {
    let mut widest = 0.0;
    let mut owner = None;
    for candidate in std::iter::once(id).chain(tree.descendants(id)) {
        for word in &tree[candidate].words {
            if word.width > widest {
                widest = word.width;
                owner = Some(candidate);
            }
        }
    }

    let mut insets = 0.0;
    let mut current = owner;
    while let Some(box_id) = current {
        insets += tree.paddings(box_id).horizontal() + tree.borders(box_id).horizontal();
        current = if box_id == id {
            None
        } else {
            tree.parent(box_id)
        };
    }
    widest + insets
}

/// Sum of horizontal margins of `id` and all of its ancestors.
pub fn deep_margin_sum(tree: &mut BoxTree, id: BoxId) -> f64 {
    let mut sum = tree.margins(id).horizontal();
    for ancestor in tree.ancestors(id).collect::<Vec<_>>() {
        sum += tree.margins(ancestor).horizontal();
    }
    sum
}

/// Border-box width of `id` laid out without any line breaks.
///
/// Percentages have no basis yet and count as 0; nothing is memoized.
///
/// # Errors
///
/// Propagates measurement failures.
pub fn preferred_width(
    tree: &mut BoxTree,
    id: BoxId,
    ctx: &mut LayoutContext<'_>,
) -> Result<f64, LayoutError> {
    let insets = horizontal_insets(tree, id);
    if tree[id].style.raw(Property::Width).trim() != "auto"
        && let Some(width) = tree.length_without_basis(id, Property::Width)
    {
        return Ok(width + insets);
    }

    let content = if has_inline_content(tree, id) {
        let mut words = Vec::new();
        collect_inline_words(tree, id, ctx, &mut words)?;
        let mut width = 0.0;
        for (i, word) in words.iter().enumerate() {
            let word = &tree[word.owner].words[word.index];
            width += word.width;
            if i + 1 < words.len() {
                width += word.space_width;
            }
        }
        width
    } else {
        let mut widest: f64 = 0.0;
        for child in tree.children(id).to_vec() {
            if tree.display(child) == Display::None || tree.position(child).is_out_of_flow() {
                continue;
            }
            let child_width = preferred_width(tree, child, ctx)? + horizontal_margins(tree, child);
            widest = widest.max(child_width);
        }
        widest
    };

    let mut content = content;
    if let Some(max) = tree.length_without_basis(id, Property::MaxWidth) {
        content = content.min(max);
    }
    if let Some(min) = tree.length_without_basis(id, Property::MinWidth) {
        content = content.max(min);
    }
    Ok(content + insets)
}

fn horizontal_insets(tree: &mut BoxTree, id: BoxId) -> f64 {
    [
        Property::PaddingLeft,
        Property::PaddingRight,
        Property::BorderLeftWidth,
        Property::BorderRightWidth,
    ]
    .into_iter()
    .filter_map(|p| tree.length_without_basis(id, p))
    .sum()
}

fn horizontal_margins(tree: &mut BoxTree, id: BoxId) -> f64 {
    [Property::MarginLeft, Property::MarginRight]
        .into_iter()
        .filter_map(|p| tree.length_without_basis(id, p))
        .sum()
}
