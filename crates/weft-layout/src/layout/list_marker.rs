//! List item markers.
//!
//! [§ 12.5 Lists](https://www.w3.org/TR/CSS2/generate.html#lists)
//!
//! "An element with 'display: list-item' generates a principal block box
//! for the element's content and, depending on the values of
//! 'list-style-type' and 'list-style-image', possibly also a marker box as
//! a visual indication that the element is a list item."
//!
//! The marker box lives in the arena with the list item as its parent but
//! is not one of the item's children, so block flow never sees it.

use super::sizing::measure_words;
use crate::error::LayoutError;
use crate::geometry::{Point, Size};
use crate::host::LayoutContext;
use crate::style::actual::Side;
use crate::style::cache::Property;
use crate::style::keywords::{Display, ListStyleType};
use crate::tree::{BoxId, BoxKind, BoxTree};

/// Properties the marker takes from its list item.
const MARKER_FONT_PROPERTIES: [Property; 4] = [
    Property::FontFamily,
    Property::FontStyle,
    Property::FontWeight,
    Property::Color,
];

/// Synthesize (once) and position the marker of list item `item`.
///
/// # Errors
///
/// Propagates measurement failures of the marker glyph.
pub fn layout_marker(
    tree: &mut BoxTree,
    item: BoxId,
    ctx: &mut LayoutContext<'_>,
) -> Result<(), LayoutError> {
    let style = tree.list_style_type(item);
    if style == ListStyleType::None {
        if let Some(marker) = tree[item].list_marker {
            tree[marker].words.clear();
            tree[marker].size = Size::ZERO;
        }
        return Ok(());
    }

    let marker = match tree[item].list_marker {
        Some(marker) => marker,
        None => synthesize(tree, item),
    };
    let text = marker_text(style, ordinal(tree, item));
    tree.set_text(marker, &text);
    measure_words(tree, marker, ctx)?;

    let (width, height) = tree[marker]
        .words
        .iter()
        .fold((0.0, 0.0), |(w, h): (f64, f64), word| {
            (w + word.width + word.space_width, h.max(word.height))
        });

    // [§ 12.5.1 Lists: the 'list-style-position' property](https://www.w3.org/TR/CSS2/generate.html#propdef-list-style-position)
    //
    // "outside: The marker box is outside the principal block box."
    let x = tree.client_left(item) - width - ctx.container.config.marker_gap;
    let y = tree[item].location.y + tree.padding(item, Side::Top);

    let node = &mut tree[marker];
    node.location = Point::new(x, y);
    node.size = Size::new(width, height);
    let mut left = x;
    for word in &mut node.words {
        word.left = left;
        word.top = y;
        left += word.width + word.space_width;
    }
    Ok(())
}

fn synthesize(tree: &mut BoxTree, item: BoxId) -> BoxId {
    let marker = tree.alloc(BoxKind::Generic, None);
    tree[marker].parent = Some(item);
    tree.set_style(marker, Property::Display, "inline");
    tree.set_style(marker, Property::FontSize, "inherit");
    for property in MARKER_FONT_PROPERTIES {
        let raw = tree[item].style.raw(property).to_string();
        tree.set_style(marker, property, raw);
    }
    tree[item].list_marker = Some(marker);
    log::trace!(target: "weft::list", "{item}: synthesized marker {marker}");
    marker
}

/// One-based position of `item` among the list items of its parent,
/// shifted by the parent's `start` attribute.
fn ordinal(tree: &BoxTree, item: BoxId) -> i64 {
    let Some(parent) = tree.parent(item) else {
        return 1;
    };
    let start = tree[parent]
        .tag
        .as_ref()
        .and_then(|tag| tag.attribute("start"))
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(1);
    let preceding = tree
        .preceding_siblings(item)
        .filter(|&s| tree.display(s) == Display::ListItem)
        .count();
    start.saturating_add(i64::try_from(preceding).unwrap_or(i64::MAX))
}

/// [§ 12.6.2 Lists: the 'list-style-type' property](https://www.w3.org/TR/CSS2/generate.html#propdef-list-style-type)
#[must_use]
pub fn marker_text(style: ListStyleType, ordinal: i64) -> String {
    match style {
        ListStyleType::Disc => "\u{2022}".to_string(),
        ListStyleType::Circle => "o".to_string(),
        ListStyleType::Square => "\u{25a0}".to_string(),
        ListStyleType::Decimal => format!("{ordinal}."),
        ListStyleType::LowerAlpha => format!("{}.", alphabetic(ordinal)),
        ListStyleType::UpperAlpha => format!("{}.", alphabetic(ordinal).to_ascii_uppercase()),
        ListStyleType::LowerRoman => format!("{}.", roman(ordinal).to_ascii_lowercase()),
        ListStyleType::UpperRoman => format!("{}.", roman(ordinal)),
        ListStyleType::None => String::new(),
    }
}

/// "lower-latin or lower-alpha: Lowercase ascii letters (a, b, c, ... z)."
///
/// Past `z` the count continues `aa`, `ab`, ... Non-positive ordinals fall
/// back to decimal.
fn alphabetic(ordinal: i64) -> String {
    if ordinal < 1 {
        return ordinal.to_string();
    }
    let mut n = ordinal;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// "upper-roman: Uppercase roman numerals (I, II, III, IV, V, etc.)."
///
/// Roman numerals only cover 1 to 3999; other ordinals fall back to decimal.
fn roman(ordinal: i64) -> String {
    const NUMERALS: [(i64, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    if !(1..=3999).contains(&ordinal) {
        return ordinal.to_string();
    }
    let mut n = ordinal;
    let mut out = String::new();
    for (value, numeral) in NUMERALS {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Tag;

    #[test]
    fn test_marker_glyphs() {
        assert_eq!(marker_text(ListStyleType::Decimal, 3), "3.");
        assert_eq!(marker_text(ListStyleType::LowerAlpha, 1), "a.");
        assert_eq!(marker_text(ListStyleType::UpperAlpha, 28), "AB.");
        assert_eq!(marker_text(ListStyleType::LowerRoman, 14), "xiv.");
        assert_eq!(marker_text(ListStyleType::UpperRoman, 1994), "MCMXCIV.");
        assert_eq!(marker_text(ListStyleType::UpperRoman, 0), "0.");
        assert_eq!(marker_text(ListStyleType::Disc, 7), "\u{2022}");
    }

    #[test]
    fn test_ordinal_saturates_at_large_start() {
        let mut tree = BoxTree::new();
        tree[BoxId::ROOT].tag = Some(Tag {
            name: "ol".to_string(),
            attributes: [("start".to_string(), i64::MAX.to_string())]
                .into_iter()
                .collect(),
        });
        let first = tree.append_new(BoxId::ROOT, BoxKind::Generic, None);
        tree.set_style(first, Property::Display, "list-item");
        let second = tree.append_new(BoxId::ROOT, BoxKind::Generic, None);
        tree.set_style(second, Property::Display, "list-item");

        assert_eq!(ordinal(&tree, first), i64::MAX);
        assert_eq!(ordinal(&tree, second), i64::MAX);
    }
}
