//! Keyword-valued properties.
//!
//! These are re-parsed from the raw string on every read; they carry no
//! memoized actual value.

use std::str::FromStr;

use serde::Serialize;
use strum_macros::{EnumString, IntoStaticStr};
use weft_common::warning::warn_once;

/// Parse a keyword, falling back to the default (with a one-time warning)
/// when the raw value is not recognized.
pub(crate) fn parse_keyword<T>(raw: &str, property: &str) -> T
where
    T: FromStr + Default,
{
    let trimmed = raw.trim();
    T::from_str(trimmed).unwrap_or_else(|_| {
        warn_once("CSS", &format!("unsupported value '{trimmed}' for '{property}'"));
        T::default()
    })
}

/// [§ 9.2.4 The 'display' property](https://www.w3.org/TR/CSS2/visuren.html#display-prop)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Display {
    /// "This value causes an element to not generate any boxes in the
    /// formatting structure."
    None,
    /// "This value causes an element to generate one or more inline boxes."
    #[default]
    Inline,
    /// "This value causes an element to generate a block box."
    Block,
    /// "This value causes an element to generate an inline-level block
    /// container."
    InlineBlock,
    /// "This value causes an element to generate a principal block box and
    /// a marker box."
    ListItem,
    /// A block-level table.
    Table,
    /// An inline-level table.
    InlineTable,
    /// A group of rows.
    TableRowGroup,
    /// Header rows.
    TableHeaderGroup,
    /// Footer rows.
    TableFooterGroup,
    /// A table row.
    TableRow,
    /// A group of columns.
    TableColumnGroup,
    /// A single column.
    TableColumn,
    /// A table cell.
    TableCell,
    /// A table caption.
    TableCaption,
}

impl Display {
    /// Whether boxes with this display participate in an inline formatting
    /// context of their parent.
    #[must_use]
    pub const fn is_inline_level(self) -> bool {
        matches!(self, Self::Inline | Self::InlineBlock)
    }

    /// Whether the block layout pass resolves this box's width and
    /// position itself.
    #[must_use]
    pub const fn is_block_like(self) -> bool {
        matches!(
            self,
            Self::Block | Self::ListItem | Self::Table | Self::InlineTable | Self::TableCell
        )
    }

    /// Rows, row groups and columns: table-internal boxes other than cells.
    #[must_use]
    pub const fn is_table_group(self) -> bool {
        matches!(
            self,
            Self::TableRowGroup
                | Self::TableHeaderGroup
                | Self::TableFooterGroup
                | Self::TableRow
                | Self::TableColumnGroup
                | Self::TableColumn
        )
    }
}

/// [§ 9.3.1 Choosing a positioning scheme](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Position {
    /// "The box is a normal box, laid out according to the normal flow."
    #[default]
    Static,
    /// "The box's position is calculated according to the normal flow.
    /// Then the box is offset relative to its normal position."
    Relative,
    /// "The box's position (and possibly size) is specified with the 'top',
    /// 'right', 'bottom', and 'left' properties."
    Absolute,
    /// "The box's position is calculated according to the 'absolute' model,
    /// but in addition, the box is fixed with respect to some reference."
    Fixed,
}

impl Position {
    /// Absolute and fixed boxes are taken out of the normal flow.
    #[must_use]
    pub const fn is_out_of_flow(self) -> bool {
        matches!(self, Self::Absolute | Self::Fixed)
    }
}

/// [§ 9.5.1 Positioning the float](https://www.w3.org/TR/CSS2/visuren.html#float-position)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Float {
    /// "The box is not floated."
    #[default]
    None,
    /// "The element generates a block box that is floated to the left."
    Left,
    /// "The element generates a block box that is floated to the right."
    Right,
}

/// [§ 9.5.2 The 'clear' property](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Clear {
    /// "No constraint on the box's position with respect to floats."
    #[default]
    None,
    /// Below any left-floating boxes.
    Left,
    /// Below any right-floating boxes.
    Right,
    /// Below any floating boxes.
    Both,
}

impl Clear {
    /// Whether a float on `side` must be cleared.
    #[must_use]
    pub const fn clears(self, side: Float) -> bool {
        match self {
            Self::None => false,
            Self::Both => !matches!(side, Float::None),
            Self::Left => matches!(side, Float::Left),
            Self::Right => matches!(side, Float::Right),
        }
    }
}

/// [§ 11.1.1 Overflow](https://www.w3.org/TR/CSS2/visufx.html#overflow)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Overflow {
    /// "Content is not clipped."
    #[default]
    Visible,
    /// "Content is clipped and no scrolling user interface should be
    /// provided."
    Hidden,
    /// "Content is clipped and a scrolling mechanism is provided."
    Scroll,
    /// UA-dependent.
    Auto,
}

/// [§ 8.5.3 Border style](https://www.w3.org/TR/CSS2/box.html#border-style-properties)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[allow(missing_docs)]
pub enum BorderStyle {
    /// "No border; the computed border width is zero."
    #[default]
    None,
    /// "Same as 'none', except in terms of border conflict resolution for
    /// table elements."
    Hidden,
    Dotted,
    Dashed,
    Solid,
    Double,
    Groove,
    Ridge,
    Inset,
    Outset,
}

impl BorderStyle {
    /// `none` and `hidden` force the border width to zero.
    #[must_use]
    pub const fn has_width(self) -> bool {
        !matches!(self, Self::None | Self::Hidden)
    }
}

/// [§ 12.5.1 Lists](https://www.w3.org/TR/CSS2/generate.html#propdef-list-style-type)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[allow(missing_docs)]
pub enum ListStyleType {
    #[default]
    Disc,
    Circle,
    Square,
    Decimal,
    LowerAlpha,
    UpperAlpha,
    LowerRoman,
    UpperRoman,
    None,
}

/// [§ 16.2 Alignment](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[allow(missing_docs)]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
    /// Laid out as `left`.
    Justify,
}

/// [§ 15.7 Font styling](https://www.w3.org/TR/CSS2/fonts.html#font-styling)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[allow(missing_docs)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

/// [§ 13.3.2 Breaks inside elements](https://www.w3.org/TR/CSS2/page.html#page-break-props)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum PageBreakInside {
    /// "Neither force nor forbid a page break inside the generated box."
    #[default]
    Auto,
    /// "Avoid a page break inside the generated box."
    Avoid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_parse_case_insensitively() {
        assert_eq!(Display::from_str("LIST-ITEM"), Ok(Display::ListItem));
        assert_eq!(Display::from_str("inline-table"), Ok(Display::InlineTable));
        assert_eq!(Float::from_str("Right"), Ok(Float::Right));
        let name: &'static str = Display::TableCell.into();
        assert_eq!(name, "table-cell");
    }

    #[test]
    fn test_unknown_keyword_falls_back_to_default() {
        let display: Display = parse_keyword("flex", "display");
        assert_eq!(display, Display::Inline);
        let overflow: Overflow = parse_keyword(" hidden ", "overflow");
        assert_eq!(overflow, Overflow::Hidden);
    }

    #[test]
    fn test_clear_sides() {
        assert!(Clear::Both.clears(Float::Left));
        assert!(Clear::Left.clears(Float::Left));
        assert!(!Clear::Left.clears(Float::Right));
        assert!(!Clear::None.clears(Float::Right));
    }
}
