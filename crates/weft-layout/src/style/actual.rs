//! Actual value resolution.
//!
//! [§ 6.1 Specified, computed, and actual values](https://www.w3.org/TR/CSS2/cascade.html#value-stages)
//!
//! "A used value is in principle the value used for rendering, but a user
//! agent may not be able to make use of the value in a given environment."
//!
//! Resolution needs more than the box's own cache (the containing block's
//! width, the parent's font size), so the getters live on [`BoxTree`] and
//! take a [`BoxId`]. Each getter resolves at most once per invalidation and
//! stores the result back into the box's [`StyleValueCache`].
//!
//! [`StyleValueCache`]: super::cache::StyleValueCache

use weft_common::warning::warn_once;

use super::cache::{Actual, Property};
use super::keywords::{
    BorderStyle, Clear, Display, Float, FontStyle, ListStyleType, Overflow, PageBreakInside,
    Position, TextAlign, parse_keyword,
};
use super::values::{
    Color, DEFAULT_FONT_SIZE_PX, FONT_SIZE_STEP, absolute_font_size,
    border_width_keyword, parse_angle, parse_length, parse_number,
};
use crate::error::{LayoutError, MeasureError};
use crate::fonts::{Font, FontCache, FontRequest, TextMeasurer};
use crate::geometry::{BoxEdges, Size};
use crate::tree::{BoxId, BoxTree};

/// The four sides, in CSS order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    const fn margin(self) -> Property {
        match self {
            Self::Top => Property::MarginTop,
            Self::Right => Property::MarginRight,
            Self::Bottom => Property::MarginBottom,
            Self::Left => Property::MarginLeft,
        }
    }

    const fn padding(self) -> Property {
        match self {
            Self::Top => Property::PaddingTop,
            Self::Right => Property::PaddingRight,
            Self::Bottom => Property::PaddingBottom,
            Self::Left => Property::PaddingLeft,
        }
    }

    const fn border_width(self) -> Property {
        match self {
            Self::Top => Property::BorderTopWidth,
            Self::Right => Property::BorderRightWidth,
            Self::Bottom => Property::BorderBottomWidth,
            Self::Left => Property::BorderLeftWidth,
        }
    }

    const fn border_style(self) -> Property {
        match self {
            Self::Top => Property::BorderTopStyle,
            Self::Right => Property::BorderRightStyle,
            Self::Bottom => Property::BorderBottomStyle,
            Self::Left => Property::BorderLeftStyle,
        }
    }

    const fn of_border_width(property: Property) -> Option<Self> {
        match property {
            Property::BorderTopWidth => Some(Self::Top),
            Property::BorderRightWidth => Some(Self::Right),
            Property::BorderBottomWidth => Some(Self::Bottom),
            Property::BorderLeftWidth => Some(Self::Left),
            _ => None,
        }
    }
}

/// What a percentage of a property refers to.
enum Basis {
    ContainingWidth,
    ContainingHeight,
    OwnWidth,
    FontSize,
}

impl BoxTree {
    // ----- keywords -------------------------------------------------------

    /// Resolved `display`.
    #[must_use]
    pub fn display(&self, id: BoxId) -> Display {
        parse_keyword(self[id].style.raw(Property::Display), "display")
    }

    /// [§ 9.7 Relationships between 'display', 'position', and 'float'](https://www.w3.org/TR/CSS2/visuren.html#dis-pos-flo)
    ///
    /// "Otherwise, if 'position' has the value 'absolute' or 'fixed', the
    /// box is absolutely positioned [...] and the value of 'display' is set
    /// according to the table below."
    ///
    /// Floated and absolutely positioned boxes are blockified. Captions lay
    /// out as blocks.
    #[must_use]
    pub fn used_display(&self, id: BoxId) -> Display {
        let display = self.display(id);
        let blockify = self.is_floated(id) || self.position(id).is_out_of_flow();
        match display {
            Display::InlineTable if blockify => Display::Table,
            Display::Inline | Display::InlineBlock if blockify => Display::Block,
            Display::TableCaption => Display::Block,
            other if blockify && other.is_table_group() => Display::Block,
            other => other,
        }
    }

    /// Resolved `position`.
    #[must_use]
    pub fn position(&self, id: BoxId) -> Position {
        parse_keyword(self[id].style.raw(Property::Position), "position")
    }

    /// Resolved `float`.
    #[must_use]
    pub fn float(&self, id: BoxId) -> Float {
        parse_keyword(self[id].style.raw(Property::Float), "float")
    }

    /// Whether the box is floated.
    #[must_use]
    pub fn is_floated(&self, id: BoxId) -> bool {
        self.float(id) != Float::None
    }

    /// Resolved `clear`.
    #[must_use]
    pub fn clear(&self, id: BoxId) -> Clear {
        parse_keyword(self[id].style.raw(Property::Clear), "clear")
    }

    /// Resolved `overflow`.
    #[must_use]
    pub fn overflow(&self, id: BoxId) -> Overflow {
        parse_keyword(self[id].style.raw(Property::Overflow), "overflow")
    }

    /// Resolved border style of one side.
    #[must_use]
    pub fn border_style(&self, id: BoxId, side: Side) -> BorderStyle {
        parse_keyword(self[id].style.raw(side.border_style()), "border-style")
    }

    /// Resolved `list-style-type`.
    #[must_use]
    pub fn list_style_type(&self, id: BoxId) -> ListStyleType {
        parse_keyword(self[id].style.raw(Property::ListStyleType), "list-style-type")
    }

    /// Resolved `text-align`.
    #[must_use]
    pub fn text_align(&self, id: BoxId) -> TextAlign {
        parse_keyword(self[id].style.raw(Property::TextAlign), "text-align")
    }

    /// Resolved `page-break-inside`.
    #[must_use]
    pub fn page_break_inside(&self, id: BoxId) -> PageBreakInside {
        parse_keyword(
            self[id].style.raw(Property::PageBreakInside),
            "page-break-inside",
        )
    }

    /// `z-index`, `None` for `auto`.
    #[must_use]
    pub fn z_index(&self, id: BoxId) -> Option<i32> {
        let raw = self[id].style.raw(Property::ZIndex).trim();
        if raw.eq_ignore_ascii_case("auto") {
            return None;
        }
        let parsed = parse_number(raw).map(|n| n as i32);
        if parsed.is_none() {
            warn_once("CSS", &format!("unsupported value '{raw}' for 'z-index'"));
        }
        parsed
    }

    // ----- containing block -----------------------------------------------

    /// [§ 10.1 Definition of "containing block"](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
    ///
    /// "For other elements, if the element's position is 'relative' or
    /// 'static', the containing block is formed by the content edge of the
    /// nearest block container ancestor box."
    ///
    /// The root is its own containing block.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NoContainingBlock`] when the ancestor chain ends at a
    /// detached box without passing a block container.
    pub fn containing_block(&self, id: BoxId) -> Result<BoxId, LayoutError> {
        if id == BoxId::ROOT {
            return Ok(id);
        }
        for ancestor in self.ancestors(id) {
            let display = self.display(ancestor);
            if ancestor == BoxId::ROOT || display.is_block_like() || display == Display::InlineBlock
            {
                return Ok(ancestor);
            }
        }
        Err(LayoutError::NoContainingBlock(id))
    }

    /// Content width of the containing block, the basis for horizontal
    /// percentages. For the root this is the initial containing block.
    pub fn containing_block_width(&mut self, id: BoxId) -> f64 {
        match self.containing_block(id) {
            Ok(cb) if cb != id => self.content_width(cb),
            _ => self.initial_containing_block.width,
        }
    }

    /// Content height of the containing block when it is definite.
    fn containing_block_height(&mut self, id: BoxId) -> Option<f64> {
        match self.containing_block(id) {
            Ok(cb) if cb != id => self.definite_height(cb),
            _ => Some(self.initial_containing_block.height).filter(|h| *h > 0.0),
        }
    }

    fn definite_height(&mut self, id: BoxId) -> Option<f64> {
        if id == BoxId::ROOT && !self[id].style.is_specified(Property::Height) {
            return Some(self.initial_containing_block.height).filter(|h| *h > 0.0);
        }
        self.get_actual(id, Property::Height).definite()
    }

    /// Border-box width minus horizontal padding and border.
    pub fn content_width(&mut self, id: BoxId) -> f64 {
        let inner = self.paddings(id).horizontal() + self.borders(id).horizontal();
        (self[id].size.width - inner).max(0.0)
    }

    /// Left edge of the content box.
    pub fn client_left(&mut self, id: BoxId) -> f64 {
        self[id].location.x + self.border_width(id, Side::Left) + self.padding(id, Side::Left)
    }

    /// Top edge of the content box.
    pub fn client_top(&mut self, id: BoxId) -> f64 {
        self[id].location.y + self.border_width(id, Side::Top) + self.padding(id, Side::Top)
    }

    /// Right edge of the content box.
    pub fn client_right(&mut self, id: BoxId) -> f64 {
        self[id].right() - self.border_width(id, Side::Right) - self.padding(id, Side::Right)
    }

    // ----- lengths --------------------------------------------------------

    /// The actual value of `property`, resolving and memoizing on first
    /// access after a `set_raw`.
    pub fn get_actual(&mut self, id: BoxId, property: Property) -> Actual {
        // A border's width is zero while its style is none. The style can
        // change without touching the width slot, so check on every read.
        if let Some(side) = Side::of_border_width(property)
            && !self.border_style(id, side).has_width()
        {
            return Actual::Length(0.0);
        }
        if let Some(actual) = self[id].style.memo(property) {
            return actual;
        }
        let actual = self.resolve(id, property);
        self[id].style.store(property, actual);
        actual
    }

    /// A length property in pixels; `auto` reads as 0.
    pub fn actual_length(&mut self, id: BoxId, property: Property) -> f64 {
        self.get_actual(id, property).length_or_zero()
    }

    /// A length property in pixels, `None` for `auto`/`none`.
    pub fn actual_definite(&mut self, id: BoxId, property: Property) -> Option<f64> {
        self.get_actual(id, property).definite()
    }

    /// A color property.
    pub fn actual_color(&mut self, id: BoxId, property: Property) -> Color {
        match self.get_actual(id, property) {
            Actual::Color(color) => color,
            _ => Color::BLACK,
        }
    }

    /// One resolved margin.
    pub fn margin(&mut self, id: BoxId, side: Side) -> f64 {
        self.actual_length(id, side.margin())
    }

    /// One resolved padding.
    pub fn padding(&mut self, id: BoxId, side: Side) -> f64 {
        self.actual_length(id, side.padding())
    }

    /// One resolved border width.
    pub fn border_width(&mut self, id: BoxId, side: Side) -> f64 {
        self.actual_length(id, side.border_width())
    }

    /// All four margins (`auto` as 0).
    pub fn margins(&mut self, id: BoxId) -> BoxEdges {
        self.edges(id, Side::margin)
    }

    /// All four paddings.
    pub fn paddings(&mut self, id: BoxId) -> BoxEdges {
        self.edges(id, Side::padding)
    }

    /// All four border widths.
    pub fn borders(&mut self, id: BoxId) -> BoxEdges {
        self.edges(id, Side::border_width)
    }

    fn edges(&mut self, id: BoxId, property: fn(Side) -> Property) -> BoxEdges {
        BoxEdges::new(
            self.actual_length(id, property(Side::Top)),
            self.actual_length(id, property(Side::Right)),
            self.actual_length(id, property(Side::Bottom)),
            self.actual_length(id, property(Side::Left)),
        )
    }

    /// Length of a property without a percentage basis: percentages read as
    /// 0 and nothing is memoized. Used while measuring preferred widths,
    /// before containing blocks are known.
    pub(crate) fn length_without_basis(&mut self, id: BoxId, property: Property) -> Option<f64> {
        if let Some(side) = Side::of_border_width(property)
            && !self.border_style(id, side).has_width()
        {
            return Some(0.0);
        }
        let raw = self[id].style.raw(property).trim().to_ascii_lowercase();
        if Side::of_border_width(property).is_some()
            && let Some(px) = border_width_keyword(&raw)
        {
            return Some(px);
        }
        let length = parse_length(&raw)?;
        let font_size = self.font_size(id);
        Some(if length.is_percent() {
            0.0
        } else {
            length.to_px(0.0, font_size)
        })
    }

    /// [§ 15.7 Font size](https://www.w3.org/TR/CSS2/fonts.html#font-size-props)
    ///
    /// The box's font size in pixels. Relative values resolve against the
    /// parent's font size.
    pub fn font_size(&mut self, id: BoxId) -> f64 {
        if let Some(Actual::Length(size)) = self[id].style.memo(Property::FontSize) {
            return size;
        }
        let parent_size = match self.parent(id) {
            Some(parent) => self.font_size(parent),
            None => DEFAULT_FONT_SIZE_PX,
        };
        let raw = self[id].style.raw(Property::FontSize).trim().to_ascii_lowercase();
        let size = match raw.as_str() {
            "inherit" => parent_size,
            "larger" => parent_size * FONT_SIZE_STEP,
            "smaller" => parent_size / FONT_SIZE_STEP,
            keyword => absolute_font_size(keyword)
                .or_else(|| parse_length(keyword).map(|l| l.to_px(parent_size, parent_size)))
                .unwrap_or_else(|| {
                    warn_once("CSS", &format!("unsupported font-size '{keyword}'"));
                    parent_size
                }),
        };
        self[id].style.store(Property::FontSize, Actual::Length(size));
        size
    }

    /// The box's font, memoized on the box and in `fonts`.
    ///
    /// # Errors
    ///
    /// Propagates the measurer's failure.
    pub fn actual_font(
        &mut self,
        id: BoxId,
        fonts: &mut FontCache,
        measurer: &dyn TextMeasurer,
    ) -> Result<Font, MeasureError> {
        if let Some(font) = self[id].style.font() {
            return Ok(font.clone());
        }
        let size = self.font_size(id);
        let style = &self[id].style;
        let family = style
            .raw(Property::FontFamily)
            .split(',')
            .next()
            .unwrap_or_default()
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .to_string();
        let font_style: FontStyle = parse_keyword(style.raw(Property::FontStyle), "font-style");
        let weight = font_weight(style.raw(Property::FontWeight));
        let request = FontRequest {
            family,
            size,
            style: font_style,
            weight,
        };
        let font = fonts.font(measurer, &request)?;
        self[id].style.store_font(font.clone());
        Ok(font)
    }

    fn resolve(&mut self, id: BoxId, property: Property) -> Actual {
        use Property as P;
        let raw = self[id].style.raw(property).trim().to_ascii_lowercase();
        match property {
            P::Width | P::MinWidth | P::MaxWidth | P::Left | P::Right => {
                self.resolve_length(id, &raw, Basis::ContainingWidth)
            }
            // [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
            // "The percentage is calculated with respect to the width of the
            // generated box's containing block. Note that this is true for
            // 'margin-top' and 'margin-bottom' as well."
            P::MarginTop
            | P::MarginRight
            | P::MarginBottom
            | P::MarginLeft
            | P::PaddingTop
            | P::PaddingRight
            | P::PaddingBottom
            | P::PaddingLeft
            | P::TextIndent => self.resolve_length(id, &raw, Basis::ContainingWidth),
            // [§ 10.5 Content height](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
            // "If the height of the containing block is not specified
            // explicitly, and this element is not absolutely positioned, the
            // value computes to 'auto'."
            P::Height | P::Top | P::Bottom => {
                self.resolve_length(id, &raw, Basis::ContainingHeight)
            }
            P::BorderTopWidth | P::BorderRightWidth | P::BorderBottomWidth | P::BorderLeftWidth => {
                match border_width_keyword(&raw) {
                    Some(px) => Actual::Length(px),
                    None => self.resolve_length(id, &raw, Basis::OwnWidth),
                }
            }
            P::BorderTopLeftRadius
            | P::BorderTopRightRadius
            | P::BorderBottomRightRadius
            | P::BorderBottomLeftRadius => self.resolve_length(id, &raw, Basis::OwnWidth),
            // [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
            // "<number>: The used value of the property is this number
            // multiplied by the element's font size."
            P::LineHeight => match parse_number(&raw) {
                Some(factor) => Actual::Length(factor * self.font_size(id)),
                None => self.resolve_length(id, &raw, Basis::FontSize),
            },
            P::WordSpacing => match raw.as_str() {
                "normal" => Actual::Length(0.0),
                _ => self.resolve_length(id, &raw, Basis::ContainingWidth),
            },
            P::BorderSpacing => {
                let font_size = self.font_size(id);
                let mut lengths = raw
                    .split_whitespace()
                    .filter_map(parse_length)
                    .map(|l| l.to_px(0.0, font_size));
                let horizontal = lengths.next().unwrap_or(0.0);
                let vertical = lengths.next().unwrap_or(horizontal);
                Actual::Pair(horizontal, vertical)
            }
            P::Color
            | P::BackgroundColor
            | P::BackgroundGradient
            | P::BorderTopColor
            | P::BorderRightColor
            | P::BorderBottomColor
            | P::BorderLeftColor => {
                if raw == "currentcolor" && property != P::Color {
                    Actual::Color(self.actual_color(id, P::Color))
                } else {
                    Actual::Color(Color::parse_or_black(&raw))
                }
            }
            P::BackgroundGradientAngle => Actual::Angle(parse_angle(&raw).unwrap_or_else(|| {
                warn_once("CSS", &format!("unsupported angle '{raw}'"));
                90.0
            })),
            P::FontSize => Actual::Length(self.font_size(id)),
            P::ZIndex => self.z_index(id).map_or(Actual::Auto, |z| Actual::Length(f64::from(z))),
            P::Display
            | P::Position
            | P::Float
            | P::Clear
            | P::Overflow
            | P::BorderTopStyle
            | P::BorderRightStyle
            | P::BorderBottomStyle
            | P::BorderLeftStyle
            | P::TextAlign
            | P::FontFamily
            | P::FontStyle
            | P::FontWeight
            | P::ListStyleType
            | P::PageBreakInside => Actual::Auto,
        }
    }

    fn resolve_length(&mut self, id: BoxId, raw: &str, basis: Basis) -> Actual {
        if matches!(raw, "auto" | "none" | "normal" | "") {
            return Actual::Auto;
        }
        let Some(length) = parse_length(raw) else {
            warn_once("CSS", &format!("unsupported length '{raw}'"));
            return Actual::Auto;
        };
        let font_size = self.font_size(id);
        let basis = if length.is_percent() {
            match basis {
                Basis::ContainingWidth => self.containing_block_width(id),
                Basis::ContainingHeight => match self.containing_block_height(id) {
                    Some(height) => height,
                    None => return Actual::Auto,
                },
                Basis::OwnWidth => self[id].size.width,
                Basis::FontSize => font_size,
            }
        } else {
            0.0
        };
        Actual::Length(length.to_px(basis, font_size))
    }

    /// Set the initial containing block used as the percentage basis of the
    /// root box.
    pub fn set_initial_containing_block(&mut self, size: Size) {
        self.initial_containing_block = size;
    }
}

/// [§ 15.6 Font boldness](https://www.w3.org/TR/CSS2/fonts.html#font-boldness)
fn font_weight(raw: &str) -> u16 {
    match raw.trim().to_ascii_lowercase().as_str() {
        "normal" => 400,
        "bold" | "bolder" => 700,
        "lighter" => 100,
        other => parse_number(other)
            .filter(|w| (1.0..=1000.0).contains(w))
            .map_or(400, |w| w as u16),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::BoxKind;

    fn tree_with_child() -> (BoxTree, BoxId) {
        let mut tree = BoxTree::new();
        tree[BoxId::ROOT].size.width = 400.0;
        let child = tree.append_new(BoxId::ROOT, BoxKind::Generic, None);
        tree.set_style(child, Property::Display, "block");
        (tree, child)
    }

    #[test]
    fn test_percentages_resolve_against_containing_block_width() {
        let (mut tree, child) = tree_with_child();
        tree.set_style(child, Property::Width, "50%");
        tree.set_style(child, Property::MarginTop, "10%");
        assert_eq!(tree.actual_definite(child, Property::Width), Some(200.0));
        assert_eq!(tree.actual_length(child, Property::MarginTop), 40.0);
    }

    #[test]
    fn test_height_percentage_without_definite_basis_is_auto() {
        let (mut tree, child) = tree_with_child();
        tree.set_style(child, Property::Height, "50%");
        assert_eq!(tree.get_actual(child, Property::Height), Actual::Auto);

        tree.set_style(BoxId::ROOT, Property::Height, "300px");
        tree.set_style(child, Property::Height, "50%");
        assert_eq!(tree.actual_definite(child, Property::Height), Some(150.0));
    }

    #[test]
    fn test_border_width_follows_style_on_every_read() {
        let (mut tree, child) = tree_with_child();
        tree.set_style(child, Property::BorderTopWidth, "thick");
        assert_eq!(tree.border_width(child, Side::Top), 0.0);

        tree.set_style(child, Property::BorderTopStyle, "solid");
        assert_eq!(tree.border_width(child, Side::Top), 4.0);

        tree.set_style(child, Property::BorderTopStyle, "hidden");
        assert_eq!(tree.border_width(child, Side::Top), 0.0);
    }

    #[test]
    fn test_font_size_relative_to_parent() {
        let (mut tree, child) = tree_with_child();
        tree.set_style(BoxId::ROOT, Property::FontSize, "20px");
        tree.set_style(child, Property::FontSize, "1.5em");
        assert_eq!(tree.font_size(child), 30.0);

        tree.set_style(child, Property::FontSize, "larger");
        assert_eq!(tree.font_size(child), 24.0);

        tree.set_style(child, Property::PaddingLeft, "2em");
        assert_eq!(tree.padding(child, Side::Left), 48.0);
    }

    #[test]
    fn test_line_height_forms() {
        let (mut tree, child) = tree_with_child();
        tree.set_style(child, Property::FontSize, "10px");
        tree.set_style(child, Property::LineHeight, "1.5");
        assert_eq!(tree.actual_definite(child, Property::LineHeight), Some(15.0));
        tree.set_style(child, Property::LineHeight, "200%");
        assert_eq!(tree.actual_definite(child, Property::LineHeight), Some(20.0));
        tree.set_style(child, Property::LineHeight, "normal");
        assert_eq!(tree.actual_definite(child, Property::LineHeight), None);
    }

    #[test]
    fn test_detached_box_has_no_containing_block() {
        let mut tree = BoxTree::new();
        let orphan = tree.alloc(BoxKind::Generic, None);
        let inner = tree.alloc(BoxKind::Generic, None);
        tree.append_child(orphan, inner);
        assert!(matches!(
            tree.containing_block(inner),
            Err(LayoutError::NoContainingBlock(id)) if id == inner
        ));
    }

    #[test]
    fn test_font_weight_keywords() {
        assert_eq!(font_weight("bold"), 700);
        assert_eq!(font_weight("300"), 300);
        assert_eq!(font_weight("heavy"), 400);
    }
}
