//! Per-box store of raw property strings and their memoized actual values.
//!
//! Each property lives in a [`Slot`]: either `Unresolved(raw)` or
//! `Resolved(raw, actual)`. Setting a raw value always moves the slot back
//! to `Unresolved`; a getter in [`super::actual`] resolves and stores.

use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{EnumCount as EnumCountMacro, EnumIter, EnumString, IntoStaticStr};

use super::values::Color;
use crate::fonts::Font;

/// Every property the layout core stores on a box.
///
/// Names parse from their CSS spelling, case-insensitively.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumString,
    IntoStaticStr,
    EnumIter,
    EnumCountMacro,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[allow(missing_docs)]
pub enum Property {
    Display,
    Position,
    Float,
    Clear,
    Overflow,
    Width,
    Height,
    MinWidth,
    MaxWidth,
    MarginTop,
    MarginRight,
    MarginBottom,
    MarginLeft,
    PaddingTop,
    PaddingRight,
    PaddingBottom,
    PaddingLeft,
    BorderTopWidth,
    BorderRightWidth,
    BorderBottomWidth,
    BorderLeftWidth,
    BorderTopStyle,
    BorderRightStyle,
    BorderBottomStyle,
    BorderLeftStyle,
    BorderTopColor,
    BorderRightColor,
    BorderBottomColor,
    BorderLeftColor,
    BorderTopLeftRadius,
    BorderTopRightRadius,
    BorderBottomRightRadius,
    BorderBottomLeftRadius,
    Top,
    Right,
    Bottom,
    Left,
    ZIndex,
    LineHeight,
    TextIndent,
    TextAlign,
    WordSpacing,
    BorderSpacing,
    Color,
    BackgroundColor,
    BackgroundGradient,
    BackgroundGradientAngle,
    FontFamily,
    FontSize,
    FontStyle,
    FontWeight,
    ListStyleType,
    PageBreakInside,
}

impl Property {
    /// The CSS 2.1 initial value.
    #[must_use]
    pub const fn initial_value(self) -> &'static str {
        match self {
            Self::Display => "inline",
            Self::Position => "static",
            Self::Float | Self::Clear | Self::MaxWidth => "none",
            Self::Overflow => "visible",
            Self::Width
            | Self::Height
            | Self::Top
            | Self::Right
            | Self::Bottom
            | Self::Left
            | Self::ZIndex
            | Self::PageBreakInside => "auto",
            Self::MinWidth
            | Self::MarginTop
            | Self::MarginRight
            | Self::MarginBottom
            | Self::MarginLeft
            | Self::PaddingTop
            | Self::PaddingRight
            | Self::PaddingBottom
            | Self::PaddingLeft
            | Self::BorderTopLeftRadius
            | Self::BorderTopRightRadius
            | Self::BorderBottomRightRadius
            | Self::BorderBottomLeftRadius
            | Self::TextIndent
            | Self::BorderSpacing => "0",
            Self::BorderTopWidth
            | Self::BorderRightWidth
            | Self::BorderBottomWidth
            | Self::BorderLeftWidth => "medium",
            Self::BorderTopStyle
            | Self::BorderRightStyle
            | Self::BorderBottomStyle
            | Self::BorderLeftStyle => "none",
            Self::BorderTopColor
            | Self::BorderRightColor
            | Self::BorderBottomColor
            | Self::BorderLeftColor
            | Self::Color => "black",
            Self::LineHeight | Self::WordSpacing | Self::FontStyle | Self::FontWeight => {
                "normal"
            }
            Self::TextAlign => "left",
            Self::BackgroundColor | Self::BackgroundGradient => "transparent",
            Self::BackgroundGradientAngle => "90",
            Self::FontFamily => "serif",
            Self::FontSize => "medium",
            Self::ListStyleType => "disc",
        }
    }

    /// Properties a child takes from its parent when it does not set them.
    #[must_use]
    pub const fn is_inherited(self) -> bool {
        matches!(
            self,
            Self::LineHeight
                | Self::TextIndent
                | Self::TextAlign
                | Self::WordSpacing
                | Self::BorderSpacing
                | Self::Color
                | Self::FontFamily
                | Self::FontSize
                | Self::FontStyle
                | Self::FontWeight
                | Self::ListStyleType
        )
    }

    /// Properties whose change makes the memoized font stale.
    #[must_use]
    pub const fn affects_font(self) -> bool {
        matches!(
            self,
            Self::FontFamily | Self::FontSize | Self::FontStyle | Self::FontWeight
        )
    }

    /// The CSS name, e.g. `"margin-top"`.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// All properties, in declaration order.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

/// A resolved, device-unit value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Actual {
    /// `auto`, `none` or `normal`: the property has no definite value and
    /// the layout algorithm decides.
    Auto,
    /// A length in pixels, or a plain number.
    Length(f64),
    /// Two lengths, e.g. `border-spacing`.
    Pair(f64, f64),
    /// A color.
    Color(Color),
    /// An angle in degrees.
    Angle(f64),
}

impl Actual {
    /// The length in pixels, `0` for anything that is not a length.
    #[must_use]
    pub const fn length_or_zero(self) -> f64 {
        match self {
            Self::Length(v) => v,
            _ => 0.0,
        }
    }

    /// The length, or `None` for `auto`.
    #[must_use]
    pub const fn definite(self) -> Option<f64> {
        match self {
            Self::Length(v) => Some(v),
            _ => None,
        }
    }
}

/// One property's raw value and, once computed, its actual value.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// Raw value whose actual value has not been computed since it was set.
    Unresolved(String),
    /// Raw value plus its memoized actual value.
    Resolved(String, Actual),
}

impl Slot {
    /// The raw string, regardless of resolution state.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::Unresolved(raw) | Self::Resolved(raw, _) => raw,
        }
    }

    /// The memoized value, if any.
    #[must_use]
    pub const fn memo(&self) -> Option<Actual> {
        match self {
            Self::Unresolved(_) => None,
            Self::Resolved(_, actual) => Some(*actual),
        }
    }

    fn unresolve(&mut self) {
        if let Self::Resolved(raw, _) = self {
            *self = Self::Unresolved(std::mem::take(raw));
        }
    }
}

/// Raw style strings plus lazily computed actual values for one box.
#[derive(Debug, Clone)]
pub struct StyleValueCache {
    slots: Vec<Slot>,
    font: Option<Font>,
}

impl Default for StyleValueCache {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleValueCache {
    /// Every property at its initial value, nothing resolved.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Property::all()
                .map(|p| Slot::Unresolved(p.initial_value().to_string()))
                .collect(),
            font: None,
        }
    }

    /// Replace a raw value. Always succeeds and always drops the memo.
    ///
    /// Font properties drop every memo on the box: em and ex lengths
    /// resolve against the font size.
    pub fn set_raw(&mut self, property: Property, value: impl Into<String>) {
        self.slots[property as usize] = Slot::Unresolved(value.into());
        if property.affects_font() {
            self.invalidate_all();
        }
    }

    /// The raw string currently assigned.
    #[must_use]
    pub fn raw(&self, property: Property) -> &str {
        self.slots[property as usize].raw()
    }

    /// Whether the raw value differs from the initial value.
    #[must_use]
    pub fn is_specified(&self, property: Property) -> bool {
        self.raw(property) != property.initial_value()
    }

    /// The slot for `property`.
    #[must_use]
    pub fn slot(&self, property: Property) -> &Slot {
        &self.slots[property as usize]
    }

    /// The memoized actual value, if resolved since the last `set_raw`.
    #[must_use]
    pub fn memo(&self, property: Property) -> Option<Actual> {
        self.slots[property as usize].memo()
    }

    /// Store a computed actual value for the current raw value.
    pub(crate) fn store(&mut self, property: Property, actual: Actual) {
        let slot = &mut self.slots[property as usize];
        let raw = match slot {
            Slot::Unresolved(raw) | Slot::Resolved(raw, _) => std::mem::take(raw),
        };
        *slot = Slot::Resolved(raw, actual);
    }

    /// The memoized font, if resolved.
    #[must_use]
    pub const fn font(&self) -> Option<&Font> {
        self.font.as_ref()
    }

    pub(crate) fn store_font(&mut self, font: Font) {
        self.font = Some(font);
    }

    /// Drop memoized values whose raw value is a percentage. Their basis
    /// (the containing block) may have changed since they were computed.
    pub fn invalidate_percentages(&mut self) {
        for slot in &mut self.slots {
            if slot.raw().contains('%') {
                slot.unresolve();
            }
        }
    }

    /// Drop every memoized value, including the font.
    pub fn invalidate_all(&mut self) {
        for slot in &mut self.slots {
            slot.unresolve();
        }
        self.font = None;
    }

    /// Number of properties stored per box.
    #[must_use]
    pub const fn len() -> usize {
        Property::COUNT
    }
}
