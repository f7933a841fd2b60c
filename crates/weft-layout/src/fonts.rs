//! Font resolution and text measurement.
//!
//! [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
//!
//! "CSS assumes that every font has font metrics that specify a
//! characteristic height above the baseline and a depth below it."
//!
//! The layout core never shapes text itself. Hosts inject a
//! [`TextMeasurer`]; [`FontCache`] memoizes the fonts it hands out.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::MeasureError;
use crate::geometry::Size;
use crate::style::keywords::FontStyle;

/// What a box asks the measurer for.
#[derive(Debug, Clone, PartialEq)]
pub struct FontRequest {
    /// First family of the `font-family` list, unquoted.
    pub family: String,
    /// Resolved font size in pixels.
    pub size: f64,
    /// Slant.
    pub style: FontStyle,
    /// Numeric weight, 100-900.
    pub weight: u16,
}

/// A font handle produced by a [`TextMeasurer`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    /// Family actually chosen.
    pub family: String,
    /// Size in pixels.
    pub size: f64,
    /// Slant.
    pub style: FontStyle,
    /// Numeric weight.
    pub weight: u16,
    /// Line spacing: the used value of `line-height: normal`.
    pub height: f64,
    /// Distance from the top of the line to the baseline.
    pub ascent: f64,
}

/// Injected text/font measurement capability.
pub trait TextMeasurer {
    /// Produce a font for the request.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::FontUnavailable`] when no font matches.
    fn font_for(&self, request: &FontRequest) -> Result<Font, MeasureError>;

    /// Measure one run of text.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::TextMeasurement`] when the run cannot be
    /// measured.
    fn measure_text(&self, text: &str, font: &Font) -> Result<Size, MeasureError>;
}

/// Approximate font metrics using fixed ratios.
///
/// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
///
/// Every character advances `0.6em` and the line spacing is `1.2em`.
/// Deterministic, so layouts are reproducible without a font stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateMeasurer;

impl ApproximateMeasurer {
    const CHAR_WIDTH_RATIO: f64 = 0.6;
    const LINE_HEIGHT_RATIO: f64 = 1.2;
    const ASCENT_RATIO: f64 = 0.8;
}

impl TextMeasurer for ApproximateMeasurer {
    fn font_for(&self, request: &FontRequest) -> Result<Font, MeasureError> {
        Ok(Font {
            family: request.family.clone(),
            size: request.size,
            style: request.style,
            weight: request.weight,
            height: request.size * Self::LINE_HEIGHT_RATIO,
            ascent: request.size * Self::ASCENT_RATIO,
        })
    }

    fn measure_text(&self, text: &str, font: &Font) -> Result<Size, MeasureError> {
        let chars = text.chars().filter(|c| !c.is_control()).count();
        Ok(Size::new(
            chars as f64 * font.size * Self::CHAR_WIDTH_RATIO,
            font.height,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FontKey {
    family: String,
    size_bits: u64,
    style: FontStyle,
    weight: u16,
}

impl From<&FontRequest> for FontKey {
    fn from(request: &FontRequest) -> Self {
        Self {
            family: request.family.to_ascii_lowercase(),
            size_bits: request.size.to_bits(),
            style: request.style,
            weight: request.weight,
        }
    }
}

/// Memoizes fonts per (family, size, style, weight).
#[derive(Debug, Default)]
pub struct FontCache {
    fonts: HashMap<FontKey, Font>,
}

impl FontCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached font for `request`, asking `measurer` on a miss.
    ///
    /// # Errors
    ///
    /// Propagates the measurer's failure; failures are not cached.
    pub fn font(
        &mut self,
        measurer: &dyn TextMeasurer,
        request: &FontRequest,
    ) -> Result<Font, MeasureError> {
        let key = FontKey::from(request);
        if let Some(font) = self.fonts.get(&key) {
            return Ok(font.clone());
        }
        let font = measurer.font_for(request)?;
        let _ = self.fonts.insert(key, font.clone());
        Ok(font)
    }

    /// Number of distinct fonts resolved so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Whether nothing has been resolved yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}
