//! Raw value parsing: lengths, colors, angles.
//!
//! [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/)
//!
//! Everything here is a pure function of the raw string. Resolution against
//! a containing block or a font happens in [`super::actual`].

use serde::{Deserialize, Serialize};
use weft_common::warning::warn_once;

/// User agent default font size.
/// [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
pub const DEFAULT_FONT_SIZE_PX: f64 = 16.0;

/// [§ 15.7 font-size](https://www.w3.org/TR/CSS2/fonts.html#font-size-props)
///
/// "In CSS1, the suggested scaling factor between adjacent indexes was 1.5,
/// which user experience proved to be too large. In CSS2, the suggested
/// scaling factor for computer screen between adjacent indexes was 1.2"
pub const FONT_SIZE_STEP: f64 = 1.2;

/// [§ 4.1 Lengths](https://www.w3.org/TR/css-values-4/#lengths)
///
/// Absolute units are converted to pixels while parsing; only the
/// relative units survive as separate variants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LengthValue {
    /// [§ 6.1 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
    /// "1px = 1/96th of 1in"
    Px(f64),
    /// [§ 5.1.1 Font-relative lengths](https://www.w3.org/TR/css-values-4/#font-relative-lengths)
    /// "Equal to the computed value of the font-size property of the element"
    Em(f64),
    /// "Equal to the used x-height of the first available font". Approximated
    /// as half an em.
    Ex(f64),
    /// [§ 4.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
    Percent(f64),
}

impl LengthValue {
    /// Resolve to pixels against a percentage basis and a font size.
    #[must_use]
    pub fn to_px(self, basis: f64, font_size: f64) -> f64 {
        match self {
            Self::Px(px) => px,
            Self::Em(em) => em * font_size,
            Self::Ex(ex) => ex * font_size * 0.5,
            Self::Percent(pct) => pct * basis / 100.0,
        }
    }

    /// Whether the value depends on a percentage basis.
    #[must_use]
    pub const fn is_percent(self) -> bool {
        matches!(self, Self::Percent(_))
    }
}

/// Split `"12.5px"` into `(12.5, "px")`.
fn split_number(raw: &str) -> Option<(f64, &str)> {
    let raw = raw.trim();
    let end = raw
        .char_indices()
        .find(|&(i, c)| {
            !(c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == 0))
        })
        .map_or(raw.len(), |(i, _)| i);
    let number = raw[..end].parse::<f64>().ok()?;
    Some((number, raw[end..].trim()))
}

/// Parse a bare number (`line-height: 1.5`, `z-index: 2`).
#[must_use]
pub fn parse_number(raw: &str) -> Option<f64> {
    match split_number(raw)? {
        (n, "") => Some(n),
        _ => None,
    }
}

/// [§ 4.1 Lengths](https://www.w3.org/TR/css-values-4/#lengths)
///
/// Parse a single `<length-percentage>`. Returns `None` for keywords and
/// anything unparseable; a warning is emitted for unknown units.
#[must_use]
pub fn parse_length(raw: &str) -> Option<LengthValue> {
    let (value, unit) = split_number(raw)?;
    let px = |factor: f64| Some(LengthValue::Px(value * factor));
    match unit.to_ascii_lowercase().as_str() {
        // "unitless zero" is the only number accepted as a length.
        "" if value == 0.0 => px(1.0),
        "px" => px(1.0),
        // 1pt = 1/72in, 1pc = 12pt
        "pt" => px(96.0 / 72.0),
        "pc" => px(16.0),
        "in" => px(96.0),
        "cm" => px(96.0 / 2.54),
        "mm" => px(96.0 / 25.4),
        "em" => Some(LengthValue::Em(value)),
        "ex" => Some(LengthValue::Ex(value)),
        "%" => Some(LengthValue::Percent(value)),
        "" => None,
        other => {
            warn_once("CSS", &format!("unsupported unit '{other}'"));
            None
        }
    }
}

/// [§ 15.7 font-size](https://www.w3.org/TR/CSS2/fonts.html#font-size-props)
///
/// "An <absolute-size> keyword is an index to a table of font sizes computed
/// and kept by the UA."
#[must_use]
pub fn absolute_font_size(keyword: &str) -> Option<f64> {
    let steps = match keyword {
        "xx-small" => -3,
        "x-small" => -2,
        "small" => -1,
        "medium" => 0,
        "large" => 1,
        "x-large" => 2,
        "xx-large" => 3,
        _ => return None,
    };
    Some(DEFAULT_FONT_SIZE_PX * FONT_SIZE_STEP.powi(steps))
}

/// [§ 8.5.1 Border width](https://www.w3.org/TR/CSS2/box.html#border-width-properties)
///
/// "The interpretation of the first three values depends on the user agent.
/// The following relationships must hold, however: 'thin' <= 'medium' <=
/// 'thick'."
#[must_use]
pub fn border_width_keyword(keyword: &str) -> Option<f64> {
    match keyword {
        "thin" => Some(1.0),
        "medium" => Some(2.0),
        "thick" => Some(4.0),
        _ => None,
    }
}

/// [§ 5.1 Angle units](https://www.w3.org/TR/css-values-4/#angles)
///
/// Returns degrees. A bare number is taken as degrees.
#[must_use]
pub fn parse_angle(raw: &str) -> Option<f64> {
    let (value, unit) = split_number(raw)?;
    match unit.to_ascii_lowercase().as_str() {
        "" | "deg" => Some(value),
        "rad" => Some(value.to_degrees()),
        "grad" => Some(value * 0.9),
        "turn" => Some(value * 360.0),
        _ => None,
    }
}

/// [§ 4 Color syntax](https://www.w3.org/TR/css-color-4/#color-syntax)
/// sRGB color represented as RGBA components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// "the red color channel" (0-255)
    pub r: u8,
    /// "the green color channel" (0-255)
    pub g: u8,
    /// "the blue color channel" (0-255)
    pub b: u8,
    /// "the alpha channel" (0-255, 255 = fully opaque)
    pub a: u8,
}

impl Color {
    /// Black (#000000)
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// White (#ffffff)
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// An opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse any supported color syntax.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.starts_with('#') {
            return Self::from_hex(raw);
        }
        let lower = raw.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return Self::from_rgb_function(args);
        }
        Self::from_named(&lower)
    }

    /// [§ 4.2 The RGB hexadecimal notations](https://www.w3.org/TR/css-color-4/#hex-notation)
    /// "The syntax of a <hex-color> is a <hash-token> token whose value consists of
    /// 3, 4, 6, or 8 hexadecimal digits."
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let short = |i: usize| u8::from_str_radix(&hex[i..=i].repeat(2), 16).ok();
        let long = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            // [§ 4.2.1]
            // "The three-digit RGB notation (#RGB) is converted into six-digit form (#RRGGBB)
            // by replicating digits, not by adding zeros."
            3 => Some(Self::rgb(short(0)?, short(1)?, short(2)?)),
            4 => Some(Self {
                r: short(0)?,
                g: short(1)?,
                b: short(2)?,
                a: short(3)?,
            }),
            6 => Some(Self::rgb(long(0)?, long(2)?, long(4)?)),
            8 => Some(Self {
                r: long(0)?,
                g: long(2)?,
                b: long(4)?,
                a: long(6)?,
            }),
            _ => None,
        }
    }

    /// [§ 4.1 The RGB functions](https://www.w3.org/TR/css-color-4/#rgb-functions)
    ///
    /// Accepts comma- or space-separated channels, each a number or a
    /// percentage, with an optional alpha.
    fn from_rgb_function(args: &str) -> Option<Self> {
        let parts: Vec<&str> = args
            .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();
        if !(3..=4).contains(&parts.len()) {
            return None;
        }
        let channel = |s: &str| -> Option<u8> {
            let v = match s.strip_suffix('%') {
                Some(pct) => pct.parse::<f64>().ok()? * 2.55,
                None => s.parse::<f64>().ok()?,
            };
            Some(v.round().clamp(0.0, 255.0) as u8)
        };
        let alpha = match parts.get(3) {
            Some(s) => {
                let v = match s.strip_suffix('%') {
                    Some(pct) => pct.parse::<f64>().ok()? / 100.0,
                    None => s.parse::<f64>().ok()?,
                };
                (v.clamp(0.0, 1.0) * 255.0).round() as u8
            }
            None => 255,
        };
        Some(Self {
            r: channel(parts[0])?,
            g: channel(parts[1])?,
            b: channel(parts[2])?,
            a: alpha,
        })
    }

    /// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors)
    /// "CSS defines a large set of named colors..."
    ///
    /// The CSS 2.1 basic set plus a handful of common extended names.
    #[must_use]
    pub fn from_named(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "transparent" => Self::TRANSPARENT,
            "black" => Self::BLACK,
            "white" => Self::WHITE,
            "silver" => Self::rgb(192, 192, 192),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            "maroon" => Self::rgb(128, 0, 0),
            "red" => Self::rgb(255, 0, 0),
            "purple" => Self::rgb(128, 0, 128),
            "fuchsia" | "magenta" => Self::rgb(255, 0, 255),
            "green" => Self::rgb(0, 128, 0),
            "lime" => Self::rgb(0, 255, 0),
            "olive" => Self::rgb(128, 128, 0),
            "yellow" => Self::rgb(255, 255, 0),
            "navy" => Self::rgb(0, 0, 128),
            "blue" => Self::rgb(0, 0, 255),
            "teal" => Self::rgb(0, 128, 128),
            "aqua" | "cyan" => Self::rgb(0, 255, 255),
            "orange" => Self::rgb(255, 165, 0),
            "lightgray" | "lightgrey" => Self::rgb(211, 211, 211),
            "darkgray" | "darkgrey" => Self::rgb(169, 169, 169),
            "brown" => Self::rgb(165, 42, 42),
            "pink" => Self::rgb(255, 192, 203),
            _ => return None,
        };
        Some(color)
    }

    /// Parse, falling back to black with a one-time warning.
    #[must_use]
    pub fn parse_or_black(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_else(|| {
            warn_once("CSS", &format!("unparseable color '{}'", raw.trim()));
            Self::BLACK
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_units_convert_to_px() {
        assert_eq!(parse_length("12px"), Some(LengthValue::Px(12.0)));
        assert_eq!(parse_length("72pt"), Some(LengthValue::Px(96.0)));
        assert_eq!(parse_length("1in"), Some(LengthValue::Px(96.0)));
        assert_eq!(parse_length("1pc"), Some(LengthValue::Px(16.0)));
        assert_eq!(parse_length("0"), Some(LengthValue::Px(0.0)));
        assert_eq!(parse_length("-4px"), Some(LengthValue::Px(-4.0)));
        let Some(LengthValue::Px(cm)) = parse_length("2.54cm") else {
            panic!("cm did not parse");
        };
        assert!((cm - 96.0).abs() < 1e-9);
    }

    #[test]
    fn test_relative_units() {
        assert_eq!(parse_length("2em").map(|l| l.to_px(0.0, 10.0)), Some(20.0));
        assert_eq!(parse_length("2ex").map(|l| l.to_px(0.0, 10.0)), Some(10.0));
        assert_eq!(parse_length("50%").map(|l| l.to_px(300.0, 10.0)), Some(150.0));
    }

    #[test]
    fn test_keywords_and_garbage_are_not_lengths() {
        assert_eq!(parse_length("auto"), None);
        assert_eq!(parse_length("12"), None);
        assert_eq!(parse_length("12furlongs"), None);
        assert_eq!(parse_number("1.5"), Some(1.5));
        assert_eq!(parse_number("1.5em"), None);
    }

    #[test]
    fn test_colors() {
        assert_eq!(Color::parse("#fff"), Some(Color::WHITE));
        assert_eq!(Color::parse("#ff000080").map(|c| c.a), Some(128));
        assert_eq!(Color::parse("rgb(255, 0, 0)"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(
            Color::parse("rgba(0, 0, 255, 0.5)"),
            Some(Color {
                r: 0,
                g: 0,
                b: 255,
                a: 128
            })
        );
        assert_eq!(Color::parse("Navy"), Some(Color::rgb(0, 0, 128)));
        assert_eq!(Color::parse("#ggg"), None);
        assert_eq!(Color::parse_or_black("nonsense"), Color::BLACK);
    }

    #[test]
    fn test_font_size_keywords_and_angles() {
        assert_eq!(absolute_font_size("medium"), Some(16.0));
        assert!(absolute_font_size("large").is_some_and(|s| (s - 19.2).abs() < 1e-9));
        assert_eq!(border_width_keyword("thick"), Some(4.0));
        assert_eq!(parse_angle("90deg"), Some(90.0));
        assert_eq!(parse_angle("0.5turn"), Some(180.0));
    }
}
