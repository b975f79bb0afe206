// SPDX-License-Identifier: MIT
//
// WCAG contrast math and accessible foreground selection.
//
// Relative luminance uses the WCAG 2.0 sRGB linearization (threshold 0.03928)
// and the Rec. 709 weights. Contrast ratio is
// `(L_lighter + 0.05) / (L_darker + 0.05)`, always in `[1, 21]`.
//
// Compliance thresholds:
//
//   Level   Normal text   Large text
//   AA      4.5           3.0
//   AAA     7.0           4.5

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::warn;

use crate::color::{ColorRgba, ParseColorError, parse_color};

// ─── Luminance and contrast ──────────────────────────────────────────────────

/// Linearize one 8-bit sRGB channel.
#[inline]
fn linearize(channel: u32) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance of an sRGB color, `0.0` for black and `1.0` for white.
///
/// Out-of-range channels are not clamped and push the result above 1.
#[must_use]
pub fn luminance(r: u32, g: u32, b: u32) -> f64 {
    0.2126f64.mul_add(
        linearize(r),
        0.7152f64.mul_add(linearize(g), 0.0722 * linearize(b)),
    )
}

impl ColorRgba {
    /// Relative luminance of the color's RGB channels. Alpha is ignored.
    #[must_use]
    pub fn luminance(self) -> f64 {
        luminance(self.r, self.g, self.b)
    }

    /// WCAG contrast ratio against `other`. Symmetric; alpha is ignored.
    #[must_use]
    pub fn contrast_ratio(self, other: Self) -> f64 {
        ratio_from_luminance(self.luminance(), other.luminance())
    }
}

fn ratio_from_luminance(la: f64, lb: f64) -> f64 {
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Contrast ratio between two color strings.
///
/// # Errors
///
/// Returns the first [`ParseColorError`] when either string is not a color.
pub fn try_contrast_ratio(a: &str, b: &str) -> Result<f64, ParseColorError> {
    let a = parse_color(a)?;
    let b = parse_color(b)?;
    Ok(a.contrast_ratio(b))
}

/// Contrast ratio between two color strings, `1.0` if either is unparsable.
///
/// A parse failure is logged and never propagated. Note that `1.0` is also a
/// genuine ratio (identical luminance); use [`try_contrast_ratio`] to tell the
/// two apart.
#[must_use]
pub fn contrast_ratio(a: &str, b: &str) -> f64 {
    try_contrast_ratio(a, b).unwrap_or_else(|error| {
        warn!(first = a, second = b, %error, "cannot compute contrast ratio");
        1.0
    })
}

// ─── WCAG levels ─────────────────────────────────────────────────────────────

/// WCAG conformance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WcagLevel {
    #[default]
    Aa,
    Aaa,
}

/// Text size class. WCAG "large" is 18pt, or 14pt bold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextSize {
    #[default]
    Normal,
    Large,
}

impl TextSize {
    #[must_use]
    pub const fn from_large(is_large_text: bool) -> Self {
        if is_large_text { Self::Large } else { Self::Normal }
    }
}

impl WcagLevel {
    /// Minimum contrast ratio for this level at `size`.
    #[must_use]
    pub const fn threshold(self, size: TextSize) -> f64 {
        match (self, size) {
            (Self::Aa, TextSize::Normal) | (Self::Aaa, TextSize::Large) => 4.5,
            (Self::Aa, TextSize::Large) => 3.0,
            (Self::Aaa, TextSize::Normal) => 7.0,
        }
    }
}

impl fmt::Display for WcagLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Aa => "AA",
            Self::Aaa => "AAA",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown WCAG level '{0}' (expected AA or AAA)")]
pub struct UnknownWcagLevel(pub String);

impl FromStr for WcagLevel {
    type Err = UnknownWcagLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AA" => Ok(Self::Aa),
            "AAA" => Ok(Self::Aaa),
            _ => Err(UnknownWcagLevel(s.to_string())),
        }
    }
}

/// Does `ratio` meet `level` for normal or large text?
#[must_use]
pub fn meets_wcag(ratio: f64, level: WcagLevel, is_large_text: bool) -> bool {
    ratio >= level.threshold(TextSize::from_large(is_large_text))
}

/// Pass/fail for every level and size at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct WcagReport {
    pub aa: bool,
    pub aa_large: bool,
    pub aaa: bool,
    pub aaa_large: bool,
}

impl WcagReport {
    #[must_use]
    pub fn evaluate(ratio: f64) -> Self {
        Self {
            aa: meets_wcag(ratio, WcagLevel::Aa, false),
            aa_large: meets_wcag(ratio, WcagLevel::Aa, true),
            aaa: meets_wcag(ratio, WcagLevel::Aaa, false),
            aaa_large: meets_wcag(ratio, WcagLevel::Aaa, true),
        }
    }
}

// ─── Accessible text color ───────────────────────────────────────────────────

/// Candidates and target for [`accessible_text_color`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContrastOptions {
    pub light_color: String,
    pub dark_color: String,
    pub wcag_level: WcagLevel,
    pub is_large_text: bool,
}

impl Default for ContrastOptions {
    fn default() -> Self {
        Self {
            light_color: "#ffffff".to_string(),
            dark_color: "#000000".to_string(),
            wcag_level: WcagLevel::Aa,
            is_large_text: false,
        }
    }
}

impl ContrastOptions {
    #[must_use]
    pub fn light(mut self, color: impl Into<String>) -> Self {
        self.light_color = color.into();
        self
    }

    #[must_use]
    pub fn dark(mut self, color: impl Into<String>) -> Self {
        self.dark_color = color.into();
        self
    }

    #[must_use]
    pub const fn level(mut self, level: WcagLevel) -> Self {
        self.wcag_level = level;
        self
    }

    #[must_use]
    pub const fn large_text(mut self, is_large_text: bool) -> Self {
        self.is_large_text = is_large_text;
        self
    }
}

/// Pick the light or dark candidate for text drawn on `background`.
///
/// A candidate meeting the requested level beats one that doesn't. Between
/// two candidates in the same class the higher ratio wins, and an exact tie
/// goes to the dark candidate. Unparsable colors fall back to the `1.0`
/// sentinel of [`contrast_ratio`], so this never fails.
#[must_use]
pub fn accessible_text_color<'a>(background: &str, options: &'a ContrastOptions) -> &'a str {
    let light = contrast_ratio(background, &options.light_color);
    let dark = contrast_ratio(background, &options.dark_color);

    let light_ok = meets_wcag(light, options.wcag_level, options.is_large_text);
    let dark_ok = meets_wcag(dark, options.wcag_level, options.is_large_text);

    let pick_light = match (light_ok, dark_ok) {
        (true, false) => true,
        (false, true) => false,
        // Both or neither comply: strictly higher contrast wins.
        _ => light > dark,
    };

    if pick_light {
        &options.light_color
    } else {
        &options.dark_color
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
