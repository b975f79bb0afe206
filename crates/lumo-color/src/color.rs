// SPDX-License-Identifier: MIT
//
// Color parsing — CSS-style color strings into a canonical RGBA record.
//
// Accepted forms:
//
//   #rgb  #rrggbb  rgb  rrggbb          hex, alpha always 1
//   rgb(r, g, b)  rgba(r, g, b, a)      comma separated
//   rgb(r g b)    rgb(r g b / a)        CSS Color 4 space separated
//
// Matching is case-insensitive and surrounding whitespace is ignored.
//
// Parsing is permissive by default: channel integers are not range checked
// and alpha is not clamped, so `rgb(999, 0, 0)` yields r = 999. Callers that
// need bounded values pick a stricter `ChannelPolicy`.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// `rgb()` / `rgba()` with comma, whitespace, or `/` separators.
static FUNCTIONAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^rgba?\(\s*(\d+)\s*[,\s]\s*(\d+)\s*[,\s]\s*(\d+)\s*(?:[,/\s]\s*([0-9]*\.?[0-9]+)\s*)?\)$",
    )
    .expect("functional color pattern is valid")
});

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Why a color string could not be turned into a [`ColorRgba`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseColorError {
    /// The input was empty (or only whitespace).
    #[error("empty color string")]
    Empty,

    /// A `#`-prefixed value that is not exactly 3 or 6 hex digits.
    #[error("invalid hex color '{0}' (expected 3 or 6 hex digits)")]
    InvalidHex(String),

    /// Neither a hex color nor a well-formed `rgb()` / `rgba()` call.
    #[error("unrecognized color '{0}'")]
    Unrecognized(String),

    /// A channel's digit string does not fit in a `u32`.
    #[error("channel value '{0}' is too large")]
    ChannelOverflow(String),

    /// A channel above 255 under [`ChannelPolicy::Reject`].
    #[error("{channel} channel {value} is outside 0..=255")]
    ChannelOutOfRange { channel: char, value: u32 },

    /// Alpha above 1 under [`ChannelPolicy::Reject`].
    #[error("alpha {0} is outside 0..=1")]
    AlphaOutOfRange(f64),
}

// ─── Channel Policy ──────────────────────────────────────────────────────────

/// How out-of-range functional channel values are treated.
///
/// Hex input is always in range, so the policy only affects `rgb()`/`rgba()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelPolicy {
    /// Keep whatever the string said. `rgb(999, 0, 0)` has r = 999.
    #[default]
    Permissive,
    /// Clamp channels to `0..=255` and alpha to `0..=1`.
    Clamp,
    /// Fail with [`ParseColorError::ChannelOutOfRange`] or
    /// [`ParseColorError::AlphaOutOfRange`].
    Reject,
}

impl FromStr for ChannelPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "permissive" => Ok(Self::Permissive),
            "clamp" => Ok(Self::Clamp),
            "reject" => Ok(Self::Reject),
            other => Err(format!(
                "unknown channel policy '{other}' (expected permissive, clamp or reject)"
            )),
        }
    }
}

// ─── ColorRgba ───────────────────────────────────────────────────────────────

/// A parsed color: integer sRGB channels plus a floating-point alpha.
///
/// Channels are nominally `0..=255` and alpha `0.0..=1.0`, but permissive
/// parsing can carry larger values through unchanged, which is why channels
/// are `u32` rather than `u8`.
///
/// # Examples
///
/// ```
/// use lumo_color::color::ColorRgba;
///
/// let orange: ColorRgba = "#FF5733".parse().unwrap();
/// assert_eq!(orange, ColorRgba::rgb(255, 87, 51));
///
/// let veil: ColorRgba = "rgba(0 0 0 / 0.25)".parse().unwrap();
/// assert_eq!(veil.a, 0.25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorRgba {
    pub r: u32,
    pub g: u32,
    pub b: u32,
    pub a: f64,
}

impl ColorRgba {
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0, a: 1.0 };
    pub const WHITE: Self = Self { r: 255, g: 255, b: 255, a: 1.0 };

    /// An opaque color from 8-bit channels.
    #[must_use]
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// A color from 8-bit channels and an alpha.
    #[must_use]
    pub fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self {
            r: u32::from(r),
            g: u32::from(g),
            b: u32::from(b),
            a,
        }
    }

    /// Alpha is exactly 1.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_opaque(self) -> bool {
        self.a == 1.0
    }

    /// Alpha is exactly 0.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_transparent(self) -> bool {
        self.a == 0.0
    }

    /// Composite this color over an opaque `backdrop`.
    ///
    /// Per channel: `self * a + backdrop * (1 - a)`, rounded half up. The
    /// result is always opaque; the backdrop's own alpha is ignored.
    #[must_use]
    pub fn composite_over(self, backdrop: Self) -> Self {
        let a = self.a;
        Self {
            r: blend_channel(self.r, backdrop.r, a),
            g: blend_channel(self.g, backdrop.g, a),
            b: blend_channel(self.b, backdrop.b, a),
            a: 1.0,
        }
    }

    /// Render as `#rrggbb`. Channels above 255 saturate; alpha is dropped.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}",
            self.r.min(255),
            self.g.min(255),
            self.b.min(255)
        )
    }
}

impl fmt::Display for ColorRgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for ColorRgba {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_color(s)
    }
}

/// Blend one channel, rounding half up (127.5 becomes 128).
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend_channel(fg: u32, bg: u32, alpha: f64) -> u32 {
    let mixed = f64::from(fg).mul_add(alpha, f64::from(bg) * (1.0 - alpha));
    // `as` saturates: negative blends from alpha > 1 land on 0.
    (mixed + 0.5).floor() as u32
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

/// Parse a color string permissively.
///
/// # Errors
///
/// Returns a [`ParseColorError`] when the string is empty, is not 3 or 6 hex
/// digits after an optional `#`, or is not an `rgb()`/`rgba()` call with
/// three integer channels.
pub fn parse_color(input: &str) -> Result<ColorRgba, ParseColorError> {
    parse_color_with(input, ChannelPolicy::Permissive)
}

/// Parse a color string, applying `policy` to functional channel values.
///
/// # Errors
///
/// Everything [`parse_color`] rejects, plus out-of-range values when
/// `policy` is [`ChannelPolicy::Reject`].
pub fn parse_color_with(input: &str, policy: ChannelPolicy) -> Result<ColorRgba, ParseColorError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(ParseColorError::Empty);
    }

    let is_functional = s
        .get(..3)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("rgb"));
    if is_functional {
        let color = parse_functional(s)?;
        return apply_policy(color, policy);
    }

    if let Some(digits) = s.strip_prefix('#') {
        return parse_hex(digits).ok_or_else(|| ParseColorError::InvalidHex(s.to_string()));
    }
    parse_hex(s).ok_or_else(|| ParseColorError::Unrecognized(s.to_string()))
}

/// `true` for the two spellings a host uses for "no background at all":
/// the `transparent` keyword and `rgba(0, 0, 0, 0)`.
#[must_use]
pub fn is_transparent_keyword(s: &str) -> bool {
    let compact: String = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    compact == "transparent" || compact == "rgba(0,0,0,0)"
}

fn parse_functional(s: &str) -> Result<ColorRgba, ParseColorError> {
    let caps = FUNCTIONAL
        .captures(s)
        .ok_or_else(|| ParseColorError::Unrecognized(s.to_string()))?;

    let channel = |i: usize| -> Result<u32, ParseColorError> {
        let digits = &caps[i];
        digits
            .parse::<u32>()
            .map_err(|_| ParseColorError::ChannelOverflow(digits.to_string()))
    };

    let a = match caps.get(4) {
        Some(m) => m
            .as_str()
            .parse::<f64>()
            .map_err(|_| ParseColorError::Unrecognized(s.to_string()))?,
        None => 1.0,
    };

    Ok(ColorRgba {
        r: channel(1)?,
        g: channel(2)?,
        b: channel(3)?,
        a,
    })
}

fn apply_policy(color: ColorRgba, policy: ChannelPolicy) -> Result<ColorRgba, ParseColorError> {
    match policy {
        ChannelPolicy::Permissive => Ok(color),
        ChannelPolicy::Clamp => Ok(ColorRgba {
            r: color.r.min(255),
            g: color.g.min(255),
            b: color.b.min(255),
            a: color.a.clamp(0.0, 1.0),
        }),
        ChannelPolicy::Reject => {
            for (channel, value) in [('r', color.r), ('g', color.g), ('b', color.b)] {
                if value > 255 {
                    return Err(ParseColorError::ChannelOutOfRange { channel, value });
                }
            }
            if color.a > 1.0 {
                return Err(ParseColorError::AlphaOutOfRange(color.a));
            }
            Ok(color)
        }
    }
}

/// Hex digits without the `#`. Only 3- and 6-digit forms are colors here.
fn parse_hex(s: &str) -> Option<ColorRgba> {
    match *s.as_bytes() {
        // rgb → rrggbb
        [r, g, b] => {
            let [r, g, b] = [hex_nibble(r)?, hex_nibble(g)?, hex_nibble(b)?];
            Some(ColorRgba::rgb(r << 4 | r, g << 4 | g, b << 4 | b))
        }
        [r1, r2, g1, g2, b1, b2] => Some(ColorRgba::rgb(
            hex_pair([r1, r2])?,
            hex_pair([g1, g2])?,
            hex_pair([b1, b2])?,
        )),
        _ => None,
    }
}

const fn hex_nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

fn hex_pair([hi, lo]: [u8; 2]) -> Option<u8> {
    Some(hex_nibble(hi)? << 4 | hex_nibble(lo)?)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rgba(r: u32, g: u32, b: u32, a: f64) -> ColorRgba {
        ColorRgba { r, g, b, a }
    }

    // ── Hex ──────────────────────────────────────────────────────────────

    #[test]
    fn hex_rrggbb_matches_digits() {
        assert_eq!(parse_color("#FF5733"), Ok(rgba(255, 87, 51, 1.0)));
        assert_eq!(parse_color("#c86432"), Ok(rgba(200, 100, 50, 1.0)));
    }

    #[test]
    fn hex_every_byte_value_roundtrips() {
        for v in 0..=255u8 {
            let s = format!("#{v:02x}{v:02X}{v:02x}");
            let c = parse_color(&s).unwrap();
            let v = u32::from(v);
            assert_eq!((c.r, c.g, c.b), (v, v, v), "parsing {s}");
            assert!(c.is_opaque());
        }
    }

    #[test]
    fn hex_short_expands_by_duplication() {
        assert_eq!(parse_color("#0f0"), parse_color("#00ff00"));
        assert_eq!(parse_color("f0a"), Ok(rgba(255, 0, 170, 1.0)));
    }

    #[test]
    fn hex_without_hash_and_padded() {
        assert_eq!(parse_color("  00ff00\n"), Ok(rgba(0, 255, 0, 1.0)));
    }

    #[test]
    fn hex_wrong_length_is_rejected() {
        assert_eq!(
            parse_color("#12"),
            Err(ParseColorError::InvalidHex("#12".to_string()))
        );
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("#ff000080").is_err());
    }

    #[test]
    fn hex_bad_digits_are_rejected() {
        assert!(parse_color("#ggg").is_err());
        assert_eq!(
            parse_color("xyz"),
            Err(ParseColorError::Unrecognized("xyz".to_string()))
        );
        assert!(parse_color("#ééé").is_err());
        for bad in ["#g12345", "#1g2345", "#1234g5", "#12345g"] {
            assert_eq!(
                parse_color(bad),
                Err(ParseColorError::InvalidHex(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn empty_is_rejected() {
        assert_eq!(parse_color(""), Err(ParseColorError::Empty));
        assert_eq!(parse_color("   "), Err(ParseColorError::Empty));
    }

    // ── Functional ───────────────────────────────────────────────────────

    #[test]
    fn rgb_with_commas() {
        assert_eq!(parse_color("rgb(255, 0, 0)"), Ok(rgba(255, 0, 0, 1.0)));
        assert_eq!(parse_color("rgb(1,2,3)"), Ok(rgba(1, 2, 3, 1.0)));
    }

    #[test]
    fn rgba_with_alpha() {
        assert_eq!(
            parse_color("rgba(255, 0, 0, 0.5)"),
            Ok(rgba(255, 0, 0, 0.5))
        );
        assert_eq!(parse_color("rgba(0,0,0,.25)"), Ok(rgba(0, 0, 0, 0.25)));
    }

    #[test]
    fn rgba_without_alpha_defaults_to_one() {
        assert_eq!(parse_color("rgba(10, 20, 30)"), Ok(rgba(10, 20, 30, 1.0)));
    }

    #[test]
    fn space_separated_with_slash_alpha() {
        assert_eq!(parse_color("rgb(255 0 0 / 0.5)"), Ok(rgba(255, 0, 0, 0.5)));
        assert_eq!(parse_color("rgb(4 5 6)"), Ok(rgba(4, 5, 6, 1.0)));
    }

    #[test]
    fn functional_is_case_insensitive_and_trimmed() {
        assert_eq!(parse_color("  RGBA( 1 , 2 , 3 )  "), Ok(rgba(1, 2, 3, 1.0)));
    }

    #[test]
    fn functional_needs_three_integer_channels() {
        assert!(parse_color("rgb(1,2)").is_err());
        assert!(parse_color("rgb(1.5, 2, 3)").is_err());
        assert!(parse_color("rgb(-1, 2, 3)").is_err());
        assert!(parse_color("rgb(1, 2, 3").is_err());
    }

    #[test]
    fn oversized_channel_digits_overflow() {
        assert_eq!(
            parse_color("rgb(99999999999, 0, 0)"),
            Err(ParseColorError::ChannelOverflow("99999999999".to_string()))
        );
    }

    // ── Channel policy ───────────────────────────────────────────────────

    #[test]
    fn permissive_keeps_out_of_range_values() {
        assert_eq!(parse_color("rgb(999, 0, 0)"), Ok(rgba(999, 0, 0, 1.0)));
        assert_eq!(parse_color("rgba(0, 0, 0, 2.5)"), Ok(rgba(0, 0, 0, 2.5)));
    }

    #[test]
    fn clamp_policy_bounds_values() {
        let c = parse_color_with("rgba(999, 12, 300, 2.5)", ChannelPolicy::Clamp).unwrap();
        assert_eq!(c, rgba(255, 12, 255, 1.0));
    }

    #[test]
    fn reject_policy_fails_on_out_of_range() {
        assert_eq!(
            parse_color_with("rgb(0, 999, 0)", ChannelPolicy::Reject),
            Err(ParseColorError::ChannelOutOfRange {
                channel: 'g',
                value: 999
            })
        );
        assert_eq!(
            parse_color_with("rgba(0, 0, 0, 1.5)", ChannelPolicy::Reject),
            Err(ParseColorError::AlphaOutOfRange(1.5))
        );
        assert!(parse_color_with("rgb(255, 255, 255)", ChannelPolicy::Reject).is_ok());
    }

    #[test]
    fn policy_from_str() {
        assert_eq!("Clamp".parse(), Ok(ChannelPolicy::Clamp));
        assert!("strict".parse::<ChannelPolicy>().is_err());
    }

    // ── Transparency ─────────────────────────────────────────────────────

    #[test]
    fn transparent_keywords() {
        assert!(is_transparent_keyword("transparent"));
        assert!(is_transparent_keyword("rgba(0, 0, 0, 0)"));
        assert!(is_transparent_keyword(" RGBA(0,0,0,0) "));
        assert!(!is_transparent_keyword("rgba(0, 0, 0, 0.1)"));
        assert!(!is_transparent_keyword("#000"));
    }

    // ── Compositing ──────────────────────────────────────────────────────

    #[test]
    fn composite_half_red_over_white_rounds_half_up() {
        let red = rgba(255, 0, 0, 0.5);
        assert_eq!(red.composite_over(ColorRgba::WHITE), rgba(255, 128, 128, 1.0));
    }

    #[test]
    fn composite_opaque_keeps_foreground() {
        let fg = rgba(10, 20, 30, 1.0);
        assert_eq!(fg.composite_over(ColorRgba::WHITE), fg);
    }

    #[test]
    fn composite_transparent_shows_backdrop() {
        let fg = rgba(10, 20, 30, 0.0);
        assert_eq!(fg.composite_over(ColorRgba::BLACK), ColorRgba::BLACK);
    }

    // ── Formatting ───────────────────────────────────────────────────────

    #[test]
    fn display_forms() {
        assert_eq!(ColorRgba::rgb(1, 2, 3).to_string(), "rgb(1, 2, 3)");
        assert_eq!(
            ColorRgba::rgba(1, 2, 3, 0.5).to_string(),
            "rgba(1, 2, 3, 0.5)"
        );
    }

    #[test]
    fn to_hex_saturates() {
        assert_eq!(ColorRgba::rgb(200, 100, 50).to_hex(), "#c86432");
        assert_eq!(rgba(999, 0, 0, 1.0).to_hex(), "#ff0000");
    }
}
