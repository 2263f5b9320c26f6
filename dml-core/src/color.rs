//! Color resolution for math rendering
//!
//!     Math is typeset as foreground color `C` on a page colored with the complement `¬C`, and the
//!     rasterizer then keys `¬C` out to transparency. Resolution is total: anything that is not a
//!     known name or valid hex falls back to white on black instead of failing the render.
//!
//!     The fuzz level is the tolerance handed to the rasterizer when keying out the background.
//!     It is an empirically tuned table ([`FuzzPolicy`]), not a derivation, and callers may
//!     replace every number in it.

use std::fmt;

/// Named colors accepted by [`resolve`] (CSS/X11 names).
const NAMED_COLORS: &[(&str, HexColor)] = &[
    ("black", HexColor::new(0x00, 0x00, 0x00)),
    ("white", HexColor::new(0xFF, 0xFF, 0xFF)),
    ("red", HexColor::new(0xFF, 0x00, 0x00)),
    ("green", HexColor::new(0x00, 0xFF, 0x00)),
    ("blue", HexColor::new(0x00, 0x00, 0xFF)),
    ("yellow", HexColor::new(0xFF, 0xFF, 0x00)),
    ("cyan", HexColor::new(0x00, 0xFF, 0xFF)),
    ("magenta", HexColor::new(0xFF, 0x00, 0xFF)),
    ("gray", HexColor::new(0x80, 0x80, 0x80)),
    ("grey", HexColor::new(0x80, 0x80, 0x80)),
    ("orange", HexColor::new(0xFF, 0xA5, 0x00)),
    ("purple", HexColor::new(0x80, 0x00, 0x80)),
    ("brown", HexColor::new(0xA5, 0x2A, 0x2A)),
    ("pink", HexColor::new(0xFF, 0xC0, 0xCB)),
    ("lime", HexColor::new(0x00, 0xFF, 0x00)),
    ("navy", HexColor::new(0x00, 0x00, 0x80)),
    ("teal", HexColor::new(0x00, 0x80, 0x80)),
    ("maroon", HexColor::new(0x80, 0x00, 0x00)),
    ("olive", HexColor::new(0x80, 0x80, 0x00)),
    ("silver", HexColor::new(0xC0, 0xC0, 0xC0)),
];

/// A canonical 24-bit color, displayed as uppercase `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const WHITE: HexColor = HexColor::new(0xFF, 0xFF, 0xFF);
    pub const BLACK: HexColor = HexColor::new(0x00, 0x00, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        HexColor { r, g, b }
    }

    /// Per-channel bitwise complement.
    pub fn complement(self) -> HexColor {
        HexColor::new(!self.r, !self.g, !self.b)
    }

    /// The six hex digits without the leading `#` (the form `\definecolor{..}{HTML}` wants).
    pub fn digits(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// ITU-R 601 luma, normalized to `0.0..=1.0`.
    pub fn brightness(&self) -> f64 {
        (0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b)) / 255.0
    }

    /// `(max - min) / max` over the channels; zero for black.
    pub fn saturation(&self) -> f64 {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        if max == 0 {
            0.0
        } else {
            f64::from(max - min) / f64::from(max)
        }
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.digits())
    }
}

/// Resolve a color name or `#RGB`/`#RRGGBB` string.
///
/// Names are matched case-insensitively, surrounding whitespace is ignored.
/// Returns `None` for anything unrecognized; see [`ColorScheme::from_spec`] for the
/// defaulting policy.
pub fn resolve(spec: &str) -> Option<HexColor> {
    let spec = spec.trim().to_ascii_lowercase();
    if let Some(hex) = spec.strip_prefix('#') {
        return parse_hex_digits(hex);
    }
    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == spec)
        .map(|(_, color)| *color)
}

/// Parse 3 or 6 hex digits, expanding the short form (`f0a` → `ff00aa`).
fn parse_hex_digits(hex: &str) -> Option<HexColor> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let expand = |i: usize| channel(&hex[i..=i].repeat(2));
            Some(HexColor::new(expand(0)?, expand(1)?, expand(2)?))
        }
        6 => Some(HexColor::new(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        _ => None,
    }
}

/// Background-removal tolerance table, in percent.
///
/// Rules are applied in order, later matches overriding earlier ones:
/// base → bright low-saturation → dominant red → dominant blue → other saturated hues.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzPolicy {
    pub base: f64,
    pub bright: f64,
    pub red: f64,
    pub blue: f64,
    pub saturated: f64,
    pub bright_min_brightness: f64,
    pub bright_max_saturation: f64,
    pub saturated_min_saturation: f64,
    pub saturated_min_brightness: f64,
    /// A channel at or above this is "high" when classifying red/blue
    pub primary_high: u8,
    /// The other channels must stay below this for red/blue
    pub primary_low: u8,
}

impl Default for FuzzPolicy {
    fn default() -> Self {
        FuzzPolicy {
            base: 45.0,
            bright: 30.0,
            red: 65.0,
            blue: 70.0,
            saturated: 55.0,
            bright_min_brightness: 0.9,
            bright_max_saturation: 0.1,
            saturated_min_saturation: 0.7,
            saturated_min_brightness: 0.3,
            primary_high: 200,
            primary_low: 100,
        }
    }
}

impl FuzzPolicy {
    pub fn fuzz_level(&self, color: &HexColor) -> f64 {
        let brightness = color.brightness();
        let saturation = color.saturation();
        let is_red = self.dominant(color.r, color.g, color.b);
        let is_blue = self.dominant(color.b, color.r, color.g);

        let mut level = self.base;
        if brightness > self.bright_min_brightness && saturation < self.bright_max_saturation {
            level = self.bright;
        }
        if is_red {
            level = self.red;
        }
        if is_blue {
            level = self.blue;
        }
        if saturation > self.saturated_min_saturation
            && brightness > self.saturated_min_brightness
            && !is_red
            && !is_blue
        {
            level = self.saturated;
        }
        level
    }

    fn dominant(&self, primary: u8, other_a: u8, other_b: u8) -> bool {
        primary > self.primary_high && other_a < self.primary_low && other_b < self.primary_low
    }
}

/// Foreground plus the complement used as page color and transparency key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub foreground: HexColor,
    pub background: HexColor,
}

impl ColorScheme {
    pub fn new(foreground: HexColor) -> Self {
        ColorScheme {
            foreground,
            background: foreground.complement(),
        }
    }

    /// Resolve `spec`, substituting white on black when it is not recognized.
    pub fn from_spec(spec: &str) -> Self {
        match resolve(spec) {
            Some(color) => ColorScheme::new(color),
            None => {
                log::debug!("Unrecognized colour '{spec}', using white on black");
                ColorScheme::default()
            }
        }
    }

    /// The color the rasterizer turns transparent.
    pub fn transparency_key(&self) -> HexColor {
        self.background
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        ColorScheme::new(HexColor::WHITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn resolves_names_case_insensitively() {
        assert_eq!(resolve("Red"), Some(HexColor::new(0xFF, 0, 0)));
        assert_eq!(resolve("  navy "), Some(HexColor::new(0, 0, 0x80)));
        assert_eq!(resolve("GREY"), resolve("gray"));
        assert!(NAMED_COLORS.len() >= 18);
    }

    #[test]
    fn resolves_and_expands_hex() {
        assert_eq!(resolve("#f0a").unwrap().to_string(), "#FF00AA");
        assert_eq!(resolve("#00ff7F").unwrap().to_string(), "#00FF7F");
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(resolve("chartreuse-ish"), None);
        assert_eq!(resolve("#12345"), None);
        assert_eq!(resolve("#ggg"), None);
        assert_eq!(resolve("00FF00"), None);
        assert_eq!(resolve(""), None);
    }

    #[test]
    fn complement_is_bitwise_not() {
        assert_eq!(HexColor::WHITE.complement(), HexColor::BLACK);
        assert_eq!(
            resolve("#123456").unwrap().complement().to_string(),
            "#EDCBA9"
        );
    }

    #[test]
    fn unresolved_spec_falls_back_to_white_on_black() {
        let scheme = ColorScheme::from_spec("not-a-colour");
        assert_eq!(scheme.foreground, HexColor::WHITE);
        assert_eq!(scheme.transparency_key(), HexColor::BLACK);
    }

    #[test]
    fn fuzz_levels_follow_default_table() {
        let policy = FuzzPolicy::default();
        let level = |spec: &str| policy.fuzz_level(&resolve(spec).unwrap());
        assert_eq!(level("white"), 30.0);
        assert_eq!(level("red"), 65.0);
        assert_eq!(level("blue"), 70.0);
        assert_eq!(level("green"), 55.0);
        assert_eq!(level("black"), 45.0);
        assert_eq!(level("grey"), 45.0);
    }

    #[test]
    fn fuzz_policy_is_overridable() {
        let policy = FuzzPolicy {
            red: 80.0,
            ..FuzzPolicy::default()
        };
        assert_eq!(policy.fuzz_level(&HexColor::new(0xFF, 0, 0)), 80.0);
    }

    proptest! {
        #[test]
        fn complement_is_an_involution(r: u8, g: u8, b: u8) {
            let color = HexColor::new(r, g, b);
            prop_assert_eq!(color.complement().complement(), color);
        }

        #[test]
        fn complement_resolves_to_itself(r: u8, g: u8, b: u8) {
            let complement = HexColor::new(r, g, b).complement();
            prop_assert_eq!(resolve(&complement.to_string()), Some(complement));
        }
    }
}
