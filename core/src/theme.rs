//! Themes and ink colours.
//!
//! A theme is plain data: a name plus a token set (paper colour, ink palette,
//! typeface, sign-off). Adding a theme never touches the state machine; the
//! [`ThemeBook`] simply gains a row.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the theme used when a lookup misses.
pub const DEFAULT_THEME: &str = "love";

/// 8-bit RGB colour, written as `#rrggbb` in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Components scaled to 0.0..=1.0.
    pub fn unit(&self) -> (f32, f32, f32) {
        (
            f32::from(self.0) / 255.0,
            f32::from(self.1) / 255.0,
            f32::from(self.2) / 255.0,
        )
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("invalid colour '{}': expected #rrggbb", s));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|e| format!("invalid colour '{}': {}", s, e))
        };
        Ok(Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Ink ribbon colour. Purely cosmetic; the machine never looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InkColor {
    #[default]
    Black,
    Red,
    Blue,
    Green,
}

impl InkColor {
    pub const ALL: [InkColor; 4] = [
        InkColor::Black,
        InkColor::Red,
        InkColor::Blue,
        InkColor::Green,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InkColor::Black => "black",
            InkColor::Red => "red",
            InkColor::Blue => "blue",
            InkColor::Green => "green",
        }
    }
}

impl FromStr for InkColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InkColor::ALL
            .into_iter()
            .find(|ink| ink.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown ink '{}': expected black, red, blue or green", s))
    }
}

impl fmt::Display for InkColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How each ink renders on a theme's paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InkPalette {
    pub black: Rgb,
    pub red: Rgb,
    pub blue: Rgb,
    pub green: Rgb,
}

impl InkPalette {
    pub fn color(&self, ink: InkColor) -> Rgb {
        match ink {
            InkColor::Black => self.black,
            InkColor::Red => self.red,
            InkColor::Blue => self.blue,
            InkColor::Green => self.green,
        }
    }
}

/// Typeface family used on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Typeface {
    #[default]
    Sans,
    Mono,
}

/// Visual token set of one theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeTokens {
    pub name: String,
    pub paper: Rgb,
    pub ink: InkPalette,
    #[serde(default)]
    pub typeface: Typeface,
    #[serde(default = "default_sign_off")]
    pub sign_off: String,
}

fn default_sign_off() -> String {
    "With love,".to_string()
}

impl ThemeTokens {
    pub fn love() -> Self {
        Self {
            name: "love".to_string(),
            paper: Rgb(0xff, 0xfb, 0xfc),
            ink: InkPalette {
                black: Rgb(0xa4, 0x13, 0x3c),
                red: Rgb(0xc9, 0x18, 0x4a),
                blue: Rgb(0x72, 0x09, 0xb7),
                green: Rgb(0x2d, 0x6a, 0x4f),
            },
            typeface: Typeface::Sans,
            sign_off: default_sign_off(),
        }
    }

    pub fn vintage() -> Self {
        Self {
            name: "vintage".to_string(),
            paper: Rgb(0xfa, 0xf8, 0xf3),
            ink: InkPalette {
                black: Rgb(0x2b, 0x2b, 0x2b),
                red: Rgb(0x8b, 0x00, 0x00),
                blue: Rgb(0x00, 0x33, 0x66),
                green: Rgb(0x2d, 0x50, 0x16),
            },
            typeface: Typeface::Mono,
            sign_off: default_sign_off(),
        }
    }
}

/// Table of known themes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeBook {
    themes: Vec<ThemeTokens>,
}

impl ThemeBook {
    /// Built-in themes only.
    pub fn builtin() -> Self {
        Self {
            themes: vec![ThemeTokens::love(), ThemeTokens::vintage()],
        }
    }

    /// Built-ins plus `extra`. An extra theme with a built-in name replaces it.
    pub fn with_extra<I: IntoIterator<Item = ThemeTokens>>(extra: I) -> Self {
        let mut book = Self::builtin();
        for theme in extra {
            book.insert(theme);
        }
        book
    }

    /// Add or replace a theme.
    pub fn insert(&mut self, theme: ThemeTokens) {
        match self.themes.iter_mut().find(|t| t.name == theme.name) {
            Some(slot) => *slot = theme,
            None => self.themes.push(theme),
        }
    }

    /// Exact lookup.
    pub fn get(&self, name: &str) -> Option<&ThemeTokens> {
        self.themes.iter().find(|t| t.name == name)
    }

    /// Lookup falling back to the default theme.
    pub fn resolve(&self, name: &str) -> &ThemeTokens {
        // Built-ins are never removed, so the table is never empty
        self.get(name)
            .or_else(|| self.get(DEFAULT_THEME))
            .unwrap_or(&self.themes[0])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Theme names in table order.
    pub fn names(&self) -> Vec<&str> {
        self.themes.iter().map(|t| t.name.as_str()).collect()
    }
}

impl Default for ThemeBook {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_parse_and_display() {
        let c: Rgb = "#a4133c".parse().unwrap();
        assert_eq!(c, Rgb(0xa4, 0x13, 0x3c));
        assert_eq!(c.to_string(), "#a4133c");
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("#gg0000".parse::<Rgb>().is_err());
    }

    #[test]
    fn ink_parse() {
        assert_eq!("Red".parse::<InkColor>().unwrap(), InkColor::Red);
        assert!("purple".parse::<InkColor>().is_err());
    }

    #[test]
    fn builtin_lookup_and_fallback() {
        let book = ThemeBook::builtin();
        assert_eq!(book.names(), vec!["love", "vintage"]);
        assert_eq!(book.resolve("vintage").typeface, Typeface::Mono);
        assert_eq!(book.resolve("neon").name, "love");
    }

    #[test]
    fn palette_resolves_ink() {
        let love = ThemeTokens::love();
        assert_eq!(love.ink.color(InkColor::Blue), Rgb(0x72, 0x09, 0xb7));
    }

    #[test]
    fn extra_theme_extends_book() {
        let mut midnight = ThemeTokens::vintage();
        midnight.name = "midnight".to_string();
        midnight.paper = Rgb(0x10, 0x10, 0x20);

        let book = ThemeBook::with_extra([midnight.clone()]);
        assert!(book.contains("midnight"));
        assert_eq!(book.resolve("midnight"), &midnight);
        assert_eq!(book.names().len(), 3);
    }

    #[test]
    fn theme_tokens_from_toml() {
        let toml_src = r##"
            name = "mint"
            paper = "#f0fff4"
            typeface = "mono"

            [ink]
            black = "#111111"
            red = "#aa0000"
            blue = "#0000aa"
            green = "#00aa00"
        "##;
        let theme: ThemeTokens = toml::from_str(toml_src).unwrap();
        assert_eq!(theme.paper, Rgb(0xf0, 0xff, 0xf4));
        assert_eq!(theme.sign_off, "With love,");
        assert_eq!(theme.typeface, Typeface::Mono);
    }
}
