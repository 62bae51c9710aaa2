use std::fmt::{Display, Formatter};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Color representation.
///
/// In style documents a color can be written as an `[r, g, b]` array, an `[r, g, b, a]` array
/// (`a = 255` is opaque) or a hex string (`#RRGGBB` or `#RRGGBBAA`).
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    /// Opaque white, the background of a new canvas.
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    /// Opaque black, the default label color.
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    /// Opaque red.
    pub const RED: Color = Color::rgba(255, 0, 0, 255);
    /// Opaque blue.
    pub const BLUE: Color = Color::rgba(0, 0, 255, 255);
    /// Opaque light gray, used for legend borders.
    pub const GRAY: Color = Color::rgba(170, 170, 170, 255);

    /// Color with the given channels. Alpha 255 is opaque.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color with the given channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Channels as `[r, g, b, a]`, the pixel layout of `image::Rgba`.
    pub fn to_u8_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// `#RRGGBBAA` representation.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_u8_array();
        format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
    }

    /// Parses `#RRGGBB` or `#RRGGBBAA`. Returns `None` for anything else.
    pub fn try_from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 && digits.len() != 8 {
            return None;
        }

        let channel = |i: usize| u8::from_str_radix(digits.get(i * 2..i * 2 + 2)?, 16).ok();
        let alpha = if digits.len() == 8 { channel(3)? } else { 255 };

        Some(Self::rgba(channel(0)?, channel(1)?, channel(2)?, alpha))
    }

    /// Builds a color from a channel slice of length 3 (opaque) or 4.
    pub fn try_from_channels(channels: &[u8]) -> Option<Self> {
        match *channels {
            [r, g, b] => Some(Self::rgb(r, g, b)),
            [r, g, b, a] => Some(Self::rgba(r, g, b, a)),
            _ => None,
        }
    }

    /// Same color with alpha replaced.
    pub fn with_alpha(&self, a: u8) -> Self {
        Self { a, ..*self }
    }

    /// Whether drawing with this color changes nothing.
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Red channel.
    pub fn r(&self) -> u8 {
        self.r
    }

    /// Green channel.
    pub fn g(&self) -> u8 {
        self.g
    }

    /// Blue channel.
    pub fn b(&self) -> u8 {
        self.b
    }

    /// Alpha channel, 255 is opaque.
    pub fn a(&self) -> u8 {
        self.a
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Channels(Vec<u8>),
    Hex(String),
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match ColorRepr::deserialize(deserializer)? {
            ColorRepr::Channels(channels) => Color::try_from_channels(&channels).ok_or_else(|| {
                serde::de::Error::custom(format!(
                    "color must have 3 or 4 channels, got {}",
                    channels.len()
                ))
            }),
            ColorRepr::Hex(hex) => Color::try_from_hex(&hex)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color {hex}"))),
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_u8_array().serialize(serializer)
    }
}
