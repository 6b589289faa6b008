use serde::{Deserialize, Serialize};

/// Straight (non-premultiplied) RGBA8 color as written in template JSON.
///
/// Accepted spellings: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
/// `rgba(r, g, b, a)` with `a` in `0..=1`, any other CSS color syntax (named colors, `hsl()`,
/// `hwb()`), and `[r, g, b(, a)]` arrays of 0..=255 channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Opaque color from channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color from channels including alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a color string.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }

        let lower = s.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_functional(args);
        }

        css(&lower).ok_or_else(|| format!("unrecognized color \"{s}\""))
    }

    /// Straight channels in `[r, g, b, a]` order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Premultiplied channels in `[r, g, b, a]` order.
    pub fn to_premul(self) -> [u8; 4] {
        crate::foundation::math::premultiply([self.r, self.g, self.b, self.a])
    }

    /// Same color with its alpha scaled by `opacity`.
    pub fn with_opacity(self, opacity: f32) -> Self {
        let op = ((opacity.clamp(0.0, 1.0) * 255.0).round()) as u16;
        Self {
            a: crate::foundation::math::mul_div255_u8(u16::from(self.a), op),
            ..self
        }
    }

    pub(crate) fn to_cpu(self) -> vello_cpu::peniko::Color {
        vello_cpu::peniko::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }

    /// `#rrggbbaa` form used when serializing.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl std::str::FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Arr(Vec<u8>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => Self::parse(&s).map_err(serde::de::Error::custom),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self::rgb(*r, *g, *b)),
                [r, g, b, a] => Ok(Self::rgba(*r, *g, *b, *a)),
                _ => Err(serde::de::Error::custom(
                    "color array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

fn parse_hex(s: &str) -> Result<Color, String> {
    fn nibble(c: u8) -> Result<u8, String> {
        (c as char)
            .to_digit(16)
            .map(|d| d as u8)
            .ok_or_else(|| format!("invalid hex digit '{}'", c as char))
    }

    let bytes = s.as_bytes();
    let digits = bytes
        .iter()
        .map(|&c| nibble(c))
        .collect::<Result<Vec<u8>, String>>()?;

    match digits.as_slice() {
        [r, g, b] => Ok(Color::rgb(r * 17, g * 17, b * 17)),
        [r, g, b, a] => Ok(Color::rgba(r * 17, g * 17, b * 17, a * 17)),
        [r1, r0, g1, g0, b1, b0] => Ok(Color::rgb(r1 << 4 | r0, g1 << 4 | g0, b1 << 4 | b0)),
        [r1, r0, g1, g0, b1, b0, a1, a0] => Ok(Color::rgba(
            r1 << 4 | r0,
            g1 << 4 | g0,
            b1 << 4 | b0,
            a1 << 4 | a0,
        )),
        _ => Err("hex color must be #RGB, #RGBA, #RRGGBB or #RRGGBBAA".to_owned()),
    }
}

fn parse_functional(args: &str) -> Result<Color, String> {
    let parts = args.split(',').map(str::trim).collect::<Vec<_>>();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(format!("expected 3 or 4 color components, got {}", parts.len()));
    }

    fn channel(p: &str) -> Result<u8, String> {
        let v = if let Some(pct) = p.strip_suffix('%') {
            pct.trim()
                .parse::<f64>()
                .map(|v| v * 2.55)
                .map_err(|_| format!("invalid channel \"{p}\""))?
        } else {
            p.parse::<f64>()
                .map_err(|_| format!("invalid channel \"{p}\""))?
        };
        Ok(v.round().clamp(0.0, 255.0) as u8)
    }

    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = match parts.get(3) {
        Some(p) => {
            let a = p
                .parse::<f64>()
                .map_err(|_| format!("invalid alpha \"{p}\""))?;
            (a.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };
    Ok(Color::rgba(r, g, b, a))
}

fn css(s: &str) -> Option<Color> {
    use vello_cpu::peniko::color::{Srgb, parse_color};

    let rgba = parse_color(s).ok()?.to_alpha_color::<Srgb>().to_rgba8();
    Some(Color::rgba(rgba.r, rgba.g, rgba.b, rgba.a))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
