use serde::Deserialize;

/// Linear-ish RGB in `[0, 1]`, parsed from CSS-style hex or a packed
/// `0xrrggbb` number.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
#[serde(try_from = "ColorRepr")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError {
    pub input: String,
}

impl std::fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid color {:?}: expected #rrggbb, #rgb or 0xrrggbb",
            self.input
        )
    }
}

impl std::error::Error for ColorParseError {}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex_u32(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::rgb(channel(16), channel(8), channel(0))
    }

    pub fn from_hex_str(input: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError {
            input: input.to_string(),
        };
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("0x"))
            .ok_or_else(err)?;

        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return Err(err()),
        };
        let value = u32::from_str_radix(&expanded, 16).map_err(|_| err())?;
        Ok(Self::from_hex_u32(value))
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    pub fn lerp(self, other: Color, t: f32) -> Self {
        Self::rgb(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Hex(String),
    Packed(u64),
}

impl TryFrom<ColorRepr> for Color {
    type Error = ColorParseError;

    fn try_from(value: ColorRepr) -> Result<Self, Self::Error> {
        match value {
            ColorRepr::Hex(s) => Self::from_hex_str(&s),
            ColorRepr::Packed(n) => u32::try_from(n)
                .ok()
                .filter(|n| *n <= 0xff_ffff)
                .map(Self::from_hex_u32)
                .ok_or_else(|| ColorParseError {
                    input: n.to_string(),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(
            Color::from_hex_str("#00ff88").expect("long").to_rgb8(),
            [0x00, 0xff, 0x88]
        );
        assert_eq!(
            Color::from_hex_str("#0f8").expect("short").to_rgb8(),
            [0x00, 0xff, 0x88]
        );
        assert_eq!(
            Color::from_hex_str("0x001a1a").expect("0x").to_rgb8(),
            [0x00, 0x1a, 0x1a]
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(Color::from_hex_str("teal").is_err());
        assert!(Color::from_hex_str("#12345").is_err());
        assert!(Color::from_hex_str("#gggggg").is_err());
    }

    #[test]
    fn deserializes_from_json_string() {
        let c: Color = serde_json::from_str("\"#ffffff\"").expect("color");
        assert_eq!(c, Color::WHITE);
        assert!(serde_json::from_str::<Color>("\"nope\"").is_err());
    }

    #[test]
    fn deserializes_from_packed_number() {
        let c: Color = serde_json::from_str("65416").expect("color");
        assert_eq!(c.to_rgb8(), [0x00, 0xff, 0x88]);
        assert!(serde_json::from_str::<Color>("16777216").is_err());
        assert!(serde_json::from_str::<Color>("-1").is_err());
    }
}
