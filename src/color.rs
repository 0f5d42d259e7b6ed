//! `#RRGGBB` color parsing.

use crate::error::RenderError;

/// An opaque 8-bit RGB color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

/// White, used as the modulation color for unmasked image draws.
pub const WHITE: Rgb = Rgb {
    r: 255,
    g: 255,
    b: 255,
};

impl Rgb {
    /// Parse a `#RRGGBB` string.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidColor`] unless `hex` is exactly seven
    /// bytes: `#` followed by six ASCII hex digits.
    pub fn parse(hex: &str) -> Result<Self, RenderError> {
        let bytes = hex.as_bytes();
        let well_formed =
            bytes.len() == 7 && bytes[0] == b'#' && bytes[1..].iter().all(u8::is_ascii_hexdigit);
        if !well_formed {
            return Err(RenderError::InvalidColor(hex.to_owned()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| RenderError::InvalidColor(hex.to_owned()))
        };

        Ok(Self {
            r: channel(1..3)?,
            g: channel(3..5)?,
            b: channel(5..7)?,
        })
    }

    /// Float RGBA vector `[r/255, g/255, b/255, alpha]`, as uploaded to the
    /// `u_color` uniform.
    #[must_use]
    pub fn to_vector(self, alpha: f32) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            alpha,
        ]
    }

    /// Nearest 8-bit color for a float RGB(A) vector. Alpha is ignored.
    #[must_use]
    pub fn from_vector(vector: [f32; 4]) -> Self {
        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self {
            r: byte(vector[0]),
            g: byte(vector[1]),
            b: byte(vector[2]),
        }
    }

    /// Upper-case `#RRGGBB` form.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Convert a `#RRGGBB` string and alpha to the shader's color vector.
///
/// # Errors
///
/// Returns [`RenderError::InvalidColor`] for malformed strings.
pub fn parse_color(hex: &str, alpha: f32) -> Result<[f32; 4], RenderError> {
    Ok(Rgb::parse(hex)?.to_vector(alpha))
}
