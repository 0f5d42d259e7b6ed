//! Fonts and text styling.

use std::collections::HashMap;

use crate::error::RenderError;

/// Horizontal alignment of text relative to the draw position.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// `x` is the left edge.
    #[default]
    Left,
    /// `x` is the horizontal center.
    Center,
    /// `x` is the right edge.
    Right,
}

/// How a string is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Font family name, as registered in a [`FontBook`].
    pub family: String,
    /// Pixel size.
    pub size: f32,
    /// Prefer the bold face of the family.
    pub bold: bool,
    /// Alignment around the draw position.
    pub align: TextAlign,
}

impl TextStyle {
    /// Regular, left-aligned text.
    #[must_use]
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            bold: false,
            align: TextAlign::Left,
        }
    }

    /// Use the bold face.
    #[must_use]
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Set the alignment.
    #[must_use]
    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }
}

/// Parsed fonts, keyed by family name and weight.
#[derive(Default)]
pub struct FontBook {
    fonts: HashMap<(String, bool), fontdue::Font>,
}

impl FontBook {
    /// An empty font book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TrueType or OpenType font and register it for `family`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::FontLoad`] if the bytes are not a font.
    pub fn load_font(&mut self, family: &str, bold: bool, bytes: &[u8]) -> Result<(), RenderError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default()).map_err(
            |reason| RenderError::FontLoad {
                family: family.to_owned(),
                reason: reason.to_owned(),
            },
        )?;
        self.fonts.insert((family.to_owned(), bold), font);
        Ok(())
    }

    /// The face for `family`. A missing bold face falls back to regular.
    #[must_use]
    pub fn get(&self, family: &str, bold: bool) -> Option<&fontdue::Font> {
        self.fonts
            .get(&(family.to_owned(), bold))
            .or_else(|| self.fonts.get(&(family.to_owned(), false)))
    }

    /// `true` if any face of `family` is registered.
    #[must_use]
    pub fn contains(&self, family: &str) -> bool {
        self.get(family, true).is_some()
    }
}

/// DejaVu Sans Mono, for tests that draw real glyphs.
#[cfg(test)]
pub(crate) const TEST_FONT: &[u8] = include_bytes!("test_data/DejaVuSansMono.ttf");
