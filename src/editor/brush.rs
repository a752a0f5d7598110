use crate::assets::TextureKey;
use crate::scene::{Material, Rgb};

pub const DEFAULT_PAINT_COLOR: Rgb = [0xff, 0x00, 0x00];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrushKind {
    #[default]
    Color,
    Texture,
}

impl BrushKind {
    pub const ALL: [BrushKind; 2] = [Self::Color, Self::Texture];

    pub fn label(self) -> &'static str {
        match self {
            Self::Color => "Color Brush",
            Self::Texture => "Texture Brush",
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BrushError {
    #[error("Please upload a texture for the Texture Brush.")]
    MissingTexture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brush {
    pub kind: BrushKind,
    pub color: Rgb,
    /// Last uploaded brush texture; a new upload replaces it.
    pub texture: Option<TextureKey>,
}

impl Default for Brush {
    fn default() -> Self {
        Self::with_color(DEFAULT_PAINT_COLOR)
    }
}

impl Brush {
    pub fn with_color(color: Rgb) -> Self {
        Self {
            kind: BrushKind::default(),
            color,
            texture: None,
        }
    }

    /// Paints `material` in place. A failed texture stroke leaves it untouched.
    pub fn apply(&self, material: &mut Material) -> Result<(), BrushError> {
        match self.kind {
            BrushKind::Color => {
                material.color = self.color;
            }
            BrushKind::Texture => {
                material.map = Some(self.texture.ok_or(BrushError::MissingTexture)?);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material() -> Material {
        Material {
            color: [10, 20, 30],
            map: None,
        }
    }

    #[test]
    fn color_stroke_is_idempotent() {
        let brush = Brush::with_color([1, 2, 3]);
        let mut once = material();
        brush.apply(&mut once).unwrap();
        let mut twice = once;
        brush.apply(&mut twice).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.color, [1, 2, 3]);
    }

    #[test]
    fn texture_stroke_without_texture_fails_cleanly() {
        let brush = Brush {
            kind: BrushKind::Texture,
            ..Brush::default()
        };
        let mut target = material();
        let err = brush.apply(&mut target).unwrap_err();
        assert_eq!(err.to_string(), "Please upload a texture for the Texture Brush.");
        assert_eq!(target, material());
    }
}
