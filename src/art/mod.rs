// Album art as colored ASCII - every pixel becomes one tinted glyph
// Terminal cells are roughly twice as tall as they are wide, hence the 0.55 squash

mod converter; // downloads + decodes artwork, never fails past its boundary

pub use converter::{ArtError, ArtSource, ArtworkConverter};

use image::{imageops::FilterType, DynamicImage};

/// Default grid width in characters.
pub const ART_WIDTH: u32 = 70;

/// Vertical squash applied to the source aspect ratio.
pub const CELL_ASPECT: f32 = 0.55;

/// Glyph ramp, densest first. Index 0 is used for black, the last entry for white.
pub const PALETTE: &str = r#"$@B%8&WM#*oahkbdpqwmZO0QLCJUYXzcvunxrjft/\|()1{}[]?-_+~<>i!lI;:,\"^`'. "#;

const PLACEHOLDER_TEXT: &str = "No Image";
const PLACEHOLDER_TINT: Rgb = Rgb(255, 0, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphCell {
    pub glyph: char,
    pub tint: Rgb,
}

/// Row-major glyph grid. Each row is one output line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GlyphArt {
    width: usize,
    cells: Vec<GlyphCell>,
}

impl GlyphArt {
    /// Empty art - what the dashboard shows before the first track arrives.
    pub fn blank() -> Self {
        Self::default()
    }

    /// Fixed "No Image" art used whenever artwork can't be fetched or decoded.
    pub fn placeholder() -> Self {
        let cells: Vec<GlyphCell> = PLACEHOLDER_TEXT
            .chars()
            .map(|glyph| GlyphCell { glyph, tint: PLACEHOLDER_TINT })
            .collect();
        Self { width: cells.len(), cells }
    }

    pub fn from_image(image: &DynamicImage, width: u32) -> Self {
        let width = width.max(1);
        let height = grid_height(image.width(), image.height(), width);
        let resized = image
            .resize_exact(width, height, FilterType::CatmullRom)
            .to_rgb8();

        let palette: Vec<char> = PALETTE.chars().collect();
        let cells = resized
            .pixels()
            .map(|pixel| {
                let [r, g, b] = pixel.0;
                GlyphCell {
                    glyph: palette[glyph_index(luminance(r, g, b), palette.len())],
                    tint: Rgb(r, g, b),
                }
            })
            .collect();

        Self { width: width as usize, cells }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.cells.len() / self.width
        }
    }

    pub fn is_blank(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[GlyphCell]> {
        self.cells.chunks(self.width.max(1))
    }

    /// Plain-text rendition, one line per row.
    pub fn to_plain_string(&self) -> String {
        self.rows()
            .map(|row| row.iter().map(|cell| cell.glyph).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// ITU-R BT.601 luma, in 0.0..=255.0
pub fn luminance(r: u8, g: u8, b: u8) -> f32 {
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}

/// Linear map from luminance onto a palette of `palette_len` glyphs.
pub fn glyph_index(luminance: f32, palette_len: usize) -> usize {
    if palette_len == 0 {
        return 0;
    }
    let last = palette_len - 1;
    let scaled = (luminance.clamp(0.0, 255.0) / 255.0) * last as f32;
    (scaled.round() as usize).min(last)
}

/// Rows needed for `width` columns, keeping the source aspect ratio.
pub fn grid_height(source_width: u32, source_height: u32, width: u32) -> u32 {
    if source_width == 0 {
        return 1;
    }
    let aspect = source_height as f32 / source_width as f32;
    ((width as f32 * aspect * CELL_ASPECT).round() as u32).max(1)
}
