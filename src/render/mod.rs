//! Rasterization of grid layouts into RGBA frames.

pub mod cpu;
pub mod transition;

use std::path::Path;

use crate::foundation::error::{GridShiftError, GridShiftResult};

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight-alpha RGBA of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let p = [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]];
        if !self.premultiplied || p[3] == 255 || p[3] == 0 {
            return Some(p);
        }
        let unpremul = |c: u8| ((u16::from(c) * 255 + u16::from(p[3]) / 2) / u16::from(p[3])) as u8;
        Some([unpremul(p[0]), unpremul(p[1]), unpremul(p[2]), p[3]])
    }

    /// Encode as PNG. Layout frames are fully opaque, so no alpha conversion is needed.
    pub fn save_png(&self, path: &Path) -> GridShiftResult<()> {
        image::save_buffer_with_format(
            path,
            &self.data,
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| GridShiftError::io(format!("write png '{}': {e}", path.display())))
    }
}

pub use cpu::GridRenderer;
pub use transition::{PlannedFrame, TransitionPlan};
