//! Element-scoped screenshots
//!
//! agent-browser only captures pages, so element captures crop a full-page
//! screenshot to the element's device-pixel box.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::{Result, VerifyError};

/// Element box in document device pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Clamp to an image of `width` x `height`, returning `(x, y, w, h)`
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let x = self.x.max(0.0).floor() as u32;
        let y = self.y.max(0.0).floor() as u32;
        if x >= width || y >= height {
            return None;
        }
        let w = (self.width.max(0.0).ceil() as u32).min(width - x);
        let h = (self.height.max(0.0).ceil() as u32).min(height - y);
        if w == 0 || h == 0 {
            return None;
        }
        Some((x, y, w, h))
    }
}

/// Crop `source` to `rect` and write the result to `dest`
pub fn crop_png(source: &Path, dest: &Path, rect: &BoundingBox) -> Result<()> {
    let image = image::open(source)?;
    let (x, y, w, h) = rect
        .clamp_to(image.width(), image.height())
        .ok_or_else(|| {
            VerifyError::browser(format!(
                "Element box {:?} lies outside the {}x{} screenshot",
                rect,
                image.width(),
                image.height()
            ))
        })?;
    image.crop_imm(x, y, w, h).save(dest)?;
    Ok(())
}
