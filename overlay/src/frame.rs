//! Overlay frame abstraction
//!
//! `OverlayFrame` owns the pixel surface and the chrome shared by every
//! pixmap overlay:
//! - Rounded background with configurable alpha, sized to the content
//! - Scaling calculations against base dimensions
//! - PNG export of the finished frame
//!
//! Overlays only draw their content between `begin_frame` and `end_frame`.

#![allow(clippy::too_many_arguments)]
use std::path::Path;

use thiserror::Error;
use tiny_skia::{
    Color, FillRule, Paint, Path as SkPath, PathBuilder, Pixmap, PremultipliedColorU8, Rect,
    Stroke, Transform,
};

use crate::widgets::colors;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("invalid frame size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("failed to encode frame: {0}")]
    Png(String),
}

/// A headless pixel surface with overlay chrome
pub struct OverlayFrame {
    pixmap: Pixmap,
    background_alpha: u8,
    base_width: f32,
    /// Frames committed since creation
    generation: u64,
}

impl OverlayFrame {
    /// Create a new overlay frame
    ///
    /// # Arguments
    /// * `width`, `height` - Initial surface size in pixels
    /// * `base_width` - Reference width for scaling calculations
    pub fn new(width: u32, height: u32, base_width: f32) -> Result<Self, FrameError> {
        let pixmap = Pixmap::new(width, height).ok_or(FrameError::InvalidSize { width, height })?;

        Ok(Self {
            pixmap,
            background_alpha: 180,
            base_width,
            generation: 0,
        })
    }

    /// Set the background alpha (0-255)
    pub fn set_background_alpha(&mut self, alpha: u8) {
        self.background_alpha = alpha;
    }

    /// Get the background alpha
    pub fn background_alpha(&self) -> u8 {
        self.background_alpha
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scaling
    // ─────────────────────────────────────────────────────────────────────────

    /// Calculate scale factor based on current surface width vs base width
    ///
    /// Rows grow the surface vertically, so only the width ratio counts.
    pub fn scale_factor(&self) -> f32 {
        let width = self.pixmap.width() as f32;
        if self.base_width <= 0.0 {
            return 1.0;
        }
        width / self.base_width
    }

    /// Scale a base value by the current scale factor
    #[inline]
    pub fn scaled(&self, base_value: f32) -> f32 {
        base_value * self.scale_factor()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Frame rendering
    // ─────────────────────────────────────────────────────────────────────────

    /// Begin a new frame with the background sized to the given content height
    ///
    /// The rest of the surface stays fully transparent.
    pub fn begin_frame(&mut self, content_height: f32) {
        let width = self.pixmap.width() as f32;
        let height = self.pixmap.height() as f32;
        let corner_radius = self.scaled(6.0);

        self.clear();

        if self.background_alpha > 0 && content_height > 0.0 {
            let bg_color = Color::from_rgba8(30, 30, 30, self.background_alpha);
            self.fill_rounded_rect(
                0.0,
                0.0,
                width,
                content_height.min(height),
                corner_radius,
                bg_color,
            );
        }
    }

    /// End the frame
    pub fn end_frame(&mut self) {
        self.generation += 1;
    }

    /// Wipe the surface to transparent
    pub fn clear(&mut self) {
        self.pixmap.fill(colors::transparent());
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Drawing helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Draw a filled rectangle
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        let Some(rect) = Rect::from_xywh(x, y, w, h) else {
            return;
        };
        self.pixmap
            .fill_rect(rect, &paint(color), Transform::identity(), None);
    }

    /// Draw a filled rounded rectangle
    pub fn fill_rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Color) {
        if let Some(path) = rounded_rect_path(x, y, w, h, radius) {
            self.pixmap.fill_path(
                &path,
                &paint(color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    /// Draw a rounded rectangle outline
    pub fn stroke_rounded_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        stroke_width: f32,
        color: Color,
    ) {
        if let Some(path) = rounded_rect_path(x, y, w, h, radius) {
            let stroke = Stroke {
                width: stroke_width,
                ..Stroke::default()
            };
            self.pixmap
                .stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
        }
    }

    /// Draw a filled circle
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        if let Some(path) = PathBuilder::from_circle(cx, cy, radius) {
            self.pixmap.fill_path(
                &path,
                &paint(color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Surface access
    // ─────────────────────────────────────────────────────────────────────────

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Resize the surface. Contents are discarded.
    pub fn set_size(&mut self, width: u32, height: u32) -> Result<(), FrameError> {
        if width == self.pixmap.width() && height == self.pixmap.height() {
            return Ok(());
        }
        self.pixmap = Pixmap::new(width, height).ok_or(FrameError::InvalidSize { width, height })?;
        Ok(())
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Premultiplied pixel at `(x, y)`, if inside the surface
    pub fn pixel(&self, x: u32, y: u32) -> Option<PremultipliedColorU8> {
        self.pixmap.pixel(x, y)
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, FrameError> {
        self.pixmap
            .encode_png()
            .map_err(|e| FrameError::Png(e.to_string()))
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), FrameError> {
        self.pixmap
            .save_png(path)
            .map_err(|e| FrameError::Png(e.to_string()))
    }
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

fn rounded_rect_path(x: f32, y: f32, w: f32, h: f32, radius: f32) -> Option<SkPath> {
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let r = radius.max(0.0).min(w / 2.0).min(h / 2.0);
    let (right, bottom) = (x + w, y + h);

    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(right - r, y);
    pb.quad_to(right, y, right, y + r);
    pb.line_to(right, bottom - r);
    pb.quad_to(right, bottom, right - r, bottom);
    pb.line_to(x + r, bottom);
    pb.quad_to(x, bottom, x, bottom - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    pb.finish()
}
