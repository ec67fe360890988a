//! Certificate compositing.
//!
//! One synchronous pass: blit the decoded template at the origin, then draw
//! the subject name at the resolved anchor. The output surface is sized
//! exactly to the template's native pixel dimensions, and identical inputs
//! always produce pixel-identical output; previews and final exports are
//! the same bytes.
//!
//! Text placement keeps the organizer's mental model: left-anchored
//! horizontally, vertically centered on the anchor (the glyph baseline sits
//! `(ascent + descent) / 2` below it).

use crate::render::geometry::Anchor;
use crate::render::template::DecodedTemplate;
use crate::render::typeface::Typeface;
use image::{Rgba, RgbaImage};
use rusttype::{Font, Scale, point};
use std::fmt;

/// Ink color for the subject name, fixed by the certificate design.
pub const INK_COLOR: Rgba<u8> = Rgba([0x33, 0x33, 0x33, 0xff]);

/// The pixel output of one successful render: template plus subject name.
///
/// Owned by the render attempt that produced it; handed to the exporter or
/// the preview display, never shared across attempts.
pub struct RasterSurface {
    image: RgbaImage,
}

impl fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl RasterSurface {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.image
    }

    /// Raw RGBA bytes, row-major. Byte equality here is the determinism
    /// guarantee between preview and export.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }
}

/// Draw the template and subject name into a fresh surface.
///
/// Glyph fragments falling outside the template bounds are clipped, so any
/// anchor inside 0-100% is safe for any name length.
pub fn compose(
    template: &DecodedTemplate,
    typeface: &Typeface,
    font_size_px: f32,
    anchor: Anchor,
    subject_name: &str,
) -> RasterSurface {
    let mut image = template.as_rgba().clone();
    draw_subject_name(&mut image, typeface.font(), font_size_px, anchor, subject_name);
    RasterSurface { image }
}

fn draw_subject_name(
    image: &mut RgbaImage,
    font: &Font<'_>,
    size_px: f32,
    anchor: Anchor,
    text: &str,
) {
    let scale = Scale::uniform(size_px);
    let metrics = font.v_metrics(scale);
    // Middle vertical anchoring: the em midpoint sits on the anchor, so the
    // baseline lands (ascent + descent) / 2 below it (descent is negative).
    let baseline = anchor.y as f32 + (metrics.ascent + metrics.descent) / 2.0;

    for glyph in font.layout(text, scale, point(anchor.x as f32, baseline)) {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, coverage| {
                let px = bb.min.x + gx as i32;
                let py = bb.min.y + gy as i32;
                if px < 0 || py < 0 {
                    return;
                }
                let (px, py) = (px as u32, py as u32);
                if px >= image.width() || py >= image.height() {
                    return;
                }
                blend_ink(image.get_pixel_mut(px, py), coverage);
            });
        }
    }
}

/// Blend glyph coverage onto a destination pixel in the fixed ink color.
fn blend_ink(dst: &mut Rgba<u8>, coverage: f32) {
    let a = coverage.clamp(0.0, 1.0);
    if a == 0.0 {
        return;
    }
    for c in 0..3 {
        dst[c] = (INK_COLOR[c] as f32 * a + dst[c] as f32 * (1.0 - a)).round() as u8;
    }
    dst[3] = dst[3].max((a * 255.0).round() as u8);
}
