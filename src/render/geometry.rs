//! Pure anchor-point calculation.
//!
//! Maps normalized placement percentages to absolute pixel coordinates on a
//! template of known size. No I/O, no state; testable without any images.

/// Absolute text anchor on a raster, in pixels.
///
/// The subject name is drawn left-anchored horizontally at `x` and vertically
/// centered on `y` (the glyph baseline is derived from font metrics, not
/// stored here).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
}

/// Resolve placement percentages against a template's native pixel size.
///
/// `anchor.x = width * position_x / 100`, `anchor.y = height * position_y / 100`.
/// Percentages are fractional (the organizer UI steps in 0.5 increments) and
/// are validated to 0-100 by config loading, not clamped here.
///
/// # Examples
/// ```
/// # use certstamp::render::geometry::anchor_point;
/// // Centered on a 1600x1200 template
/// let a = anchor_point(1600, 1200, 50.0, 50.0);
/// assert_eq!((a.x, a.y), (800.0, 600.0));
///
/// // Half-step percentages resolve exactly
/// let a = anchor_point(1600, 1200, 12.5, 0.5);
/// assert_eq!((a.x, a.y), (200.0, 6.0));
/// ```
pub fn anchor_point(width: u32, height: u32, position_x: f64, position_y: f64) -> Anchor {
    Anchor {
        x: width as f64 * position_x / 100.0,
        y: height as f64 * position_y / 100.0,
    }
}
