//! Shared test utilities for the certstamp test suite.
//!
//! Provides deterministic synthetic template images, a scriptable
//! [`TemplateFetcher`] that answers from memory instead of the network, and a
//! ready-made [`RasterSurface`] for export tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let fetcher = ScriptedFetcher::new()
//!     .with_bytes("cert.png", png_template_bytes(320, 200))
//!     .with_failure("broken.png", "connection refused");
//!
//! let template = load_template(&fetcher, "cert.png").await.unwrap();
//! assert_eq!(fetcher.calls(), vec!["cert.png"]);
//! ```

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};

use crate::config::FontWeight;
use crate::render::{
    Anchor, DecodedTemplate, RasterSurface, TemplateError, TemplateFetcher, Typeface, compose,
};

// =========================================================================
// Synthetic template images
// =========================================================================

/// A fully opaque RGBA gradient encoded as PNG. Byte-for-byte deterministic
/// for a given size.
pub fn png_template_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 180, 255])
    });
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
        .unwrap();
    bytes
}

/// An RGB gradient encoded as JPEG, for exercising non-PNG template decode.
pub fn jpeg_template_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, 64, (y % 256) as u8])
    });
    let mut bytes = Vec::new();
    JpegEncoder::new(&mut bytes)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    bytes
}

/// A composed certificate surface at the given size, built from a synthetic
/// template and the embedded fallback face.
pub fn test_surface(width: u32, height: u32) -> RasterSurface {
    let template = DecodedTemplate::from_bytes(&png_template_bytes(width, height)).unwrap();
    let typeface = Typeface::fallback(FontWeight::Bold);
    let anchor = Anchor {
        x: width as f64 / 2.0,
        y: height as f64 / 2.0,
    };
    compose(&template, &typeface, 24.0, anchor, "Asha Rao")
}

// =========================================================================
// Scriptable fetcher
// =========================================================================

enum Scripted {
    Bytes { bytes: Vec<u8>, delay: Duration },
    Failure { reason: String, delay: Duration },
}

/// A [`TemplateFetcher`] that serves pre-scripted responses keyed by locator
/// and records every fetch it sees.
///
/// Delayed variants sleep on the tokio clock before answering, which lets
/// `start_paused` tests pin down exact completion orderings.
pub struct ScriptedFetcher {
    outcomes: HashMap<String, Scripted>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self {
            outcomes: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_bytes(self, locator: &str, bytes: Vec<u8>) -> Self {
        self.with_delayed_bytes(locator, bytes, Duration::ZERO)
    }

    pub fn with_delayed_bytes(mut self, locator: &str, bytes: Vec<u8>, delay: Duration) -> Self {
        self.outcomes
            .insert(locator.to_string(), Scripted::Bytes { bytes, delay });
        self
    }

    pub fn with_failure(self, locator: &str, reason: &str) -> Self {
        self.with_delayed_failure(locator, reason, Duration::ZERO)
    }

    pub fn with_delayed_failure(mut self, locator: &str, reason: &str, delay: Duration) -> Self {
        self.outcomes.insert(
            locator.to_string(),
            Scripted::Failure {
                reason: reason.to_string(),
                delay,
            },
        );
        self
    }

    /// Every locator fetched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl TemplateFetcher for ScriptedFetcher {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>, TemplateError> {
        self.calls.lock().unwrap().push(locator.to_string());
        match self.outcomes.get(locator) {
            Some(Scripted::Bytes { bytes, delay }) => {
                pause_for(*delay).await;
                Ok(bytes.clone())
            }
            Some(Scripted::Failure { reason, delay }) => {
                pause_for(*delay).await;
                Err(TemplateError::Fetch(reason.clone()))
            }
            None => Err(TemplateError::Fetch(format!(
                "unscripted locator: {locator}"
            ))),
        }
    }
}

async fn pause_for(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
