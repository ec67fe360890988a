//! Download packaging for finished certificates.
//!
//! A committed [`RasterSurface`] can leave the program in two shapes: PNG
//! bytes, or a single-page PDF whose page is sized so that one raster pixel
//! equals one PDF point. Both exports read the same surface; nothing here
//! re-runs composition, so the PNG and the embedded PDF image are always
//! pixel-identical.

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use printpdf::{
    ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Mm, PdfDocument, Px,
};
use thiserror::Error;
use tracing::debug;

use crate::naming;
use crate::render::RasterSurface;

/// Millimetres per PDF point. Page sizes are chosen so 1 raster px = 1 pt.
const MM_PER_POINT: f64 = 25.4 / 72.0;

/// Resolution passed to the PDF image placement. At 72 dpi a pixel maps to
/// exactly one point, which makes the image fill the page edge to edge.
const PDF_IMAGE_DPI: f32 = 72.0;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),
    #[error("PDF serialization failed: {0}")]
    Pdf(String),
}

/// Page orientation recorded in the PDF, derived from the raster dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOrientation {
    Landscape,
    Portrait,
}

/// Wider-than-tall rasters produce landscape pages; everything else,
/// squares included, is portrait.
pub fn page_orientation(width: u32, height: u32) -> PageOrientation {
    if width > height {
        PageOrientation::Landscape
    } else {
        PageOrientation::Portrait
    }
}

/// A finished file ready to hand to the caller: payload bytes plus the
/// metadata a download needs.
#[derive(Debug, Clone)]
pub struct Download {
    pub file_name: String,
    pub media_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Encodes the surface as a PNG download.
///
/// The encode is lossless and deterministic: the same surface always yields
/// the same bytes, and decoding them recovers the surface exactly.
pub fn to_png(surface: &RasterSurface, subject: &str) -> Result<Download, ExportError> {
    let mut bytes = Vec::new();
    PngEncoder::new(Cursor::new(&mut bytes)).write_image(
        surface.as_raw(),
        surface.width(),
        surface.height(),
        ExtendedColorType::Rgba8,
    )?;
    debug!(
        width = surface.width(),
        height = surface.height(),
        size = bytes.len(),
        "encoded PNG download"
    );
    Ok(Download {
        file_name: naming::download_file_name(subject, "png"),
        media_type: "image/png",
        bytes,
    })
}

/// Wraps the surface in a single-page PDF download.
///
/// The page measures exactly `width x height` in points, so the certificate
/// fills it with no margins and no resampling. Orientation follows
/// [`page_orientation`] automatically since the page inherits the raster's
/// aspect ratio.
pub fn to_pdf(surface: &RasterSurface, subject: &str) -> Result<Download, ExportError> {
    let width = surface.width();
    let height = surface.height();
    let page_w = Mm((width as f64 * MM_PER_POINT) as f32);
    let page_h = Mm((height as f64 * MM_PER_POINT) as f32);

    let (doc, page, layer) = PdfDocument::new("Certificate", page_w, page_h, "Layer 1");
    let layer = doc.get_page(page).get_layer(layer);

    // PDF image streams carry no alpha channel, so flatten onto white first.
    let pdf_image = Image::from(ImageXObject {
        width: Px(width as usize),
        height: Px(height as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: false,
        image_data: flatten_over_white(surface),
        image_filter: None,
        clipping_bbox: None,
        smask: None,
    });
    pdf_image.add_to_layer(
        layer,
        ImageTransform {
            translate_x: Some(Mm(0.0)),
            translate_y: Some(Mm(0.0)),
            dpi: Some(PDF_IMAGE_DPI),
            ..Default::default()
        },
    );

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    debug!(
        width,
        height,
        orientation = ?page_orientation(width, height),
        size = bytes.len(),
        "assembled PDF download"
    );
    Ok(Download {
        file_name: naming::download_file_name(subject, "pdf"),
        media_type: "application/pdf",
        bytes,
    })
}

/// Drops the alpha channel by compositing over opaque white, yielding the
/// tightly packed RGB8 stream the PDF image object expects.
fn flatten_over_white(surface: &RasterSurface) -> Vec<u8> {
    let rgba = surface.as_rgba();
    let mut data = Vec::with_capacity((rgba.width() * rgba.height() * 3) as usize);
    for pixel in rgba.pixels() {
        let alpha = pixel[3] as u32;
        for channel in 0..3 {
            let value = (pixel[channel] as u32 * alpha + 255 * (255 - alpha)) / 255;
            data.push(value as u8);
        }
    }
    data
}
