//! SVG → PNG rasterization.
//!
//! The pixmap is sized to the SVG's intrinsic width and height, fractional
//! edges rounded up so nothing is clipped, and filled white before drawing,
//! so transparent diagram backgrounds come out the way they look in a browser.

use std::sync::{Arc, LazyLock};

use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use resvg::tiny_skia;
use resvg::usvg::{self, fontdb};
use tracing::debug;

use crate::export::ExportError;

/// Largest edge, in pixels, we are willing to allocate a pixmap for.
pub const MAX_RASTER_EDGE: u16 = 16_384;

/// System fonts, loaded once and shared across exports.
static FONTDB: LazyLock<Arc<fontdb::Database>> = LazyLock::new(|| {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    debug!(faces = db.len(), "loaded system fonts for rasterization");
    Arc::new(db)
});

/// Rasterize SVG text to PNG bytes at its intrinsic size.
///
/// # Errors
///
/// - [`ExportError::Decode`] when the SVG does not parse.
/// - [`ExportError::Rasterize`] when the intrinsic size is empty or too large.
/// - [`ExportError::Encode`] when PNG encoding fails.
pub fn svg_to_png(svg: &str) -> Result<Vec<u8>, ExportError> {
    let opts = usvg::Options { fontdb: FONTDB.clone(), ..Default::default() };
    let tree = usvg::Tree::from_str(svg, &opts).map_err(|e| ExportError::Decode(e.to_string()))?;

    let size = tree.size();
    let (width, height) = (pixel_edge(size.width())?, pixel_edge(size.height())?);

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ExportError::Rasterize(format!("cannot allocate {width}x{height} canvas")))?;
    pixmap.fill(tiny_skia::Color::WHITE);
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(pixmap.data(), width, height, image::ExtendedColorType::Rgba8)
        .map_err(|e| ExportError::Encode(e.to_string()))?;

    debug!(width, height, bytes = png.len(), "rasterized svg");
    Ok(png)
}

/// Whole pixels needed to cover an edge of `len` user units.
fn pixel_edge(len: f32) -> Result<u32, ExportError> {
    let edge = len.ceil();
    if edge.is_nan() || edge < 1.0 {
        return Err(ExportError::Rasterize(format!("image has no area: edge {len}")));
    }
    if edge > f32::from(MAX_RASTER_EDGE) {
        return Err(ExportError::Rasterize(format!("image too large: edge {edge}")));
    }
    // Whole number in 1..=MAX_RASTER_EDGE here.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let pixels = edge as u32;
    Ok(pixels)
}

#[cfg(test)]
#[path = "raster_test.rs"]
mod tests;
