use std::path::Path;

use anyhow::{Context, Result};
use pg_core::frame::PixelBuffer;

/// Extensions image reconnues par le mode batch.
pub const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg"];

/// Charge une image depuis le disque en RGBA8.
///
/// Les formats sans alpha reçoivent un alpha opaque (255).
///
/// # Errors
/// Returns an error if the image cannot be opened or decoded.
///
/// # Example
/// ```no_run
/// use pg_source::image::load_image;
/// use std::path::Path;
/// let frame = load_image(Path::new("1.png")).unwrap();
/// ```
pub fn load_image(path: &Path) -> Result<PixelBuffer> {
    let img =
        image::open(path).with_context(|| format!("Impossible de charger {}", path.display()))?;
    let frame = into_frame(&img);
    log::debug!(
        "{} décodé : {}×{}",
        path.display(),
        frame.width,
        frame.height
    );
    Ok(frame)
}

/// Decode an in-memory PNG/JPEG/BMP/GIF.
///
/// # Errors
/// Returns an error if the format is not recognized or the data is corrupt.
pub fn decode_image(bytes: &[u8]) -> Result<PixelBuffer> {
    let img = image::load_from_memory(bytes).context("Décodage impossible")?;
    Ok(into_frame(&img))
}

fn into_frame(img: &image::DynamicImage) -> PixelBuffer {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    PixelBuffer {
        data: rgba.into_raw(),
        width,
        height,
    }
}

/// True if the path carries one of [`IMAGE_EXTS`] (case-insensitive).
#[must_use]
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| IMAGE_EXTS.contains(&ext.to_lowercase().as_str()))
}
