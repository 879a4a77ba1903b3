use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use image::{ImageBuffer, ImageFormat, Rgba};
use pg_core::frame::PixelBuffer;

type RgbaView<'a> = ImageBuffer<Rgba<u8>, &'a [u8]>;

fn view(frame: &PixelBuffer) -> Result<RgbaView<'_>> {
    ImageBuffer::from_raw(frame.width, frame.height, frame.data.as_slice()).with_context(|| {
        format!(
            "Buffer {}×{} incohérent ({} octets)",
            frame.width,
            frame.height,
            frame.data.len()
        )
    })
}

/// Encode le buffer en PNG, en mémoire.
///
/// # Errors
/// Returns an error if the buffer is inconsistent or the encoder fails.
///
/// # Example
/// ```
/// use pg_core::frame::PixelBuffer;
/// use pg_export::png::encode_png;
/// let bytes = encode_png(&PixelBuffer::filled(2, 2, [255, 0, 0, 255])).unwrap();
/// assert_eq!(&bytes[1..4], b"PNG");
/// ```
pub fn encode_png(frame: &PixelBuffer) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    view(frame)?
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .context("Encodage PNG impossible")?;
    Ok(bytes)
}

/// Sauvegarde le buffer en PNG.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn save_png(path: &Path, frame: &PixelBuffer) -> Result<()> {
    view(frame)?
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("Impossible d'écrire {}", path.display()))?;
    log::info!(
        "Image {}×{} → {}",
        frame.width,
        frame.height,
        path.display()
    );
    Ok(())
}
