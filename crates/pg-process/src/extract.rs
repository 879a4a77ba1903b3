use pg_core::config::{Encoding, FilterMode, PipelineConfig};
use pg_core::frame::{PixelBuffer, Rgba};
use pg_core::record::{ColorRecord, ColorValue, MergedBlock};
use rayon::prelude::*;

/// Réglages de l'extracteur : règle d'exclusion + encodage.
///
/// # Example
/// ```
/// use pg_process::extract::ExtractOptions;
/// use pg_core::config::{Encoding, FilterMode};
/// let opts = ExtractOptions::default();
/// assert_eq!(opts.encoding, Encoding::Normalized);
/// assert_eq!(opts.filter, FilterMode::Alpha);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Channel encoding of the emitted records.
    pub encoding: Encoding,
    /// Which pixels are skipped.
    pub filter: FilterMode,
}

impl ExtractOptions {
    /// Options taken from a pipeline config.
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            encoding: config.encoding,
            filter: config.filter_mode,
        }
    }

    /// Record for one cell, or `None` if the filter rejects it.
    #[inline]
    #[must_use]
    pub fn encode(self, x: u32, y: u32, rgba: Rgba) -> Option<ColorRecord> {
        if self.filter.excludes(rgba) {
            return None;
        }
        let color = match self.encoding {
            Encoding::Raw => ColorValue::Raw(rgba),
            Encoding::Normalized => ColorValue::normalized(rgba),
        };
        Some(ColorRecord { x, y, color })
    }
}

/// Un enregistrement par pixel retenu, en balayage row-major.
///
/// Coordinates are pixel coordinates.
///
/// # Example
/// ```
/// use pg_core::config::{Encoding, FilterMode};
/// use pg_core::frame::PixelBuffer;
/// use pg_core::record::ColorValue;
/// use pg_process::extract::{extract, ExtractOptions};
///
/// let mut fb = PixelBuffer::filled(2, 1, [255, 0, 0, 255]);
/// fb.set_pixel(1, 0, [0, 0, 0, 0]);
/// let opts = ExtractOptions { encoding: Encoding::Raw, filter: FilterMode::Alpha };
/// let records = extract(&fb, opts);
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].color, ColorValue::Raw([255, 0, 0, 255]));
/// ```
#[must_use]
pub fn extract(buffer: &PixelBuffer, opts: ExtractOptions) -> Vec<ColorRecord> {
    buffer.assert_consistent();
    if buffer.pixel_count() == 0 {
        return Vec::new();
    }
    let stride = buffer.width as usize * 4;

    let records: Vec<ColorRecord> = buffer
        .data
        .par_chunks_exact(stride)
        .enumerate()
        .flat_map_iter(|(y, row)| {
            row.chunks_exact(4).enumerate().filter_map(move |(x, px)| {
                opts.encode(x as u32, y as u32, [px[0], px[1], px[2], px[3]])
            })
        })
        .collect();

    log::debug!(
        "extract: {}/{} pixels retenus ({:?}, {:?})",
        records.len(),
        buffer.pixel_count(),
        opts.filter,
        opts.encoding
    );
    records
}

/// Même filtrage/encodage que [`extract`], sur des blocs fusionnés.
///
/// Coordinates stay in block-grid units.
#[must_use]
pub fn extract_blocks(blocks: &[MergedBlock], opts: ExtractOptions) -> Vec<ColorRecord> {
    blocks
        .iter()
        .filter_map(|b| opts.encode(b.x, b.y, b.color))
        .collect()
}
