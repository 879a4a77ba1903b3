use pg_core::error::PixelError;
use pg_core::frame::{PixelBuffer, Rgba};
use pg_core::record::MergedBlock;
use rayon::prelude::*;

/// Rouge nul = bloc "éteint", jamais émis.
const BACKGROUND_RED: u8 = 0;

/// Parcourt le buffer par blocs `block_size`×`block_size` et réduit chaque
/// bloc uniforme à un seul échantillon.
///
/// Les blocs du bord droit/bas sont rognés. Un bloc est émis si tous ses
/// pixels ont exactement le RGBA du pixel haut-gauche et que ce rouge
/// n'est pas 0. Ordre de sortie : grille de blocs, row-major.
///
/// # Errors
/// [`PixelError::InvalidBlockSize`] when `block_size == 0`.
///
/// # Example
/// ```
/// use pg_core::frame::PixelBuffer;
/// use pg_process::merge::merge_blocks;
/// let fb = PixelBuffer::filled(4, 4, [200, 10, 10, 255]);
/// let blocks = merge_blocks(&fb, 2).unwrap();
/// assert_eq!(blocks.len(), 4);
/// assert_eq!((blocks[3].x, blocks[3].y), (1, 1));
/// ```
pub fn merge_blocks(
    buffer: &PixelBuffer,
    block_size: u32,
) -> Result<Vec<MergedBlock>, PixelError> {
    if block_size == 0 {
        return Err(PixelError::InvalidBlockSize(block_size));
    }
    buffer.assert_consistent();

    let cols = buffer.width.div_ceil(block_size);
    let rows = buffer.height.div_ceil(block_size);

    let blocks: Vec<MergedBlock> = (0..rows)
        .into_par_iter()
        .flat_map_iter(|by| {
            (0..cols).filter_map(move |bx| {
                let color = uniform_color(buffer, bx * block_size, by * block_size, block_size)?;
                (color[0] != BACKGROUND_RED).then_some(MergedBlock { x: bx, y: by, color })
            })
        })
        .collect();

    log::debug!(
        "merge: {}/{} blocs uniformes émis ({cols}×{rows}, taille {block_size})",
        blocks.len(),
        u64::from(cols) * u64::from(rows)
    );
    Ok(blocks)
}

/// RGBA commun du bloc dont le coin haut-gauche est `(x0, y0)`, ou `None`.
fn uniform_color(buffer: &PixelBuffer, x0: u32, y0: u32, block_size: u32) -> Option<Rgba> {
    let candidate = buffer.pixel(x0, y0);
    let x1 = (x0 + block_size).min(buffer.width);
    let y1 = (y0 + block_size).min(buffer.height);
    let span = (x0 as usize * 4)..(x1 as usize * 4);

    (y0..y1)
        .all(|y| {
            buffer.row(y)[span.clone()]
                .chunks_exact(4)
                .all(|px| px == candidate)
        })
        .then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TILE_COLORS: [Rgba; 6] = [
        [255, 0, 0, 255],
        [10, 200, 30, 255],
        [77, 77, 77, 128],
        [1, 2, 3, 4],
        [250, 250, 250, 255],
        [9, 0, 0, 0],
    ];

    fn tiled(cols: u32, rows: u32, size: u32) -> PixelBuffer {
        let mut fb = PixelBuffer::new(cols * size, rows * size);
        for y in 0..fb.height {
            for x in 0..fb.width {
                let tile = ((y / size) * cols + x / size) as usize;
                fb.set_pixel(x, y, TILE_COLORS[tile]);
            }
        }
        fb
    }

    #[test]
    fn one_record_per_solid_tile() {
        let fb = tiled(3, 2, 4);
        let blocks = merge_blocks(&fb, 4).unwrap();
        assert_eq!(blocks.len(), 6);
        for (i, block) in blocks.iter().enumerate() {
            assert_eq!((block.x, block.y), (i as u32 % 3, i as u32 / 3));
            assert_eq!(block.color, TILE_COLORS[i]);
        }
    }

    #[test]
    fn zero_red_block_never_emitted() {
        let mut fb = tiled(3, 2, 2);
        // Tile (1, 0) becomes uniform with red = 0.
        for y in 0..2 {
            for x in 2..4 {
                fb.set_pixel(x, y, [0, 255, 255, 255]);
            }
        }
        let blocks = merge_blocks(&fb, 2).unwrap();
        assert_eq!(blocks.len(), 5);
        assert!(blocks.iter().all(|b| b.color[0] != 0));
        assert!(!blocks.iter().any(|b| (b.x, b.y) == (1, 0)));
    }

    #[test]
    fn single_odd_pixel_breaks_uniformity() {
        let mut fb = PixelBuffer::filled(4, 4, [100, 100, 100, 255]);
        fb.set_pixel(3, 3, [100, 100, 100, 254]);
        let blocks = merge_blocks(&fb, 2).unwrap();
        let coords: Vec<_> = blocks.iter().map(|b| (b.x, b.y)).collect();
        assert_eq!(coords, vec![(0, 0), (1, 0), (0, 1)]);
    }

    #[test]
    fn edge_blocks_are_clipped() {
        // 5×3 with block 2 → 3×2 grid; right column and bottom row are partial.
        let mut fb = PixelBuffer::filled(5, 3, [50, 60, 70, 255]);
        fb.set_pixel(0, 0, [51, 60, 70, 255]);
        let blocks = merge_blocks(&fb, 2).unwrap();
        let coords: Vec<_> = blocks.iter().map(|b| (b.x, b.y)).collect();
        assert_eq!(coords, vec![(1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
    }

    #[test]
    fn block_size_one_is_per_pixel() {
        let mut fb = PixelBuffer::filled(2, 2, [5, 5, 5, 255]);
        fb.set_pixel(1, 0, [0, 9, 9, 255]);
        let blocks = merge_blocks(&fb, 1).unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!((blocks[1].x, blocks[1].y), (0, 1));
    }

    #[test]
    fn zero_block_size_rejected() {
        let fb = PixelBuffer::new(2, 2);
        assert_eq!(merge_blocks(&fb, 0), Err(PixelError::InvalidBlockSize(0)));
    }
}
