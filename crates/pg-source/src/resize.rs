use anyhow::{Context, Result};
use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer as FirResizer};
use pg_core::error::PixelError;
use pg_core::frame::PixelBuffer;

/// Politique de filtrage du resampler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filter {
    /// Lanczos3 convolution, alpha premultiplied. Used for the arbitrary scale step.
    Smooth,
    /// Nearest neighbour. Produces the square blocks.
    Nearest,
}

impl Filter {
    fn options(self) -> ResizeOptions {
        match self {
            Self::Smooth => {
                ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3))
            }
            // Copie exacte des octets, même pour alpha == 0.
            Self::Nearest => ResizeOptions::new()
                .resize_alg(ResizeAlg::Nearest)
                .use_alpha(false),
        }
    }
}

/// Resizer réutilisable wrappant fast_image_resize.
///
/// # Example
/// ```
/// use pg_source::resize::Resizer;
/// let r = Resizer::new();
/// ```
pub struct Resizer {
    inner: FirResizer,
    /// Scratch image for source (owned buffer to avoid the mut borrow issue).
    src_buf: Vec<u8>,
}

impl Resizer {
    /// Create a new resizer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: FirResizer::new(),
            src_buf: Vec::new(),
        }
    }

    /// Resize `src` to `width`×`height` with the given filter.
    ///
    /// # Errors
    /// Returns [`PixelError::InvalidDimensions`] for a zero target, before
    /// allocating anything, or an error if the resize itself fails.
    ///
    /// # Example
    /// ```
    /// use pg_source::resize::{Filter, Resizer};
    /// use pg_core::frame::PixelBuffer;
    /// let mut r = Resizer::new();
    /// let src = PixelBuffer::new(100, 100);
    /// let dst = r.resize(&src, 50, 25, Filter::Smooth).unwrap();
    /// assert_eq!((dst.width, dst.height), (50, 25));
    /// assert!(r.resize(&src, 0, 25, Filter::Nearest).is_err());
    /// ```
    pub fn resize(
        &mut self,
        src: &PixelBuffer,
        width: u32,
        height: u32,
        filter: Filter,
    ) -> Result<PixelBuffer> {
        if width == 0 || height == 0 {
            return Err(PixelError::InvalidDimensions { width, height }.into());
        }
        src.assert_consistent();

        if src.width == width && src.height == height {
            return Ok(src.clone());
        }
        if src.width == 0 || src.height == 0 {
            return Err(PixelError::InvalidDimensions {
                width: src.width,
                height: src.height,
            }
            .into());
        }

        let mut dst = PixelBuffer::new(width, height);

        // R1: forced copy by fast_image_resize API (requires &mut on source)
        self.src_buf.clear();
        self.src_buf.extend_from_slice(&src.data);

        {
            let src_image =
                Image::from_slice_u8(src.width, src.height, &mut self.src_buf, PixelType::U8x4)
                    .context("Invalid source dimensions")?;

            let mut dst_image =
                Image::from_slice_u8(width, height, &mut dst.data, PixelType::U8x4)
                    .context("Invalid destination dimensions")?;

            self.inner
                .resize(&src_image, &mut dst_image, Some(&filter.options()))
                .context("Resize failed")?;
        }

        Ok(dst)
    }

    /// Multiply both dimensions by `factor` (truncated) with the smooth filter.
    ///
    /// # Errors
    /// [`PixelError::InvalidScale`] for a non-positive or non-finite factor,
    /// [`PixelError::InvalidDimensions`] if a dimension truncates to zero.
    ///
    /// # Example
    /// ```
    /// use pg_source::resize::Resizer;
    /// use pg_core::frame::PixelBuffer;
    /// let mut r = Resizer::new();
    /// let out = r.scale(&PixelBuffer::new(100, 40), 0.3).unwrap();
    /// assert_eq!((out.width, out.height), (30, 12));
    /// ```
    pub fn scale(&mut self, src: &PixelBuffer, factor: f64) -> Result<PixelBuffer> {
        let (width, height) = scaled_dimensions(src.width, src.height, factor)?;
        log::debug!(
            "scale {}×{} ×{factor} → {width}×{height}",
            src.width,
            src.height
        );
        self.resize(src, width, height, Filter::Smooth)
    }

    /// Quantifie en blocs : réduit à la grille `floor(w/p)`×`floor(h/p)` au
    /// plus proche voisin, puis ré-agrandit à la taille d'origine si
    /// `restore_size` est vrai.
    ///
    /// A `pixel_size` larger than the image collapses to a 1×1 grid.
    ///
    /// # Errors
    /// [`PixelError::InvalidPixelSize`] when `pixel_size == 0`.
    ///
    /// # Example
    /// ```
    /// use pg_source::resize::Resizer;
    /// use pg_core::frame::PixelBuffer;
    /// let mut r = Resizer::new();
    /// let src = PixelBuffer::new(40, 30);
    /// let grid = r.pixelate(&src, 10, false).unwrap();
    /// assert_eq!((grid.width, grid.height), (4, 3));
    /// let blocky = r.pixelate(&src, 10, true).unwrap();
    /// assert_eq!((blocky.width, blocky.height), (40, 30));
    /// ```
    pub fn pixelate(
        &mut self,
        src: &PixelBuffer,
        pixel_size: u32,
        restore_size: bool,
    ) -> Result<PixelBuffer> {
        let (grid_w, grid_h) = pixel_grid(src.width, src.height, pixel_size)?;
        if pixel_size > src.width.min(src.height) {
            log::warn!(
                "pixel_size {pixel_size} dépasse {}×{} : grille 1×1",
                src.width,
                src.height
            );
        }
        log::debug!(
            "pixelate {}×{} / {pixel_size} → {grid_w}×{grid_h}",
            src.width,
            src.height
        );

        let grid = self.resize(src, grid_w, grid_h, Filter::Nearest)?;
        if restore_size {
            self.resize(&grid, src.width, src.height, Filter::Nearest)
        } else {
            Ok(grid)
        }
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}

/// `(floor(w * factor), floor(h * factor))`, rejecting degenerate results.
///
/// # Errors
/// See [`Resizer::scale`].
pub fn scaled_dimensions(width: u32, height: u32, factor: f64) -> Result<(u32, u32), PixelError> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(PixelError::InvalidScale(factor));
    }
    let w = (f64::from(width) * factor).floor();
    let h = (f64::from(height) * factor).floor();
    if w < 1.0 || h < 1.0 || w > f64::from(u32::MAX) || h > f64::from(u32::MAX) {
        return Err(PixelError::InvalidDimensions {
            width: w.min(f64::from(u32::MAX)) as u32,
            height: h.min(f64::from(u32::MAX)) as u32,
        });
    }
    Ok((w as u32, h as u32))
}

/// `(floor(w/p), floor(h/p))`, ou 1×1 dès que `p` dépasse le plus petit côté.
///
/// # Errors
/// [`PixelError::InvalidPixelSize`] when `pixel_size == 0`.
///
/// # Example
/// ```
/// use pg_source::resize::pixel_grid;
/// assert_eq!(pixel_grid(25, 10, 10).unwrap(), (2, 1));
/// assert_eq!(pixel_grid(5, 5, 10).unwrap(), (1, 1));
/// assert_eq!(pixel_grid(100, 5, 10).unwrap(), (1, 1));
/// ```
pub fn pixel_grid(width: u32, height: u32, pixel_size: u32) -> Result<(u32, u32), PixelError> {
    if pixel_size == 0 {
        return Err(PixelError::InvalidPixelSize(pixel_size));
    }
    if pixel_size > width.min(height) {
        return Ok((1, 1));
    }
    Ok((width / pixel_size, height / pixel_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Damier de tuiles `tile`×`tile` aux couleurs distinctes.
    fn tiles(cols: u32, rows: u32, tile: u32) -> PixelBuffer {
        let mut fb = PixelBuffer::new(cols * tile, rows * tile);
        for y in 0..fb.height {
            for x in 0..fb.width {
                let (tx, ty) = (x / tile, y / tile);
                fb.set_pixel(x, y, [(tx * 40 + 10) as u8, (ty * 40 + 10) as u8, 99, 255]);
            }
        }
        fb
    }

    #[test]
    fn zero_target_rejected() {
        let mut r = Resizer::new();
        let src = PixelBuffer::new(4, 4);
        let err = r.resize(&src, 4, 0, Filter::Smooth).unwrap_err();
        assert_eq!(
            err.downcast_ref::<PixelError>(),
            Some(&PixelError::InvalidDimensions {
                width: 4,
                height: 0
            })
        );
    }

    #[test]
    fn scale_rejects_degenerate_factors() {
        let mut r = Resizer::new();
        let src = PixelBuffer::new(3, 3);
        assert!(r.scale(&src, 0.1).is_err());
        assert!(r.scale(&src, 0.0).is_err());
        assert!(r.scale(&src, f64::NAN).is_err());
    }

    #[test]
    fn uniform_image_survives_pixelation() {
        let mut r = Resizer::new();
        let src = PixelBuffer::filled(4, 4, [255, 0, 0, 255]);
        let out = r.pixelate(&src, 2, true).unwrap();
        assert_eq!(out, src);
        let grid = r.pixelate(&src, 2, false).unwrap();
        assert_eq!(grid, PixelBuffer::filled(2, 2, [255, 0, 0, 255]));
    }

    #[test]
    fn nearest_downscale_keeps_tile_colors() {
        let mut r = Resizer::new();
        let src = tiles(4, 3, 5);
        let grid = r.pixelate(&src, 5, false).unwrap();
        assert_eq!((grid.width, grid.height), (4, 3));
        for ty in 0..3 {
            for tx in 0..4 {
                assert_eq!(grid.pixel(tx, ty), src.pixel(tx * 5, ty * 5));
            }
        }
    }

    #[test]
    fn pixelation_is_idempotent() {
        let mut r = Resizer::new();
        let src = tiles(3, 3, 4);
        let once = r.pixelate(&src, 4, true).unwrap();
        let twice = r.pixelate(&once, 4, true).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn oversized_pixel_collapses_to_single_color() {
        let mut r = Resizer::new();
        let src = tiles(2, 2, 3);
        let grid = r.pixelate(&src, 50, false).unwrap();
        assert_eq!((grid.width, grid.height), (1, 1));
        let restored = r.pixelate(&src, 50, true).unwrap();
        let first = restored.pixel(0, 0);
        assert!(restored.data.chunks_exact(4).all(|p| p == first));
    }

    #[test]
    fn zero_pixel_size_rejected() {
        let mut r = Resizer::new();
        assert!(r.pixelate(&PixelBuffer::new(4, 4), 0, false).is_err());
    }

    #[test]
    fn source_untouched() {
        let mut r = Resizer::new();
        let src = tiles(2, 2, 4);
        let copy = src.clone();
        let _ = r.scale(&src, 0.5).unwrap();
        assert_eq!(src, copy);
    }

    #[test]
    fn narrow_image_collapses_to_single_cell() {
        let mut r = Resizer::new();
        let mut src = PixelBuffer::filled(100, 5, [10, 20, 30, 255]);
        src.set_pixel(60, 2, [200, 200, 200, 255]);
        let grid = r.pixelate(&src, 10, false).unwrap();
        assert_eq!((grid.width, grid.height), (1, 1));
        let restored = r.pixelate(&src, 10, true).unwrap();
        assert_eq!((restored.width, restored.height), (100, 5));
        let first = restored.pixel(0, 0);
        assert!(restored.data.chunks_exact(4).all(|px| px == first.as_slice()));
    }

    #[test]
    fn grid_is_plain_floor_when_pixel_fits() {
        assert_eq!(pixel_grid(100, 10, 10).unwrap(), (10, 1));
        assert_eq!(pixel_grid(100, 5, 5).unwrap(), (20, 1));
        assert_eq!(pixel_grid(100, 5, 6).unwrap(), (1, 1));
    }
}
