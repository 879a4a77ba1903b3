use crate::error::PixelError;

/// Un pixel RGBA, 8 bits par canal.
pub type Rgba = [u8; 4];

/// Buffer de pixels RGBA, row-major, 4 bytes par pixel.
///
/// Chaque étape du pipeline possède son buffer : elle le mute en place ou
/// en produit un nouveau.
///
/// # Example
/// ```
/// use pg_core::frame::PixelBuffer;
/// let fb = PixelBuffer::new(10, 10);
/// assert_eq!(fb.data.len(), 400);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Pixels RGBA, row-major, 4 bytes par pixel.
    pub data: Vec<u8>,
    /// Largeur en pixels.
    pub width: u32,
    /// Hauteur en pixels.
    pub height: u32,
}

impl PixelBuffer {
    /// Crée un buffer transparent (tous les octets à zéro).
    ///
    /// # Example
    /// ```
    /// use pg_core::frame::PixelBuffer;
    /// let fb = PixelBuffer::new(100, 50);
    /// assert_eq!(fb.width, 100);
    /// assert_eq!(fb.height, 50);
    /// assert_eq!(fb.data.len(), 100 * 50 * 4);
    /// ```
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize * 4],
            width,
            height,
        }
    }

    /// Buffer rempli d'une seule couleur.
    ///
    /// # Example
    /// ```
    /// use pg_core::frame::PixelBuffer;
    /// let fb = PixelBuffer::filled(4, 4, [255, 0, 0, 255]);
    /// assert_eq!(fb.pixel(3, 3), [255, 0, 0, 255]);
    /// ```
    #[must_use]
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * 4);
        for _ in 0..count {
            data.extend_from_slice(&color);
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Enveloppe des octets RGBA bruts en vérifiant `width * height * 4`.
    ///
    /// # Errors
    /// [`PixelError::BufferSizeMismatch`] si `data.len() != width * height * 4`.
    ///
    /// # Example
    /// ```
    /// use pg_core::frame::PixelBuffer;
    /// assert!(PixelBuffer::from_raw(2, 1, vec![0; 8]).is_ok());
    /// assert!(PixelBuffer::from_raw(2, 1, vec![0; 7]).is_err());
    /// ```
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, PixelError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(PixelError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Nombre de pixels.
    #[inline]
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Accès au pixel (x, y).
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    /// Écrit le pixel (x, y).
    #[inline(always)]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        self.data[idx..idx + 4].copy_from_slice(&color);
    }

    /// Une ligne d'octets RGBA bruts.
    #[inline]
    #[must_use]
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * 4;
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// Panique si la longueur des octets ne correspond plus aux dimensions.
    ///
    /// Un écart ici signale une étape précédente défaillante, pas une
    /// entrée invalide.
    #[inline]
    pub fn assert_consistent(&self) {
        assert_eq!(
            self.data.len(),
            self.pixel_count() * 4,
            "PixelBuffer {}×{} holds {} bytes",
            self.width,
            self.height,
            self.data.len()
        );
    }
}
