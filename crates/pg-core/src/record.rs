use serde::Serialize;

use crate::frame::Rgba;

/// Valeur couleur d'un enregistrement, selon l'encodage choisi.
///
/// Sérialisé comme un simple tableau de 4 nombres.
///
/// # Example
/// ```
/// use pg_core::record::ColorValue;
/// let v = ColorValue::normalized([255, 0, 128, 255]);
/// assert_eq!(v, ColorValue::Normalized([1.0, 0.0, 0.5, 1.0]));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColorValue {
    /// Entiers 0–255.
    Raw(Rgba),
    /// Flottants 0.0–1.0, arrondis à 2 décimales.
    Normalized([f64; 4]),
}

impl ColorValue {
    /// Encode chaque canal en `round(v / 255, 2)`.
    #[must_use]
    pub fn normalized(rgba: Rgba) -> Self {
        Self::Normalized(rgba.map(normalize_channel))
    }
}

/// `round(v / 255, 2)`.
///
/// # Example
/// ```
/// use pg_core::record::normalize_channel;
/// assert_eq!(normalize_channel(0), 0.0);
/// assert_eq!(normalize_channel(255), 1.0);
/// assert_eq!(normalize_channel(100), 0.39);
/// ```
#[inline]
#[must_use]
pub fn normalize_channel(v: u8) -> f64 {
    (f64::from(v) / 255.0 * 100.0).round() / 100.0
}

/// Un pixel (ou bloc fusionné) prêt pour la sérialisation.
///
/// `x`/`y` sont des coordonnées pixel, ou des indices de grille de blocs
/// quand l'enregistrement provient du BlockMerger.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ColorRecord {
    /// Colonne.
    pub x: u32,
    /// Ligne.
    pub y: u32,
    /// Couleur encodée.
    pub color: ColorValue,
}

/// Bloc uniforme réduit à un échantillon, en coordonnées de grille de blocs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergedBlock {
    /// Colonne de bloc (`pixel_x / block_size`).
    pub x: u32,
    /// Ligne de bloc (`pixel_y / block_size`).
    pub y: u32,
    /// Valeur RGBA commune à tous les pixels du bloc.
    pub color: Rgba,
}
