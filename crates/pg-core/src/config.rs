use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::PixelError;

/// Configuration complète du pipeline pixel → enregistrements.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine.
///
/// # Example
/// ```
/// use pg_core::config::PipelineConfig;
/// let config = PipelineConfig::default();
/// assert_eq!(config.pixel_size, 10);
/// assert!(config.validate().is_ok());
/// ```
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct PipelineConfig {
    // === Resampling ===
    /// Facteur d'échelle appliqué avant la pixelisation (filtre lissé).
    pub scale_factor: f64,
    /// Côté d'un bloc de pixelisation, en pixels source.
    pub pixel_size: u32,
    /// Ré-agrandir la grille pixelisée aux dimensions d'avant pixelisation.
    pub restore_size: bool,

    // === Étapes optionnelles ===
    /// Floyd–Steinberg par canal après la pixelisation.
    pub dither: bool,
    /// Fusionner les blocs uniformes avant l'extraction.
    pub merge_blocks: bool,
    /// Côté d'un bloc pour la fusion.
    pub block_size: u32,

    // === Extraction ===
    /// Encodage des canaux dans les enregistrements.
    pub encoding: Encoding,
    /// Règle d'exclusion des pixels.
    pub filter_mode: FilterMode,

    // === Sortie ===
    /// Nom du champ couleur dans le JSON.
    pub color_key: ColorKey,
    /// JSON indenté.
    pub pretty: bool,
    /// Écrire aussi le PNG transformé.
    pub write_png: bool,
}

/// Output encoding for color channels.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Integers 0–255.
    Raw,
    /// Floats 0.00–1.00, two decimals.
    #[default]
    Normalized,
}

/// Pixel exclusion policy for the extractor.
///
/// # Example
/// ```
/// use pg_core::config::FilterMode;
/// assert!(FilterMode::Alpha.excludes([1, 1, 1, 0]));
/// assert!(!FilterMode::Alpha.excludes([1, 1, 1, 255]));
/// assert!(FilterMode::Sentinel.excludes([1, 1, 1, 255]));
/// ```
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Exclude pixels with alpha == 0.
    #[default]
    Alpha,
    /// Exclude pixels where R, G or B equals the sentinel value 1.
    Sentinel,
    /// Both rules at once.
    Both,
}

/// Valeur de canal réservée comme marqueur "transparent".
pub const SENTINEL: u8 = 1;

impl FilterMode {
    /// True when the pixel must be skipped under this policy.
    #[inline(always)]
    #[must_use]
    pub fn excludes(self, [r, g, b, a]: [u8; 4]) -> bool {
        let transparent = a == 0;
        let sentinel = r == SENTINEL || g == SENTINEL || b == SENTINEL;
        match self {
            Self::Alpha => transparent,
            Self::Sentinel => sentinel,
            Self::Both => transparent || sentinel,
        }
    }
}

/// JSON field name for the color array.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorKey {
    /// `{"x":..,"y":..,"color":[..]}`
    #[default]
    Color,
    /// `{"x":..,"y":..,"c":[..]}`
    C,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scale_factor: 0.3,
            pixel_size: 10,
            restore_size: false,
            dither: false,
            merge_blocks: false,
            block_size: 1,
            encoding: Encoding::Normalized,
            filter_mode: FilterMode::Alpha,
            color_key: ColorKey::Color,
            pretty: false,
            write_png: true,
        }
    }
}

impl PipelineConfig {
    /// Reject values the pipeline cannot run with.
    ///
    /// # Errors
    /// Returns the first offending field as a [`PixelError`].
    pub fn validate(&self) -> Result<(), PixelError> {
        if !self.scale_factor.is_finite() || self.scale_factor <= 0.0 {
            return Err(PixelError::InvalidScale(self.scale_factor));
        }
        if self.pixel_size == 0 {
            return Err(PixelError::InvalidPixelSize(self.pixel_size));
        }
        if self.merge_blocks && self.block_size == 0 {
            return Err(PixelError::InvalidBlockSize(self.block_size));
        }
        Ok(())
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    pipeline: Option<PipelineSection>,
    output: Option<OutputSection>,
}

/// Pipeline section of the TOML config, all fields optional for partial override.
#[derive(Deserialize)]
struct PipelineSection {
    scale_factor: Option<f64>,
    pixel_size: Option<u32>,
    restore_size: Option<bool>,
    dither: Option<bool>,
    merge_blocks: Option<bool>,
    block_size: Option<u32>,
    encoding: Option<Encoding>,
    filter_mode: Option<FilterMode>,
}

/// Output section of the TOML config, all fields optional.
#[derive(Deserialize)]
struct OutputSection {
    color_key: Option<ColorKey>,
    pretty: Option<bool>,
    write_png: Option<bool>,
}

/// Parse une config TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the TOML is malformed or a value fails validation.
///
/// # Example
/// ```
/// use pg_core::config::{parse_config, Encoding};
/// let config = parse_config("[pipeline]\npixel_size = 4\nencoding = \"raw\"\n").unwrap();
/// assert_eq!(config.pixel_size, 4);
/// assert_eq!(config.encoding, Encoding::Raw);
/// ```
pub fn parse_config(content: &str) -> Result<PipelineConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;

    let mut config = PipelineConfig::default();

    if let Some(p) = file.pipeline {
        if let Some(v) = p.scale_factor {
            config.scale_factor = v;
        }
        if let Some(v) = p.pixel_size {
            config.pixel_size = v;
        }
        if let Some(v) = p.restore_size {
            config.restore_size = v;
        }
        if let Some(v) = p.dither {
            config.dither = v;
        }
        if let Some(v) = p.merge_blocks {
            config.merge_blocks = v;
        }
        if let Some(v) = p.block_size {
            config.block_size = v;
        }
        if let Some(v) = p.encoding {
            config.encoding = v;
        }
        if let Some(v) = p.filter_mode {
            config.filter_mode = v;
        }
    }

    if let Some(o) = file.output {
        if let Some(v) = o.color_key {
            config.color_key = v;
        }
        if let Some(v) = o.pretty {
            config.pretty = v;
        }
        if let Some(v) = o.write_png {
            config.write_png = v;
        }
    }

    config.validate()?;
    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read, parsed or validated.
///
/// # Example
/// ```no_run
/// use pg_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Config invalide dans {}", path.display()))
}
