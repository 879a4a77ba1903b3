use thiserror::Error;

/// Errors originating from the core pixel pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PixelError {
    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// Resize target with a zero width or height.
    #[error("Dimensions invalides : {width}×{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Raw pixel data does not hold exactly `width * height` RGBA pixels.
    #[error("Taille de buffer incohérente : {expected} octets attendus, {actual} reçus")]
    BufferSizeMismatch {
        /// Expected byte length (`width * height * 4`).
        expected: usize,
        /// Actual byte length.
        actual: usize,
    },

    /// Pixelation block size of zero.
    #[error("Taille de pixel invalide : {0}")]
    InvalidPixelSize(u32),

    /// Block merge size of zero.
    #[error("Taille de bloc invalide : {0}")]
    InvalidBlockSize(u32),

    /// Scale factor that is not a positive finite number.
    #[error("Facteur d'échelle invalide : {0}")]
    InvalidScale(f64),
}
