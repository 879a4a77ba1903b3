/// Configuration, types, and shared structures for pixgrid.
///
/// This crate contains the pixel buffer, record types, errors and
/// configuration logic used across the pixgrid workspace.

pub mod config;
pub mod error;
pub mod frame;
pub mod record;

pub use config::PipelineConfig;
pub use error::PixelError;
pub use frame::{PixelBuffer, Rgba};
pub use record::{ColorRecord, ColorValue, MergedBlock};
