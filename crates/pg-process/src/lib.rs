/// Numeric stages of the pixgrid pipeline.
///
/// Error-diffusion dithering, uniform-block merging and color record
/// extraction over [`pg_core::frame::PixelBuffer`].
pub mod dither;
pub mod extract;
pub mod merge;
