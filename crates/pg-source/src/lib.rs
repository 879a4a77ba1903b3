/// Image decoding, folder scanning and resampling for pixgrid.

pub mod folder_batch;
pub mod image;
pub mod resize;
