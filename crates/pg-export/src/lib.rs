/// Serialization of pixgrid results: JSON color records and PNG images.

pub mod json;
pub mod png;
