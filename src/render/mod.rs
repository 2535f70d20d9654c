//! Frame construction and raster output.

pub(crate) mod cpu;
pub(crate) mod pass;
