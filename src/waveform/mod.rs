pub(crate) mod decimate;
pub(crate) mod pipeline;
pub(crate) mod raster;
