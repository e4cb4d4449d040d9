pub mod global_variables;
pub mod polygon;
pub mod raster;
