pub mod colormap;
pub mod statistics;
