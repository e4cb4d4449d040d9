pub mod ndvi;
pub mod pipeline;
