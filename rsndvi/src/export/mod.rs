pub mod glyphs;
pub mod png;
pub mod stats_file;
