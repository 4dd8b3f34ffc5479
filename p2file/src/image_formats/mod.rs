pub mod base;
pub mod brpm;
pub mod font;
pub mod shp;
