pub mod bitmap;
pub mod cache;
