pub mod fuse_map;
pub mod gal22v10;

pub use fuse_map::FuseMap;
pub use gal22v10::{Gal22V10, ProgrammableArray};
