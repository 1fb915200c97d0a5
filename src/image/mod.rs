//! Image processing for the voxelizer.
//!
//! # Modules
//!
//! - [`color`]: hex color parsing and interpolation
//! - [`raster`]: SVG markup to a square RGBA buffer
//! - [`voxel`]: RGBA buffer to blocky SVG markup

pub mod color;
pub mod raster;
pub mod voxel;
