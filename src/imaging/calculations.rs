//! Pure calculation functions for icon geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// A square region inside a larger image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub size: u32,
}

/// Calculate the centered square region of a `width`×`height` image.
///
/// The square edge is the shorter side. Odd leftovers are floored, so the
/// extra pixel ends up on the right/bottom.
///
/// # Examples
/// ```
/// # use simple_ico::imaging::calculations::{square_crop_region, CropRegion};
/// // 100x60 landscape → 60x60 starting 20px in
/// assert_eq!(square_crop_region(100, 60), CropRegion { x: 20, y: 0, size: 60 });
/// ```
pub fn square_crop_region(width: u32, height: u32) -> CropRegion {
    let size = width.min(height);
    CropRegion {
        x: (width - size) / 2,
        y: (height - size) / 2,
        size,
    }
}

/// Encode an icon edge length as the single directory byte.
///
/// Directory entries only have one byte per dimension; 0 stands for 256 and
/// anything larger.
pub fn declared_dimension(edge: u32) -> u8 {
    if edge >= 256 { 0 } else { edge as u8 }
}
