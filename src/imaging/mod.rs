//! Image processing, pure Rust via the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (format sniffed from bytes) |
//! | **Square crop** | `image::imageops::crop_imm`, 1:1 copy |
//! | **Resample** | `image::imageops::resize` with Lanczos3 |
//! | **Encode** | `image::codecs::png::PngEncoder` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop geometry and directory bytes (unit testable)
//! - **Parameters**: [`PixelBuffer`] and the validated [`SizeLadder`]
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Crop, resample, and per-ladder variant generation

pub mod backend;
pub mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use operations::{crop_to_square, generate_variants, resample};
pub use params::{LadderError, MAX_EDGE, PixelBuffer, SizeLadder};
pub use rust_backend::{RustBackend, has_extension, supported_input_extensions};
