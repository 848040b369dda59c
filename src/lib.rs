//! # Simple ICO
//!
//! Turns one raster image into a multi-resolution Windows icon. The source is
//! cropped to a centered square, resampled to every size in a ladder
//! (16 → 256 px by default), each size is compressed as a PNG, and the PNGs
//! are packed into a single `.ico` container.
//!
//! # Architecture: Four-Step Pipeline
//!
//! ```text
//! bytes ──decode──▶ RGBA ──crop──▶ square ──(resize → PNG) × N──▶ variants ──pack──▶ .ico
//! ```
//!
//! - **Decode / resize / encode** live behind the [`imaging::ImageBackend`]
//!   trait so the pipeline logic can be tested with a mock.
//! - **Resize + encode** run in parallel per size on the rayon pool. The
//!   cropped square is shared read-only; results are collected in ladder order.
//! - **Packing** is pure arithmetic over payload lengths in [`container`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Codec backend, square crop, resampling, variant generation, size ladder |
//! | [`container`] | ICO header/directory layout, serialization, and parsing |
//! | [`convert`] | One conversion: bytes → icon bytes, and file → file with atomic publish |
//! | [`batch`] | Directory scan, parallel per-file conversion, summary and exit code |
//! | [`config`] | `simple-ico.toml` loading, merging, and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## PNG Payloads Only
//!
//! Every embedded image is a 32-bit RGBA PNG. Windows Vista and later read
//! PNG entries at every size, and PNG keeps the 256 px entry small. Legacy
//! BMP/palette entries are not produced.
//!
//! ## Centered Square Crop
//!
//! Icons are square. Non-square sources lose equal margins from both sides of
//! the long edge; there is no letterboxing and no smart cropping.
//!
//! ## No Partial Files
//!
//! [`convert::convert_file`] writes to a temporary file in the destination
//! directory and renames it into place once complete. A failed conversion
//! never leaves a truncated `.ico` that looks valid.

pub mod batch;
pub mod config;
pub mod container;
pub mod convert;
pub mod imaging;
pub mod output;

pub use convert::{ConversionError, ConversionStage, convert};
pub use imaging::SizeLadder;
