//! Parameter types for image operations.
//!
//! These types describe *what* to produce, not *how*. They sit between the
//! high-level [`operations`](super::operations) (which decides which variants
//! to create) and the [`backend`](super::backend) (which does the pixel work).
//!
//! ## Types
//!
//! - [`PixelBuffer`] — 8-bit RGBA, straight alpha. The only pixel format the pipeline handles.
//! - [`SizeLadder`] — Ordered icon edge lengths. Validated on construction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decoded image: 32 bits per pixel, one byte each for R, G, B, A.
pub type PixelBuffer = image::RgbaImage;

/// Largest edge a ladder entry may declare.
pub const MAX_EDGE: u32 = 65_535;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LadderError {
    #[error("size ladder must not be empty")]
    Empty,
    #[error("size {0} is out of range (1-65535)")]
    OutOfRange(u32),
    #[error("sizes must be strictly ascending ({previous} is followed by {next})")]
    NotAscending { previous: u32, next: u32 },
    #[error("size ladder has {0} entries; an icon holds at most 65535")]
    TooManyEntries(usize),
}

/// Ordered list of icon edge lengths, smallest first.
///
/// Always non-empty, strictly ascending, every value in `1..=65535`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct SizeLadder(Vec<u32>);

impl SizeLadder {
    /// The standard Windows icon set.
    pub const STANDARD: [u32; 7] = [16, 24, 32, 48, 64, 128, 256];

    pub fn new(sizes: Vec<u32>) -> Result<Self, LadderError> {
        if sizes.is_empty() {
            return Err(LadderError::Empty);
        }
        if sizes.len() > u16::MAX as usize {
            return Err(LadderError::TooManyEntries(sizes.len()));
        }
        if let Some(&bad) = sizes.iter().find(|&&s| s == 0 || s > MAX_EDGE) {
            return Err(LadderError::OutOfRange(bad));
        }
        if let Some(pair) = sizes.windows(2).find(|w| w[0] >= w[1]) {
            return Err(LadderError::NotAscending {
                previous: pair[0],
                next: pair[1],
            });
        }
        Ok(Self(sizes))
    }

    pub fn sizes(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }
}

impl Default for SizeLadder {
    fn default() -> Self {
        Self(Self::STANDARD.to_vec())
    }
}

impl TryFrom<Vec<u32>> for SizeLadder {
    type Error = LadderError;

    fn try_from(sizes: Vec<u32>) -> Result<Self, Self::Error> {
        Self::new(sizes)
    }
}

impl From<SizeLadder> for Vec<u32> {
    fn from(ladder: SizeLadder) -> Self {
        ladder.0
    }
}
