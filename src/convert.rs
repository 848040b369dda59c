//! Single-image conversion: source bytes in, icon bytes out.
//!
//! ```text
//! Idle → Decoded → Cropped → VariantsGenerated → Written
//!   └──────┴─────────┴──────────────┴──────────→ Failed(reason)
//! ```
//!
//! Each step either advances the stage or fails the whole conversion with a
//! tagged [`ConversionError`]. Nothing is retried.
//!
//! ## Output files
//!
//! [`convert_file`] never leaves a half-written icon behind. The container is
//! written to a temporary file in the destination directory and renamed over
//! the destination only after every byte has been flushed. On any failure the
//! temporary file is removed and the destination is untouched.

use crate::container::{self, ContainerError};
use crate::imaging::{
    BackendError, ImageBackend, RustBackend, SizeLadder, crop_to_square, generate_variants,
};
use serde::Serialize;
use std::fmt;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where a conversion is, or where it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionStage {
    Idle,
    Decoded,
    Cropped,
    VariantsGenerated,
    Written,
}

impl fmt::Display for ConversionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Decoded => "decoded",
            Self::Cropped => "cropped",
            Self::VariantsGenerated => "variants generated",
            Self::Written => "written",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("decode error: {source}")]
    Decode {
        #[source]
        source: BackendError,
    },
    #[error("encode error (after {stage}): {source}")]
    Encode {
        stage: ConversionStage,
        #[source]
        source: BackendError,
    },
    #[error("encode error (after variants generated): {source}")]
    Layout {
        #[source]
        source: ContainerError,
    },
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        stage: ConversionStage,
        #[source]
        source: std::io::Error,
    },
}

impl ConversionError {
    /// Last stage reached before the failure.
    pub fn stage(&self) -> ConversionStage {
        match self {
            Self::Decode { .. } => ConversionStage::Idle,
            Self::Layout { .. } => ConversionStage::VariantsGenerated,
            Self::Encode { stage, .. } | Self::Io { stage, .. } => *stage,
        }
    }

    /// Short tag for reports: `decode`, `encode` or `io`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "decode",
            Self::Encode { .. } | Self::Layout { .. } => "encode",
            Self::Io { .. } => "io",
        }
    }

    fn io(path: &Path, stage: ConversionStage, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            stage,
            source,
        }
    }
}

/// Convert encoded image bytes into icon bytes with the default codec.
pub fn convert(input: &[u8], ladder: &SizeLadder) -> Result<Vec<u8>, ConversionError> {
    convert_with_backend(&RustBackend::new(), input, ladder)
}

/// Convert using a specific backend (allows testing with mock).
pub fn convert_with_backend(
    backend: &impl ImageBackend,
    input: &[u8],
    ladder: &SizeLadder,
) -> Result<Vec<u8>, ConversionError> {
    let decoded = backend
        .decode(input)
        .map_err(|source| ConversionError::Decode { source })?;
    log::debug!(
        "{}: {}x{}",
        ConversionStage::Decoded,
        decoded.width(),
        decoded.height()
    );

    let square = crop_to_square(&decoded).map_err(|source| ConversionError::Decode { source })?;
    drop(decoded);
    log::debug!("{}: {}x{}", ConversionStage::Cropped, square.width(), square.height());

    let variants =
        generate_variants(backend, &square, ladder).map_err(|source| ConversionError::Encode {
            stage: ConversionStage::Cropped,
            source,
        })?;
    log::debug!(
        "{}: {} sizes",
        ConversionStage::VariantsGenerated,
        variants.len()
    );

    // Writing to memory cannot hit I/O errors; only the layout limits remain.
    container::encode_container(&variants).map_err(|source| ConversionError::Layout { source })
}

/// Output path for an input: same directory and stem, `.ico` extension.
pub fn icon_path_for(input: &Path) -> PathBuf {
    input.with_extension("ico")
}

/// Summary of one finished file conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Converted {
    pub output: PathBuf,
    pub bytes: u64,
    pub sizes: Vec<u32>,
}

/// Read `input`, convert it, and atomically publish the icon at `output`.
pub fn convert_file(
    input: &Path,
    output: &Path,
    ladder: &SizeLadder,
) -> Result<Converted, ConversionError> {
    convert_file_with_backend(&RustBackend::new(), input, output, ladder)
}

/// [`convert_file`] with a specific backend.
pub fn convert_file_with_backend(
    backend: &impl ImageBackend,
    input: &Path,
    output: &Path,
    ladder: &SizeLadder,
) -> Result<Converted, ConversionError> {
    let source =
        std::fs::read(input).map_err(|e| ConversionError::io(input, ConversionStage::Idle, e))?;
    let icon = convert_with_backend(backend, &source, ladder)?;
    publish(output, &icon)
        .map_err(|e| ConversionError::io(output, ConversionStage::VariantsGenerated, e))?;
    log::debug!("{}: {}", ConversionStage::Written, output.display());

    Ok(Converted {
        output: output.to_path_buf(),
        bytes: icon.len() as u64,
        sizes: ladder.sizes().to_vec(),
    })
}

/// Write `bytes` to a sibling temp file, then rename it onto `output`.
fn publish(output: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".simple-ico-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        writer.write_all(bytes)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(output).map_err(|e| e.error)?;
    Ok(())
}
