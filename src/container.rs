//! ICO container layout, serialization, and inspection.
//!
//! An icon file is a 6-byte header, one 16-byte directory entry per image,
//! then every image payload back-to-back:
//!
//! ```text
//! offset 0   reserved=0 (u16)  type=1 (u16)  count (u16)
//! offset 6   entry 0: w h colors reserved planes bpp length offset
//! offset 22  entry 1: ...
//! ...
//! offset 6 + 16*count   payload 0 | payload 1 | ... (no padding)
//! ```
//!
//! All multi-byte fields are little-endian. Width and height are one byte
//! each; 0 means 256 or larger. Payloads are PNG streams, so colour count is
//! always 0, planes 1 and bits per pixel 32.
//!
//! The writer trusts its inputs: payload bytes are never inspected.

use crate::imaging::calculations::declared_dimension;
use serde::Serialize;
use std::io::Write;
use thiserror::Error;

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 6;
/// Size of one directory entry in bytes.
pub const ENTRY_SIZE: usize = 16;

const RESOURCE_TYPE_ICON: u16 = 1;
const COLOR_PLANES: u16 = 1;
const BITS_PER_PIXEL: u16 = 32;

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("an icon needs at least one image")]
    Empty,
    #[error("{0} images do not fit in an icon directory (max 65535)")]
    TooManyEntries(usize),
    #[error("icon data exceeds 4 GiB")]
    TooLarge,
    #[error("malformed icon: {0}")]
    Malformed(String),
}

/// One resized and compressed rendition of the source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconVariant {
    /// Edge length in pixels (variants are square).
    pub edge: u32,
    /// Compressed image bytes, embedded verbatim.
    pub payload: Vec<u8>,
}

impl IconVariant {
    pub fn new(edge: u32, payload: Vec<u8>) -> Self {
        Self { edge, payload }
    }
}

/// A 16-byte directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub width: u8,
    pub height: u8,
    pub color_count: u8,
    pub planes: u16,
    pub bits_per_pixel: u16,
    pub length: u32,
    pub offset: u32,
}

impl DirectoryEntry {
    fn to_bytes(self) -> [u8; ENTRY_SIZE] {
        let mut out = [0u8; ENTRY_SIZE];
        out[0] = self.width;
        out[1] = self.height;
        out[2] = self.color_count;
        // out[3] reserved
        out[4..6].copy_from_slice(&self.planes.to_le_bytes());
        out[6..8].copy_from_slice(&self.bits_per_pixel.to_le_bytes());
        out[8..12].copy_from_slice(&self.length.to_le_bytes());
        out[12..16].copy_from_slice(&self.offset.to_le_bytes());
        out
    }

    fn from_bytes(raw: &[u8]) -> Self {
        Self {
            width: raw[0],
            height: raw[1],
            color_count: raw[2],
            planes: u16::from_le_bytes([raw[4], raw[5]]),
            bits_per_pixel: u16::from_le_bytes([raw[6], raw[7]]),
            length: u32::from_le_bytes([raw[8], raw[9], raw[10], raw[11]]),
            offset: u32::from_le_bytes([raw[12], raw[13], raw[14], raw[15]]),
        }
    }

    /// Pixel edge this entry declares, with 0 read back as 256.
    pub fn declared_edge(&self) -> u32 {
        if self.width == 0 { 256 } else { self.width as u32 }
    }

    /// First byte past this entry's payload.
    pub fn end(&self) -> u64 {
        self.offset as u64 + self.length as u64
    }
}

/// Byte offset of the first payload for `count` directory entries.
pub fn payload_start(count: usize) -> usize {
    HEADER_SIZE + count * ENTRY_SIZE
}

/// Compute the directory for `variants`, in order.
///
/// Each entry's offset is the payload start plus the lengths of every
/// earlier payload.
pub fn layout(variants: &[IconVariant]) -> Result<Vec<DirectoryEntry>, ContainerError> {
    if variants.is_empty() {
        return Err(ContainerError::Empty);
    }
    if variants.len() > u16::MAX as usize {
        return Err(ContainerError::TooManyEntries(variants.len()));
    }

    let mut offset = payload_start(variants.len()) as u64;
    let mut entries = Vec::with_capacity(variants.len());
    for variant in variants {
        let length =
            u32::try_from(variant.payload.len()).map_err(|_| ContainerError::TooLarge)?;
        let declared = declared_dimension(variant.edge);
        entries.push(DirectoryEntry {
            width: declared,
            height: declared,
            color_count: 0,
            planes: COLOR_PLANES,
            bits_per_pixel: BITS_PER_PIXEL,
            length,
            offset: u32::try_from(offset).map_err(|_| ContainerError::TooLarge)?,
        });
        offset += length as u64;
    }
    if offset > u32::MAX as u64 {
        return Err(ContainerError::TooLarge);
    }
    Ok(entries)
}

/// Serialize an icon to `writer`. Returns the number of bytes written.
///
/// Nothing is written if the layout is invalid. An I/O error part way through
/// leaves the writer with a truncated icon; callers writing files should
/// write to a temporary path and publish on success.
pub fn write_container<W: Write>(
    variants: &[IconVariant],
    writer: &mut W,
) -> Result<u64, ContainerError> {
    let entries = layout(variants)?;

    let mut header = [0u8; HEADER_SIZE];
    header[2..4].copy_from_slice(&RESOURCE_TYPE_ICON.to_le_bytes());
    header[4..6].copy_from_slice(&(entries.len() as u16).to_le_bytes());
    writer.write_all(&header)?;

    for entry in &entries {
        writer.write_all(&entry.to_bytes())?;
    }
    for variant in variants {
        writer.write_all(&variant.payload)?;
    }
    writer.flush()?;

    Ok(entries.last().map(DirectoryEntry::end).unwrap_or_default())
}

/// Serialize an icon into memory.
pub fn encode_container(variants: &[IconVariant]) -> Result<Vec<u8>, ContainerError> {
    let total: usize =
        payload_start(variants.len()) + variants.iter().map(|v| v.payload.len()).sum::<usize>();
    let mut bytes = Vec::with_capacity(total);
    write_container(variants, &mut bytes)?;
    Ok(bytes)
}

/// Header and directory read back from an icon file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerInfo {
    pub entries: Vec<DirectoryEntry>,
    pub file_len: usize,
}

impl ContainerInfo {
    /// Payload bytes of entry `index`.
    pub fn payload<'a>(&self, bytes: &'a [u8], index: usize) -> Option<&'a [u8]> {
        let entry = self.entries.get(index)?;
        bytes.get(entry.offset as usize..entry.end() as usize)
    }
}

/// Parse the header and directory of an icon file.
///
/// Every entry must point inside the file; payload contents are not checked.
pub fn parse_container(bytes: &[u8]) -> Result<ContainerInfo, ContainerError> {
    if bytes.len() < HEADER_SIZE {
        return Err(ContainerError::Malformed(format!(
            "{} bytes is shorter than the header",
            bytes.len()
        )));
    }
    let reserved = u16::from_le_bytes([bytes[0], bytes[1]]);
    let kind = u16::from_le_bytes([bytes[2], bytes[3]]);
    let count = u16::from_le_bytes([bytes[4], bytes[5]]) as usize;
    if reserved != 0 {
        return Err(ContainerError::Malformed(format!(
            "reserved field is {reserved}"
        )));
    }
    if kind != RESOURCE_TYPE_ICON {
        return Err(ContainerError::Malformed(format!(
            "resource type {kind} is not an icon"
        )));
    }

    let directory_end = payload_start(count);
    let directory = bytes.get(HEADER_SIZE..directory_end).ok_or_else(|| {
        ContainerError::Malformed(format!("directory of {count} entries is truncated"))
    })?;

    let entries: Vec<DirectoryEntry> = directory
        .chunks_exact(ENTRY_SIZE)
        .map(DirectoryEntry::from_bytes)
        .collect();

    for (i, entry) in entries.iter().enumerate() {
        if (entry.offset as usize) < directory_end || entry.end() > bytes.len() as u64 {
            return Err(ContainerError::Malformed(format!(
                "entry {i} ({} bytes at {}) lies outside the payload region",
                entry.length, entry.offset
            )));
        }
    }

    Ok(ContainerInfo {
        entries,
        file_len: bytes.len(),
    })
}
