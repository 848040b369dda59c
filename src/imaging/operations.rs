//! High-level image operations.
//!
//! These functions combine calculations with backend execution: crop the
//! source to a square, resample it to each ladder size, encode every size.

use super::backend::{BackendError, ImageBackend};
use super::calculations::square_crop_region;
use super::params::{PixelBuffer, SizeLadder};
use crate::container::IconVariant;
use rayon::prelude::*;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Copy the centered `min(w, h)` square out of `source`.
///
/// No filtering happens here; pixels are copied 1:1. A square input comes
/// back as an identical copy.
pub fn crop_to_square(source: &PixelBuffer) -> Result<PixelBuffer> {
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return Err(BackendError::EmptyImage { width, height });
    }
    let region = square_crop_region(width, height);
    Ok(image::imageops::crop_imm(source, region.x, region.y, region.size, region.size).to_image())
}

/// Resample a square image to `edge`×`edge`.
///
/// Upscaling past the source resolution is allowed; it just can't add detail.
pub fn resample(
    backend: &impl ImageBackend,
    square: &PixelBuffer,
    edge: u32,
) -> Result<PixelBuffer> {
    let (width, height) = square.dimensions();
    if width != height {
        return Err(BackendError::ProcessingFailed(format!(
            "resample expects a square image, got {width}x{height}"
        )));
    }
    if edge == 0 {
        return Err(BackendError::ProcessingFailed(
            "target edge must be at least 1".into(),
        ));
    }
    backend.resize(square, edge, edge)
}

/// Resample and PNG-encode `square` at every ladder size.
///
/// Sizes are processed in parallel; the returned variants are always in
/// ladder order. The first failure aborts the whole set.
pub fn generate_variants(
    backend: &impl ImageBackend,
    square: &PixelBuffer,
    ladder: &SizeLadder,
) -> Result<Vec<IconVariant>> {
    ladder
        .sizes()
        .par_iter()
        .map(|&edge| {
            let resized = resample(backend, square, edge)?;
            let payload = backend.encode_png(&resized)?;
            log::debug!("encoded {edge}x{edge} variant ({} bytes)", payload.len());
            Ok::<_, BackendError>(IconVariant::new(edge, payload))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::imaging::rust_backend::RustBackend;
    use image::Rgba;

    /// Image where every pixel encodes its own coordinates.
    fn coordinate_image(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 7, 255]))
    }

    // =========================================================================
    // crop_to_square tests
    // =========================================================================

    #[test]
    fn crop_landscape_keeps_center() {
        let source = coordinate_image(100, 60);
        let square = crop_to_square(&source).unwrap();

        assert_eq!(square.dimensions(), (60, 60));
        assert_eq!(square.get_pixel(0, 0), source.get_pixel(20, 0));
        assert_eq!(square.get_pixel(59, 0), source.get_pixel(79, 0));
        assert_eq!(square.get_pixel(0, 59), source.get_pixel(20, 59));
        assert_eq!(square.get_pixel(59, 59), source.get_pixel(79, 59));
    }

    #[test]
    fn crop_portrait_keeps_center() {
        let source = coordinate_image(30, 51);
        let square = crop_to_square(&source).unwrap();

        assert_eq!(square.dimensions(), (30, 30));
        // (51 - 30) / 2 = 10
        assert_eq!(square.get_pixel(0, 0), &Rgba([0, 10, 7, 255]));
        assert_eq!(square.get_pixel(29, 29), &Rgba([29, 39, 7, 255]));
    }

    #[test]
    fn crop_square_is_copy() {
        let source = coordinate_image(40, 40);
        let square = crop_to_square(&source).unwrap();
        assert_eq!(square, source);
    }

    #[test]
    fn crop_empty_fails_fast() {
        let source = PixelBuffer::new(0, 10);
        assert!(matches!(
            crop_to_square(&source),
            Err(BackendError::EmptyImage {
                width: 0,
                height: 10
            })
        ));
    }

    // =========================================================================
    // resample tests
    // =========================================================================

    #[test]
    fn resample_hits_every_standard_size() {
        let backend = RustBackend::new();
        let square = coordinate_image(100, 100);
        for edge in SizeLadder::default().iter() {
            let out = resample(&backend, &square, edge).unwrap();
            assert_eq!(out.dimensions(), (edge, edge));
        }
    }

    #[test]
    fn resample_upscales_tiny_source() {
        let backend = RustBackend::new();
        let square = PixelBuffer::from_pixel(4, 4, Rgba([200, 100, 50, 255]));
        let out = resample(&backend, &square, 48).unwrap();
        assert_eq!(out.dimensions(), (48, 48));
    }

    #[test]
    fn resample_rejects_non_square() {
        let backend = MockBackend::new();
        let result = resample(&backend, &PixelBuffer::new(10, 20), 16);
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
        assert!(backend.get_operations().is_empty());
    }

    // =========================================================================
    // generate_variants tests
    // =========================================================================

    #[test]
    fn variants_follow_ladder_order() {
        let backend = MockBackend::new();
        let ladder = SizeLadder::new(vec![16, 32, 48, 256]).unwrap();
        let square = PixelBuffer::new(64, 64);

        let variants = generate_variants(&backend, &square, &ladder).unwrap();

        let edges: Vec<u32> = variants.iter().map(|v| v.edge).collect();
        assert_eq!(edges, vec![16, 32, 48, 256]);
        // Mock payload length equals the edge
        for v in &variants {
            assert_eq!(v.payload.len(), v.edge as usize);
        }
    }

    #[test]
    fn variants_resize_from_the_shared_square() {
        let backend = MockBackend::new();
        let ladder = SizeLadder::new(vec![16, 24]).unwrap();
        let square = PixelBuffer::new(50, 50);

        generate_variants(&backend, &square, &ladder).unwrap();

        let ops = backend.get_operations();
        let resizes = ops
            .iter()
            .filter(|op| matches!(op, RecordedOp::Resize { from: (50, 50), .. }))
            .count();
        let encodes = ops
            .iter()
            .filter(|op| matches!(op, RecordedOp::Encode(_)))
            .count();
        assert_eq!(resizes, 2);
        assert_eq!(encodes, 2);
    }

    #[test]
    fn encode_failure_aborts_all_variants() {
        let backend = MockBackend::new().failing_encode_at(32);
        let ladder = SizeLadder::new(vec![16, 32, 64]).unwrap();
        let square = PixelBuffer::new(64, 64);

        let result = generate_variants(&backend, &square, &ladder);
        assert!(matches!(result, Err(BackendError::Encode(_))));
    }

    #[test]
    fn real_backend_produces_png_payloads() {
        let backend = RustBackend::new();
        let ladder = SizeLadder::new(vec![16, 32]).unwrap();
        let square = coordinate_image(64, 64);

        let variants = generate_variants(&backend, &square, &ladder).unwrap();
        for v in &variants {
            let decoded = backend.decode(&v.payload).unwrap();
            assert_eq!(decoded.dimensions(), (v.edge, v.edge));
        }
    }
}
