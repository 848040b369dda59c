//! Codec backend trait and shared error type.
//!
//! The [`ImageBackend`] trait defines the three operations the icon pipeline
//! needs from a codec: decode, resize, and encode.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) — the `image` crate, pure
//! Rust, statically linked.

use super::params::PixelBuffer;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to encode image: {0}")]
    Encode(String),
    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for codec backends.
///
/// Implementations must be `Sync`: variants are resized and encoded on the
/// rayon pool against a shared backend reference.
pub trait ImageBackend: Sync {
    /// Decode an encoded image into RGBA pixels.
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, BackendError>;

    /// Resample `image` to exactly `width`×`height` with a high-quality filter.
    fn resize(
        &self,
        image: &PixelBuffer,
        width: u32,
        height: u32,
    ) -> Result<PixelBuffer, BackendError>;

    /// Compress `image` into PNG bytes.
    fn encode_png(&self, image: &PixelBuffer) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock backend that records operations and fakes the pixel work.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    ///
    /// `decode` returns a solid image of `decode_size`, `resize` returns a
    /// blank buffer of the requested size, and `encode_png` returns `edge`
    /// repeated bytes so payload lengths are predictable.
    #[derive(Default)]
    pub struct MockBackend {
        pub decode_size: Option<(u32, u32)>,
        pub fail_encode_at: Option<u32>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode(usize),
        Resize {
            from: (u32, u32),
            to: (u32, u32),
        },
        Encode(u32),
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_decode_size(width: u32, height: u32) -> Self {
            Self {
                decode_size: Some((width, height)),
                ..Self::default()
            }
        }

        pub fn failing_encode_at(mut self, edge: u32) -> Self {
            self.fail_encode_at = Some(edge);
            self
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ImageBackend for MockBackend {
        fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Decode(bytes.len()));

            let (w, h) = self
                .decode_size
                .ok_or_else(|| BackendError::Decode("No mock image".to_string()))?;
            Ok(PixelBuffer::from_pixel(w, h, image::Rgba([10, 20, 30, 255])))
        }

        fn resize(
            &self,
            image: &PixelBuffer,
            width: u32,
            height: u32,
        ) -> Result<PixelBuffer, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Resize {
                from: image.dimensions(),
                to: (width, height),
            });
            Ok(PixelBuffer::new(width, height))
        }

        fn encode_png(&self, image: &PixelBuffer) -> Result<Vec<u8>, BackendError> {
            let edge = image.width();
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Encode(edge));

            if self.fail_encode_at == Some(edge) {
                return Err(BackendError::Encode(format!("mock failure at {edge}")));
            }
            Ok(vec![edge as u8; edge as usize])
        }
    }

    #[test]
    fn mock_records_decode() {
        let backend = MockBackend::with_decode_size(80, 40);

        let result = backend.decode(b"fake").unwrap();
        assert_eq!(result.dimensions(), (80, 40));

        let ops = backend.get_operations();
        assert_eq!(ops, vec![RecordedOp::Decode(4)]);
    }

    #[test]
    fn mock_without_image_fails_decode() {
        let backend = MockBackend::new();
        assert!(matches!(
            backend.decode(b"anything"),
            Err(BackendError::Decode(_))
        ));
    }

    #[test]
    fn mock_records_resize_and_encode() {
        let backend = MockBackend::new();
        let source = PixelBuffer::new(64, 64);

        let resized = backend.resize(&source, 16, 16).unwrap();
        let payload = backend.encode_png(&resized).unwrap();
        assert_eq!(payload.len(), 16);

        let ops = backend.get_operations();
        assert_eq!(
            ops,
            vec![
                RecordedOp::Resize {
                    from: (64, 64),
                    to: (16, 16)
                },
                RecordedOp::Encode(16),
            ]
        );
    }

    #[test]
    fn mock_encode_failure_is_reported() {
        let backend = MockBackend::new().failing_encode_at(32);
        let image = PixelBuffer::new(32, 32);
        assert!(matches!(
            backend.encode_png(&image),
            Err(BackendError::Encode(_))
        ));
    }
}
