//! Raw heightmap decoding.
//!
//! A heightmap file is `width * height` row-major pixels, each `bits / 8` bytes,
//! little-endian, with no header. Every pixel decodes to a height in `[0, 1]`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors raised while loading a heightmap.
#[derive(Debug, Error)]
pub enum HeightmapError {
    /// The file does not exist.
    #[error("heightmap not found: {}", path.display())]
    FileNotFound {
        /// Requested path.
        path: PathBuf,
    },
    /// The byte length does not match `bits / 8 * width * height`.
    #[error("heightmap size mismatch: expected {expected} bytes, found {found}")]
    SizeMismatch {
        /// Expected byte length.
        expected: usize,
        /// Actual byte length.
        found: usize,
    },
    /// Pixel width other than 8, 16 or 32 bits.
    #[error("unsupported heightmap pixel width: {bits} bits")]
    UnsupportedFormat {
        /// Requested bits per pixel.
        bits: u32,
    },
    /// Fewer than two samples along an axis.
    #[error("invalid heightmap dimensions {width}x{height} (need at least 2x2)")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// Any other read failure.
    #[error("failed to read heightmap: {0}")]
    Io(#[from] io::Error),
}

/// Pixel encoding of a heightmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// One byte per pixel.
    U8,
    /// Two bytes per pixel.
    U16,
    /// Four bytes per pixel.
    U32,
}

impl PixelFormat {
    /// Format for `bits` per pixel.
    pub fn from_bits(bits: u32) -> Result<Self, HeightmapError> {
        match bits {
            8 => Ok(Self::U8),
            16 => Ok(Self::U16),
            32 => Ok(Self::U32),
            _ => Err(HeightmapError::UnsupportedFormat { bits }),
        }
    }

    /// Bytes per pixel.
    pub fn bytes(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }

    /// Decode one little-endian pixel to `[0, 1]`.
    pub fn decode(self, pixel: &[u8]) -> f32 {
        let raw = pixel
            .iter()
            .take(self.bytes())
            .rev()
            .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte));
        let max = match self {
            Self::U8 => u64::from(u8::MAX),
            Self::U16 => u64::from(u16::MAX),
            Self::U32 => u64::from(u32::MAX),
        };
        (raw as f64 / max as f64) as f32
    }
}

/// Decoded heightmap samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Heightmap {
    width: u32,
    height: u32,
    samples: Vec<f32>,
}

impl Heightmap {
    /// Read and decode the file at `path`.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(
        path: P,
        bits: u32,
        width: u32,
        height: u32,
    ) -> Result<Self, HeightmapError> {
        let path = path.as_ref();
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(HeightmapError::FileNotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(err) => return Err(err.into()),
        };
        debug!(len = bytes.len(), "heightmap read");
        Self::from_bytes(&bytes, bits, width, height)
    }

    /// Decode an in-memory heightmap.
    pub fn from_bytes(
        bytes: &[u8],
        bits: u32,
        width: u32,
        height: u32,
    ) -> Result<Self, HeightmapError> {
        let format = PixelFormat::from_bits(bits)?;
        if width < 2 || height < 2 {
            return Err(HeightmapError::InvalidDimensions { width, height });
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(format.bytes()))
            .ok_or(HeightmapError::InvalidDimensions { width, height })?;
        if bytes.len() != expected {
            return Err(HeightmapError::SizeMismatch {
                expected,
                found: bytes.len(),
            });
        }
        let samples = bytes
            .chunks_exact(format.bytes())
            .map(|pixel| format.decode(pixel))
            .collect();
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Build from already-normalized samples (row-major).
    pub fn from_samples(width: u32, height: u32, samples: Vec<f32>) -> Result<Self, HeightmapError> {
        if width < 2 || height < 2 {
            return Err(HeightmapError::InvalidDimensions { width, height });
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or(HeightmapError::InvalidDimensions { width, height })?;
        if samples.len() != expected {
            return Err(HeightmapError::SizeMismatch {
                expected,
                found: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Samples along X.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Samples along Z.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Normalized height at column `i`, row `j`.
    pub fn sample(&self, i: u32, j: u32) -> f32 {
        self.samples[(j * self.width + i) as usize]
    }

    /// All samples, row-major.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}
