use serde::{Deserialize, Serialize};

use super::chunks::{validate_signature, PNG_SIGNATURE};
use super::FormatError;

/// Ratio of actual to expected size above which an image is flagged.
pub const DEFAULT_SIZE_RATIO_THRESHOLD: f64 = 1.5;

/// signature (8) + IHDR length/tag (8) + width, height, depth, colour type (10)
const IHDR_FIELDS_END: usize = PNG_SIGNATURE.len() + 8 + 10;

/// Colour mode as declared by the IHDR colour-type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    Grayscale,
    Truecolor,
    Indexed,
    GrayscaleAlpha,
    TruecolorAlpha,
    Other(u8),
}

impl ColorMode {
    pub fn from_type_byte(value: u8) -> Self {
        match value {
            0 => ColorMode::Grayscale,
            2 => ColorMode::Truecolor,
            3 => ColorMode::Indexed,
            4 => ColorMode::GrayscaleAlpha,
            6 => ColorMode::TruecolorAlpha,
            other => ColorMode::Other(other),
        }
    }

    /// Samples per pixel. Unmapped modes count as four.
    pub fn channels(&self) -> u64 {
        match self {
            ColorMode::Grayscale | ColorMode::Indexed => 1,
            ColorMode::GrayscaleAlpha => 2,
            ColorMode::Truecolor => 3,
            ColorMode::TruecolorAlpha | ColorMode::Other(_) => 4,
        }
    }
}

/// Declared raster geometry from the header chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterHeader {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_mode: ColorMode,
}

impl RasterHeader {
    /// Read the IHDR fields at their fixed offsets in a PNG stream.
    pub fn read(data: &[u8]) -> Result<Self, FormatError> {
        validate_signature(data)?;
        if data.len() < IHDR_FIELDS_END {
            return Err(FormatError::TruncatedHeader {
                needed: IHDR_FIELDS_END,
                available: data.len(),
            });
        }
        let tag = &data[12..16];
        if tag != b"IHDR" {
            return Err(FormatError::MissingHeaderChunk {
                found: String::from_utf8_lossy(tag).into_owned(),
            });
        }
        Self::from_fields(&data[16..IHDR_FIELDS_END])
    }

    /// Parse the leading fields of an IHDR payload.
    pub fn from_fields(payload: &[u8]) -> Result<Self, FormatError> {
        if payload.len() < 10 {
            return Err(FormatError::TruncatedHeader { needed: 10, available: payload.len() });
        }
        Ok(Self {
            width: u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]),
            height: u32::from_be_bytes([payload[4], payload[5], payload[6], payload[7]]),
            bit_depth: payload[8],
            color_mode: ColorMode::from_type_byte(payload[9]),
        })
    }

    /// Rough uncompressed raster size. Sub-byte depths yield zero.
    pub fn expected_size(&self) -> u64 {
        (self.width as u64)
            .saturating_mul(self.height as u64)
            .saturating_mul(self.color_mode.channels())
            .saturating_mul((self.bit_depth / 8) as u64)
    }

    pub fn check_size(&self, actual_size: u64, threshold: f64) -> SizeCheck {
        SizeCheck::evaluate(self.expected_size(), actual_size, threshold)
    }
}

/// Outcome of comparing declared geometry with the real file size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeCheck {
    pub expected_size: u64,
    pub actual_size: u64,
    /// Absent when the expected size is zero and the check was skipped.
    pub ratio: Option<f64>,
    pub anomalous: bool,
}

impl SizeCheck {
    pub fn evaluate(expected_size: u64, actual_size: u64, threshold: f64) -> Self {
        if expected_size == 0 {
            return Self { expected_size, actual_size, ratio: None, anomalous: false };
        }
        let ratio = actual_size as f64 / expected_size as f64;
        Self { expected_size, actual_size, ratio: Some(ratio), anomalous: ratio > threshold }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_colour_type_defaults_to_four_channels() {
        assert_eq!(ColorMode::from_type_byte(5).channels(), 4);
        assert_eq!(ColorMode::from_type_byte(3).channels(), 1);
    }

    #[test]
    fn sub_byte_depth_skips_the_check() {
        let header = RasterHeader {
            width: 100,
            height: 100,
            bit_depth: 4,
            color_mode: ColorMode::Indexed,
        };
        let check = header.check_size(1_000_000, DEFAULT_SIZE_RATIO_THRESHOLD);
        assert_eq!(check.ratio, None);
        assert!(!check.anomalous);
    }
}
