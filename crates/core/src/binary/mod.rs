//! Binary inspection primitives.
//!
//! Everything here works on byte slices already in memory:
//! - `chunks`: PNG-style chunk walking with anomaly detection
//! - `signature`: magic-byte format classification
//! - `geometry`: declared raster size vs. actual file size
//! - `markers`: literal byte marker counting
//! - `strings`: printable string extraction and triage
//! - `image`: the above combined for one PNG asset

pub mod chunks;
pub mod geometry;
pub mod image;
pub mod markers;
pub mod signature;
pub mod strings;

use thiserror::Error;

pub use chunks::{
    chunk_span, probe_payload, validate_signature, Anomaly, AnomalyKind, Chunk, ChunkParser,
    ChunkReport, ChunkSummary, Chunks, PayloadHint, PNG_SIGNATURE, STANDARD_CHUNK_TAGS,
};
pub use geometry::{ColorMode, RasterHeader, SizeCheck, DEFAULT_SIZE_RATIO_THRESHOLD};
pub use image::{inspect_image, AnomalyRecord, ImageInspection, PREVIEW_BYTES};
pub use markers::{count_markers, MarkerHit};
pub use signature::{classify, classify_path, FirmwareType, SIGNATURE_WINDOW};
pub use strings::{extract_printable, InterestingStrings, DEFAULT_MIN_STRING_LEN};

/// Structural problem with a binary artifact.
///
/// Aborts analysis of that one artifact only; callers record it and move on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("not a PNG container (leading bytes: {found})")]
    BadSignature { found: String },
    #[error("header truncated: need {needed} bytes, have {available}")]
    TruncatedHeader { needed: usize, available: usize },
    #[error("first chunk is {found}, expected IHDR")]
    MissingHeaderChunk { found: String },
}
