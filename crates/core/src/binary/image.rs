use serde::{Deserialize, Serialize};

use super::chunks::{Anomaly, AnomalyKind, ChunkParser, ChunkSummary, PayloadHint};
use super::geometry::{RasterHeader, SizeCheck};
use super::markers::{count_markers, MarkerHit};
use super::FormatError;

/// Bytes of an anomaly payload kept in persisted output.
pub const PREVIEW_BYTES: usize = 100;

/// Persistable view of an [`Anomaly`]: the payload is reduced to a hex preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    #[serde(flatten)]
    pub kind: AnomalyKind,
    pub offset: usize,
    pub size: usize,
    pub critical: bool,
    pub preview_hex: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<PayloadHint>,
}

impl From<&Anomaly> for AnomalyRecord {
    fn from(anomaly: &Anomaly) -> Self {
        let shown = &anomaly.payload[..anomaly.payload.len().min(PREVIEW_BYTES)];
        Self {
            kind: anomaly.kind.clone(),
            offset: anomaly.offset,
            size: anomaly.size,
            critical: anomaly.is_critical(),
            preview_hex: hex::encode(shown),
            hints: anomaly.hints.clone(),
        }
    }
}

/// Combined chunk, geometry and marker inspection of one PNG asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInspection {
    pub file: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<RasterHeader>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_check: Option<SizeCheck>,
    pub chunks: Vec<ChunkSummary>,
    pub anomalies: Vec<AnomalyRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<MarkerHit>,
}

impl ImageInspection {
    pub fn has_trailing_data(&self) -> bool {
        self.anomalies.iter().any(|a| a.critical)
    }

    pub fn is_suspicious(&self) -> bool {
        !self.anomalies.is_empty()
            || self.size_check.is_some_and(|c| c.anomalous)
            || !self.markers.is_empty()
    }
}

/// Inspect an in-memory PNG.
///
/// Fails only when the signature is missing. A header that cannot be read
/// leaves `header` and `size_check` empty; the chunk walk still runs.
pub fn inspect_image<S: AsRef<str>>(
    file: &str,
    data: &[u8],
    size_threshold: f64,
    markers: &[S],
) -> Result<ImageInspection, FormatError> {
    let parser = ChunkParser::new(data)?;
    let report = parser.analyze();

    let header = match RasterHeader::read(data) {
        Ok(header) => Some(header),
        Err(err) => {
            tracing::debug!(file, error = %err, "raster header unreadable");
            None
        }
    };
    let size = data.len() as u64;
    let size_check = header.map(|h| h.check_size(size, size_threshold));

    Ok(ImageInspection {
        file: file.to_string(),
        size,
        header,
        size_check,
        chunks: report.chunks,
        anomalies: report.anomalies.iter().map(AnomalyRecord::from).collect(),
        markers: count_markers(data, markers),
    })
}
