use memchr::memmem;
use serde::{Deserialize, Serialize};

use super::FormatError;

/// Leading magic of a PNG container.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Chunk tags considered part of a normal PNG. Anything else is reported.
pub const STANDARD_CHUNK_TAGS: [[u8; 4]; 18] = [
    *b"IHDR", *b"PLTE", *b"IDAT", *b"IEND", *b"tRNS", *b"gAMA", *b"cHRM", *b"sRGB", *b"iCCP",
    *b"tEXt", *b"zTXt", *b"iTXt", *b"bKGD", *b"pHYs", *b"sBIT", *b"sPLT", *b"hIST", *b"tIME",
];

const TERMINAL_TAG: [u8; 4] = *b"IEND";

/// length (4) + tag (4) + crc (4)
const CHUNK_OVERHEAD: usize = 12;

/// Check the 8-byte PNG magic at the start of `bytes`.
pub fn validate_signature(bytes: &[u8]) -> Result<(), FormatError> {
    if bytes.len() >= PNG_SIGNATURE.len() && bytes[..PNG_SIGNATURE.len()] == PNG_SIGNATURE {
        return Ok(());
    }
    let shown = &bytes[..bytes.len().min(PNG_SIGNATURE.len())];
    Err(FormatError::BadSignature { found: hex::encode(shown) })
}

/// One length-prefixed segment, borrowed from the underlying stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub tag: [u8; 4],
    /// Stream offset of the length field.
    pub offset: usize,
    /// Declared payload length.
    pub length: u32,
    /// Payload bytes; shorter than `length` only for a truncated final chunk.
    pub payload: &'a [u8],
    /// Stored checksum. Never verified; `None` when the stream ends early.
    pub crc: Option<u32>,
    /// Stream position immediately after this chunk.
    pub end: usize,
}

impl Chunk<'_> {
    pub fn tag_str(&self) -> String {
        String::from_utf8_lossy(&self.tag).into_owned()
    }

    pub fn is_standard(&self) -> bool {
        STANDARD_CHUNK_TAGS.contains(&self.tag)
    }

    pub fn is_terminal(&self) -> bool {
        self.tag == TERMINAL_TAG
    }

    pub fn is_truncated(&self) -> bool {
        self.crc.is_none()
    }
}

/// Iterator over the chunks of a validated stream.
///
/// Stops at end of stream, after a truncated chunk, or right after `IEND`.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    data: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> Chunks<'a> {
    /// Current stream position (start of the next unread chunk).
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let data = self.data;
        let start = self.pos;
        if data.len().saturating_sub(start) < 8 {
            self.done = true;
            return None;
        }

        let length = u32::from_be_bytes([
            data[start],
            data[start + 1],
            data[start + 2],
            data[start + 3],
        ]);
        let tag = [data[start + 4], data[start + 5], data[start + 6], data[start + 7]];

        let payload_start = start + 8;
        let declared_end = payload_start.saturating_add(length as usize);
        let payload_end = declared_end.min(data.len());
        let payload = &data[payload_start..payload_end];

        let (crc, end) = match data.get(declared_end..declared_end.saturating_add(4)) {
            Some(raw) if declared_end == payload_end => {
                (Some(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]])), declared_end + 4)
            }
            _ => (None, data.len()),
        };

        let chunk = Chunk { tag, offset: start, length, payload, crc, end };
        if chunk.is_terminal() || chunk.is_truncated() {
            self.done = true;
        }
        self.pos = end;
        Some(chunk)
    }
}

/// Hint about what an appended payload might be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadHint {
    /// Starts with the ELF magic.
    ElfExecutable,
    /// Starts with the DOS `MZ` stub.
    PeExecutable,
    /// Contains the text "firmware" in any case.
    FirmwareText,
}

impl PayloadHint {
    pub fn describe(&self) -> &'static str {
        match self {
            PayloadHint::ElfExecutable => "possible ELF binary (Linux executable)",
            PayloadHint::PeExecutable => "possible PE binary (Windows executable)",
            PayloadHint::FirmwareText => "contains the text 'FIRMWARE'",
        }
    }
}

/// Probe an opaque payload for embedded-binary signatures.
pub fn probe_payload(payload: &[u8]) -> Vec<PayloadHint> {
    let mut hints = Vec::new();
    if payload.starts_with(b"\x7fELF") {
        hints.push(PayloadHint::ElfExecutable);
    }
    if payload.starts_with(b"MZ") {
        hints.push(PayloadHint::PeExecutable);
    }
    if memmem::find(&payload.to_ascii_lowercase(), b"firmware").is_some() {
        hints.push(PayloadHint::FirmwareText);
    }
    hints
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnomalyKind {
    /// A chunk whose tag is outside [`STANDARD_CHUNK_TAGS`].
    UnusualChunk { tag: String },
    /// Bytes after the terminal chunk.
    TrailingData,
}

/// Structural irregularity found while walking a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub offset: usize,
    pub size: usize,
    /// Verbatim copy of the offending bytes.
    pub payload: Vec<u8>,
    pub hints: Vec<PayloadHint>,
}

impl Anomaly {
    /// Trailing data is the strong signal; unusual chunks are often benign metadata.
    pub fn is_critical(&self) -> bool {
        matches!(self.kind, AnomalyKind::TrailingData)
    }
}

/// Lightweight listing entry for a parsed chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSummary {
    pub tag: String,
    pub offset: usize,
    pub length: u32,
}

impl From<&Chunk<'_>> for ChunkSummary {
    fn from(chunk: &Chunk<'_>) -> Self {
        Self { tag: chunk.tag_str(), offset: chunk.offset, length: chunk.length }
    }
}

/// Result of a full parse pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChunkReport {
    pub chunks: Vec<ChunkSummary>,
    pub anomalies: Vec<Anomaly>,
    /// True when the terminal chunk was reached.
    pub terminated: bool,
}

impl ChunkReport {
    pub fn trailing_data(&self) -> Option<&Anomaly> {
        self.anomalies.iter().find(|a| a.is_critical())
    }

    pub fn unusual_chunks(&self) -> impl Iterator<Item = &Anomaly> {
        self.anomalies.iter().filter(|a| !a.is_critical())
    }
}

/// Walks a PNG-style chunked container.
#[derive(Debug, Clone, Copy)]
pub struct ChunkParser<'a> {
    data: &'a [u8],
}

impl<'a> ChunkParser<'a> {
    /// Validate the signature and prepare a parser over `data`.
    pub fn new(data: &'a [u8]) -> Result<Self, FormatError> {
        validate_signature(data)?;
        Ok(Self { data })
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn chunks(&self) -> Chunks<'a> {
        Chunks { data: self.data, pos: PNG_SIGNATURE.len(), done: false }
    }

    /// Walk every chunk, collecting unusual tags and any data past `IEND`.
    pub fn analyze(&self) -> ChunkReport {
        let mut report = ChunkReport::default();

        for chunk in self.chunks() {
            report.chunks.push(ChunkSummary::from(&chunk));

            if !chunk.is_standard() {
                report.anomalies.push(Anomaly {
                    kind: AnomalyKind::UnusualChunk { tag: chunk.tag_str() },
                    offset: chunk.offset,
                    size: chunk.length as usize,
                    payload: chunk.payload.to_vec(),
                    hints: Vec::new(),
                });
            }

            if chunk.is_terminal() {
                report.terminated = true;
                let extra = self.data.len().saturating_sub(chunk.end);
                if extra > 0 {
                    let payload = self.data[chunk.end..].to_vec();
                    let hints = probe_payload(&payload);
                    tracing::warn!(
                        offset = chunk.end,
                        size = extra,
                        ?hints,
                        "data found after terminal chunk"
                    );
                    report.anomalies.push(Anomaly {
                        kind: AnomalyKind::TrailingData,
                        offset: chunk.end,
                        size: extra,
                        payload,
                        hints,
                    });
                }
            }
        }

        report
    }
}

/// Bytes consumed by a complete chunk with the given declared length.
pub fn chunk_span(length: u32) -> usize {
    CHUNK_OVERHEAD + length as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn firmware_text_matches_any_case_anywhere() {
        assert_eq!(probe_payload(b"\0\0new FirmWare image"), vec![PayloadHint::FirmwareText]);
        assert_eq!(
            probe_payload(b"MZ..FIRMWARE"),
            vec![PayloadHint::PeExecutable, PayloadHint::FirmwareText]
        );
        assert!(probe_payload(b"firmwar").is_empty());
    }

    fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(tag);
        out.extend_from_slice(payload);
        out.extend_from_slice(&[0, 0, 0, 0]);
        out
    }

    #[test]
    fn probe_payload_reports_every_matching_hint() {
        let hints = probe_payload(b"\x7fELF....FirmWare");
        assert_eq!(hints, vec![PayloadHint::ElfExecutable, PayloadHint::FirmwareText]);
        assert!(probe_payload(b"").is_empty());
    }

    #[test]
    fn truncated_payload_ends_iteration() {
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend(chunk(b"IHDR", &[0; 13]));
        data.extend_from_slice(&100u32.to_be_bytes());
        data.extend_from_slice(b"IDAT");
        data.extend_from_slice(&[1, 2, 3]);

        let parser = ChunkParser::new(&data).unwrap();
        let chunks: Vec<_> = parser.chunks().collect();
        assert_eq!(chunks.len(), 2);
        assert!(chunks[1].is_truncated());
        assert_eq!(chunks[1].payload, &[1, 2, 3]);
        assert_eq!(chunks[1].end, data.len());
    }

    #[test]
    fn chunk_span_counts_overhead() {
        assert_eq!(chunk_span(0), 12);
        assert_eq!(chunk_span(13), 25);
    }
}
