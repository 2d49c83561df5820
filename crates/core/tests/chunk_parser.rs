use sieve_core::binary::{
    chunk_span, AnomalyKind, ChunkParser, FormatError, PayloadHint, PNG_SIGNATURE,
};

fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(tag);
    out.extend_from_slice(payload);
    out.extend_from_slice(&0xDEADBEEFu32.to_be_bytes());
    out
}

fn ihdr(width: u32, height: u32) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&width.to_be_bytes());
    payload.extend_from_slice(&height.to_be_bytes());
    payload.extend_from_slice(&[8, 6, 0, 0, 0]);
    chunk(b"IHDR", &payload)
}

fn minimal_png() -> Vec<u8> {
    let mut data = PNG_SIGNATURE.to_vec();
    data.extend(ihdr(2, 2));
    data.extend(chunk(b"IDAT", &[0x78, 0x9c, 0x63, 0x00, 0x00]));
    data.extend(chunk(b"IEND", &[]));
    data
}

/// Signature plus every chunk span adds up to the end of IEND.
#[test]
fn chunk_spans_cover_stream_up_to_terminal_chunk() {
    let data = minimal_png();
    let parser = ChunkParser::new(&data).expect("valid png");

    let chunks: Vec<_> = parser.chunks().collect();
    assert_eq!(chunks.len(), 3);
    let total: usize = chunks.iter().map(|c| chunk_span(c.length)).sum();
    assert_eq!(PNG_SIGNATURE.len() + total, data.len());
    assert!(chunks.last().expect("last chunk").is_terminal());
    assert_eq!(chunks[0].crc, Some(0xDEADBEEF));
}

/// A well-formed image yields chunks and nothing else.
#[test]
fn clean_png_has_no_anomalies() {
    let data = minimal_png();
    let report = ChunkParser::new(&data).expect("valid png").analyze();

    assert!(report.terminated);
    assert!(report.anomalies.is_empty());
    let tags: Vec<_> = report.chunks.iter().map(|c| c.tag.as_str()).collect();
    assert_eq!(tags, ["IHDR", "IDAT", "IEND"]);
}

/// Appended bytes become a single trailing-data anomaly holding exactly those bytes.
#[test]
fn bytes_after_iend_become_one_trailing_anomaly() {
    let mut data = minimal_png();
    let clean_len = data.len();
    let appended = b"\x7fELF\x02\x01\x01 hidden payload FIRMWARE v2";
    data.extend_from_slice(appended);

    let report = ChunkParser::new(&data).expect("valid png").analyze();

    assert_eq!(report.anomalies.len(), 1);
    let trailing = report.trailing_data().expect("trailing data anomaly");
    assert_eq!(trailing.kind, AnomalyKind::TrailingData);
    assert_eq!(trailing.offset, clean_len);
    assert_eq!(trailing.size, appended.len());
    assert_eq!(trailing.payload, appended);
    assert!(trailing.is_critical());
    assert_eq!(trailing.hints, vec![PayloadHint::ElfExecutable, PayloadHint::FirmwareText]);
}

/// Unknown tags are reported as unusual chunks in the order they appear.
#[test]
fn non_standard_tags_are_reported_in_stream_order() {
    let mut data = PNG_SIGNATURE.to_vec();
    data.extend(ihdr(1, 1));
    data.extend(chunk(b"fwUP", b"MZ payload"));
    data.extend(chunk(b"IDAT", &[0; 4]));
    data.extend(chunk(b"zzZZ", &[]));
    data.extend(chunk(b"IEND", &[]));

    let report = ChunkParser::new(&data).expect("valid png").analyze();

    let tags: Vec<_> = report
        .unusual_chunks()
        .map(|a| match &a.kind {
            AnomalyKind::UnusualChunk { tag } => tag.clone(),
            AnomalyKind::TrailingData => unreachable!("no trailing data expected"),
        })
        .collect();
    assert_eq!(tags, ["fwUP", "zzZZ"]);
    let first = report.unusual_chunks().next().expect("first unusual chunk");
    assert_eq!(first.payload, b"MZ payload");
    assert_eq!(first.size, 10);
    assert!(!first.is_critical());
    assert!(report.trailing_data().is_none());
}

/// A stream that ends without IEND is not treated as having trailing data.
#[test]
fn missing_terminal_chunk_is_not_trailing_data() {
    let mut data = PNG_SIGNATURE.to_vec();
    data.extend(ihdr(1, 1));
    data.extend(chunk(b"IDAT", &[1, 2, 3]));

    let report = ChunkParser::new(&data).expect("valid png").analyze();
    assert!(!report.terminated);
    assert!(report.anomalies.is_empty());
    assert_eq!(report.chunks.len(), 2);
}

/// A partial chunk header ends iteration without panicking.
#[test]
fn leftover_bytes_shorter_than_a_chunk_header_stop_the_walk() {
    let mut data = PNG_SIGNATURE.to_vec();
    data.extend(ihdr(1, 1));
    data.extend_from_slice(&[0, 0, 0]);

    let parser = ChunkParser::new(&data).expect("valid png");
    let mut chunks = parser.chunks();
    assert!(chunks.next().is_some());
    assert!(chunks.next().is_none());
    assert_eq!(chunks.position(), data.len() - 3);
}

/// Input without the PNG magic is rejected and the leading bytes are shown in hex.
#[test]
fn wrong_signature_is_a_format_error() {
    let err = ChunkParser::new(b"GIF89a....").expect_err("not a png");
    assert_eq!(err, FormatError::BadSignature { found: "4749463839612e2e".into() });

    let short = ChunkParser::new(&PNG_SIGNATURE[..4]).expect_err("short input");
    assert!(matches!(short, FormatError::BadSignature { .. }));
}
