use memchr::memmem;
use serde::{Deserialize, Serialize};

/// A literal marker and how many times it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerHit {
    pub marker: String,
    pub count: usize,
}

/// Count non-overlapping occurrences of each marker in `data`.
///
/// Markers that never occur (and empty markers) are left out.
pub fn count_markers<S: AsRef<str>>(data: &[u8], markers: &[S]) -> Vec<MarkerHit> {
    markers
        .iter()
        .filter_map(|marker| {
            let needle = marker.as_ref().as_bytes();
            let count = count_occurrences(data, needle);
            (count > 0).then(|| MarkerHit { marker: marker.as_ref().to_string(), count })
        })
        .collect()
}

fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    if needle.is_empty() {
        return 0;
    }
    memmem::find_iter(haystack, needle).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_are_non_overlapping() {
        assert_eq!(count_occurrences(b"aaaa", b"aa"), 2);
        assert_eq!(count_occurrences(b"abc", b""), 0);
        assert_eq!(count_occurrences(b".bin.bin.bi", b".bin"), 2);
        assert_eq!(count_occurrences(b"ab", b"abc"), 0);
    }

    #[test]
    fn absent_markers_are_omitted() {
        let hits = count_markers(b"FIRMWARE v2 FIRMWARE", &["FIRMWARE", "UPDATE"]);
        assert_eq!(hits, vec![MarkerHit { marker: "FIRMWARE".into(), count: 2 }]);
    }
}
