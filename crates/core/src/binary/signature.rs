//! Magic-byte classification of firmware and package blobs.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use memchr::memmem;
use serde::{Deserialize, Serialize};

/// Number of leading bytes the classifier looks at.
pub const SIGNATURE_WINDOW: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirmwareType {
    /// ZIP family: APK, JAR, plain zip.
    Archive,
    /// ELF executable or shared object.
    Executable,
    AndroidDex,
    AndroidBootImage,
    /// U-Boot legacy image.
    BootLoaderImage,
    Gzip,
    Bzip2,
    Xz,
    Lzma,
    Unknown,
}

impl FirmwareType {
    pub fn label(&self) -> &'static str {
        match self {
            FirmwareType::Archive => "ZIP/APK/JAR",
            FirmwareType::Executable => "ELF Binary",
            FirmwareType::AndroidDex => "Android DEX",
            FirmwareType::AndroidBootImage => "Android Boot Image",
            FirmwareType::BootLoaderImage => "U-Boot Image",
            FirmwareType::Gzip => "GZIP Compressed",
            FirmwareType::Bzip2 => "BZIP2 Compressed",
            FirmwareType::Xz => "XZ Compressed",
            FirmwareType::Lzma => "LZMA Compressed",
            FirmwareType::Unknown => "Unknown",
        }
    }

    pub fn is_archive(&self) -> bool {
        matches!(self, FirmwareType::Archive)
    }
}

impl fmt::Display for FirmwareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy)]
enum Matcher {
    Prefix(&'static [u8]),
    /// Needle anywhere within the first `within` bytes.
    Contains { needle: &'static [u8], within: usize },
}

impl Matcher {
    fn matches(&self, header: &[u8]) -> bool {
        match *self {
            Matcher::Prefix(magic) => header.starts_with(magic),
            Matcher::Contains { needle, within } => {
                let window = &header[..header.len().min(within)];
                memmem::find(window, needle).is_some()
            }
        }
    }
}

/// Ordered signature table; first match wins.
const SIGNATURES: &[(Matcher, FirmwareType)] = &[
    (Matcher::Prefix(b"PK\x03\x04"), FirmwareType::Archive),
    (Matcher::Prefix(b"\x7fELF"), FirmwareType::Executable),
    (Matcher::Prefix(b"dex\n"), FirmwareType::AndroidDex),
    (Matcher::Prefix(b"ANDROID!"), FirmwareType::AndroidBootImage),
    (Matcher::Contains { needle: b"uImage", within: 64 }, FirmwareType::BootLoaderImage),
    (Matcher::Prefix(b"\x1f\x8b"), FirmwareType::Gzip),
    (Matcher::Prefix(b"BZh"), FirmwareType::Bzip2),
    (Matcher::Prefix(b"\xfd7zXZ"), FirmwareType::Xz),
    (Matcher::Prefix(b"LZMA"), FirmwareType::Lzma),
];

/// Classify a blob from its leading bytes. Never fails; unmatched input is `Unknown`.
pub fn classify(header: &[u8]) -> FirmwareType {
    let header = &header[..header.len().min(SIGNATURE_WINDOW)];
    SIGNATURES
        .iter()
        .find(|(matcher, _)| matcher.matches(header))
        .map(|(_, kind)| *kind)
        .unwrap_or(FirmwareType::Unknown)
}

/// Read at most [`SIGNATURE_WINDOW`] bytes from `path` and classify them.
pub fn classify_path(path: &Path) -> std::io::Result<FirmwareType> {
    let mut header = Vec::with_capacity(SIGNATURE_WINDOW);
    File::open(path)?.take(SIGNATURE_WINDOW as u64).read_to_end(&mut header)?;
    Ok(classify(&header))
}
