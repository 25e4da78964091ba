//! Directory fingerprints
//!
//! A fingerprint summarises one directory level: the ordered file names with
//! their sizes (or content digests), followed by the ordered subdirectory
//! names. Two levels with equal fingerprints are treated as identical and the
//! destination level is left alone.

use crate::scanner::DirectorySnapshot;
use std::borrow::Cow;
use std::ffi::OsStr;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;
use sticksync_types::{Error, FingerprintStrategy, Result};
use unicode_normalization::{is_nfc, UnicodeNormalization};

const FIELD_SEPARATOR: &[u8] = b"\0";
const DIRECTORIES_MARKER: &[u8] = b"\x1edirectories\0";

/// blake3 digest of one directory level
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering
    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..16])
    }
}

/// Computes [`Fingerprint`]s of directory snapshots
#[derive(Debug, Clone, Copy)]
pub struct Fingerprinter {
    strategy: FingerprintStrategy,
    normalize_unicode: bool,
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new(FingerprintStrategy::Size)
    }
}

impl Fingerprinter {
    /// Create a fingerprinter using NFC name normalization
    pub fn new(strategy: FingerprintStrategy) -> Self {
        Self {
            strategy,
            normalize_unicode: true,
        }
    }

    /// Enable or disable NFC normalization of names
    pub fn with_normalization(mut self, normalize_unicode: bool) -> Self {
        self.normalize_unicode = normalize_unicode;
        self
    }

    /// Configured strategy
    pub fn strategy(&self) -> FingerprintStrategy {
        self.strategy
    }

    /// Fingerprint one snapshot
    ///
    /// The input is sensitive to entry order: the same names listed in a
    /// different order produce a different fingerprint.
    pub fn fingerprint(&self, snapshot: &DirectorySnapshot) -> Result<Fingerprint> {
        let tag: &[u8] = match self.strategy {
            FingerprintStrategy::Size => b"size\0",
            FingerprintStrategy::Content => b"content\0",
        };
        let mut hasher = blake3::Hasher::new();
        hasher.update(tag);

        for file in snapshot.files() {
            hasher.update(&self.name_bytes(file.name()));
            hasher.update(FIELD_SEPARATOR);
            match self.strategy {
                FingerprintStrategy::Size => {
                    hasher.update(file.size().to_string().as_bytes());
                }
                FingerprintStrategy::Content => {
                    let digest = content_digest(&snapshot.path_of(file))?;
                    hasher.update(digest.as_bytes());
                }
            }
            hasher.update(FIELD_SEPARATOR);
        }

        hasher.update(DIRECTORIES_MARKER);
        for directory in snapshot.directories() {
            hasher.update(&self.name_bytes(directory.name()));
            hasher.update(FIELD_SEPARATOR);
        }

        Ok(Fingerprint(*hasher.finalize().as_bytes()))
    }

    /// Whether a file already at `candidate` can stand in for `source`
    ///
    /// Sizes must match; the content strategy additionally compares digests.
    pub fn same_file(&self, source: &Path, source_size: u64, candidate: &Path) -> Result<bool> {
        let metadata = match std::fs::metadata(candidate) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(Error::from_io(e, candidate)),
        };
        if metadata.is_dir() || metadata.len() != source_size {
            return Ok(false);
        }

        match self.strategy {
            FingerprintStrategy::Size => Ok(true),
            FingerprintStrategy::Content => {
                Ok(content_digest(source)? == content_digest(candidate)?)
            }
        }
    }

    /// Name as it enters the fingerprint; NFC when normalization is on
    pub(crate) fn name_bytes<'a>(&self, name: &'a OsStr) -> Cow<'a, [u8]> {
        match name.to_str() {
            Some(text) if self.normalize_unicode && !is_nfc(text) => {
                Cow::Owned(text.nfc().collect::<String>().into_bytes())
            }
            Some(text) => Cow::Borrowed(text.as_bytes()),
            None => Cow::Borrowed(name.as_encoded_bytes()),
        }
    }
}

fn content_digest(path: &Path) -> Result<blake3::Hash> {
    let mut file = File::open(path).map_err(|e| Error::from_io(e, path))?;
    let mut hasher = blake3::Hasher::new();
    io::copy(&mut file, &mut hasher).map_err(|e| Error::from_io(e, path))?;
    Ok(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{DirectoryScanner, Entry};
    use proptest::prelude::*;
    use sticksync_types::EntryKind;
    use tempfile::TempDir;

    fn file(name: &str, size: u64) -> Entry {
        Entry::new(name, EntryKind::File, size)
    }

    fn dir(name: &str) -> Entry {
        Entry::new(name, EntryKind::Directory, 0)
    }

    fn fp(entries: Vec<Entry>) -> Fingerprint {
        Fingerprinter::default()
            .fingerprint(&DirectorySnapshot::from_entries("/level", entries))
            .unwrap()
    }

    #[test]
    fn test_equal_listings_match() {
        let a = fp(vec![file("01.mp3", 5_000_000), dir("Bonus")]);
        let b = fp(vec![dir("Bonus"), file("01.mp3", 5_000_000)]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_size_change_is_detected() {
        let before = fp(vec![file("track05.mp3", 5_000_000)]);
        let after = fp(vec![file("track05.mp3", 6_000_000)]);
        assert_ne!(before, after);
    }

    #[test]
    fn test_rename_is_detected() {
        assert_ne!(fp(vec![dir("b")]), fp(vec![dir("z")]));
    }

    #[test]
    fn test_file_and_directory_with_same_name_differ() {
        assert_ne!(fp(vec![file("x", 0)]), fp(vec![dir("x")]));
    }

    #[test]
    fn test_field_boundaries_are_unambiguous() {
        // "a1" + size 23 versus "a12" + size 3
        assert_ne!(fp(vec![file("a1", 23)]), fp(vec![file("a12", 3)]));
    }

    #[test]
    fn test_empty_directory_is_stable() {
        assert_eq!(fp(Vec::new()), fp(Vec::new()));
        assert_eq!(fp(Vec::new()).to_hex().len(), 64);
    }

    #[test]
    fn test_unicode_normalization() {
        let composed = "caf\u{e9}.mp3";
        let decomposed = "cafe\u{301}.mp3";

        assert_eq!(fp(vec![file(composed, 1)]), fp(vec![file(decomposed, 1)]));

        let raw = Fingerprinter::default().with_normalization(false);
        let left = raw
            .fingerprint(&DirectorySnapshot::from_entries("/l", vec![file(composed, 1)]))
            .unwrap();
        let right = raw
            .fingerprint(&DirectorySnapshot::from_entries("/l", vec![file(decomposed, 1)]))
            .unwrap();
        assert_ne!(left, right);
    }

    #[test]
    fn test_content_strategy_sees_same_size_edits() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::write(root.join("song.mp3"), b"aaaa").unwrap();

        let scanner = DirectoryScanner::default();
        let content = Fingerprinter::new(FingerprintStrategy::Content);
        let size = Fingerprinter::new(FingerprintStrategy::Size);

        let content_before = content.fingerprint(&scanner.scan(root).unwrap()).unwrap();
        let size_before = size.fingerprint(&scanner.scan(root).unwrap()).unwrap();

        std::fs::write(root.join("song.mp3"), b"bbbb").unwrap();

        let content_after = content.fingerprint(&scanner.scan(root).unwrap()).unwrap();
        let size_after = size.fingerprint(&scanner.scan(root).unwrap()).unwrap();

        assert_ne!(content_before, content_after);
        assert_eq!(size_before, size_after);
        assert_ne!(content_before, size_before);
    }

    #[test]
    fn test_same_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::write(root.join("a"), b"1234").unwrap();
        std::fs::write(root.join("b"), b"5678").unwrap();
        std::fs::write(root.join("c"), b"12345").unwrap();

        let size = Fingerprinter::new(FingerprintStrategy::Size);
        let content = Fingerprinter::new(FingerprintStrategy::Content);

        assert!(size.same_file(&root.join("a"), 4, &root.join("b")).unwrap());
        assert!(!content.same_file(&root.join("a"), 4, &root.join("b")).unwrap());
        assert!(!size.same_file(&root.join("a"), 4, &root.join("c")).unwrap());
        assert!(!size.same_file(&root.join("a"), 4, &root.join("missing")).unwrap());
    }

    #[test]
    fn test_case_tie_order_matters() {
        // Stable sort keeps the listing order of names that only differ in case
        let upper_first = fp(vec![file("A.mp3", 1), file("a.mp3", 2)]);
        let lower_first = fp(vec![file("a.mp3", 2), file("A.mp3", 1)]);
        assert_ne!(upper_first, lower_first);
    }

    proptest! {
        #[test]
        fn prop_listing_order_does_not_matter(
            names in proptest::collection::btree_set("[a-z]{1,8}", 1..8)
        ) {
            let names: Vec<String> = names.into_iter().collect();
            let forward: Vec<Entry> = names.iter().map(|n| file(n, n.len() as u64)).collect();
            let mut backward = forward.clone();
            backward.reverse();

            prop_assert_eq!(fp(forward), fp(backward));
        }

        #[test]
        fn prop_any_size_change_is_detected(
            sizes in proptest::collection::vec(0u64..10_000_000, 1..8),
            index in any::<proptest::sample::Index>(),
            delta in 1u64..1_000,
        ) {
            let entries = |sizes: &[u64]| -> Vec<Entry> {
                sizes
                    .iter()
                    .enumerate()
                    .map(|(i, size)| file(&format!("track{i:02}.mp3"), *size))
                    .collect()
            };

            let mut changed = sizes.clone();
            let i = index.index(changed.len());
            changed[i] += delta;

            prop_assert_ne!(fp(entries(&sizes)), fp(entries(&changed)));
        }
    }
}
