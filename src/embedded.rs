use indexmap::IndexMap;
use serde::Deserialize;
use std::fs::File;
use std::io::{ self, Read, Write };
use std::path::Path;
use zip::ZipArchive;
use crate::artifact::{ ArtifactInfo, Dependency };
use crate::error::LicenseError;
use crate::store::LicenseStore;

// Entries a vendor archive carries its bundled licenses in
pub const LICENSE_INDEX_ENTRY: &str = "third_party_licenses.json";
pub const LICENSE_TEXT_ENTRY: &str = "third_party_licenses.txt";

/// Where one license sits inside the text entry. `length <= 0` means "to the end".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EmbeddedRange {
    pub start: u64,
    pub length: i64,
}

pub type EmbeddedIndex = IndexMap<String, EmbeddedRange>;

/// Copy the licenses bundled inside `archive_path` into the store.
///
/// Returns how many new attributions were recorded. An archive without both
/// bundle entries simply has no embedded licenses.
pub fn extract_embedded_licenses<W: Write>(
    artifact: &ArtifactInfo,
    archive_path: &Path,
    store: &mut LicenseStore<W>
) -> Result<usize, LicenseError> {
    let read_error = |source: io::Error| LicenseError::EmbeddedRead {
        path: archive_path.to_path_buf(),
        source,
    };

    let file = File::open(archive_path).map_err(read_error)?;
    let mut archive = ZipArchive::new(file).map_err(|e| read_error(e.into()))?;

    if !has_entry(&archive, LICENSE_INDEX_ENTRY) || !has_entry(&archive, LICENSE_TEXT_ENTRY) {
        log::debug!("{}: no embedded license bundle in {}", artifact, archive_path.display());
        return Ok(0);
    }

    let index = read_index(&mut archive).map_err(|e| {
        match e {
            IndexError::Io(source) => read_error(source),
            IndexError::Format(source) =>
                LicenseError::EmbeddedIndex {
                    path: archive_path.to_path_buf(),
                    source,
                },
        }
    })?;

    let mut added = 0;
    for (key, range) in &index {
        if store.contains(key) {
            continue;
        }

        let text = {
            let entry = archive.by_name(LICENSE_TEXT_ENTRY).map_err(|e| read_error(e.into()))?;
            read_range(entry, *range).map_err(read_error)?
        };

        let dependency = Dependency::new(key.clone(), key.clone(), artifact, key.clone());
        store
            .append(&dependency, &text)
            .map_err(|source| LicenseError::Output { what: "license pack", source })?;
        added += 1;
    }

    log::debug!("{}: {} embedded licenses, {} new", artifact, index.len(), added);
    Ok(added)
}

enum IndexError {
    Io(io::Error),
    Format(serde_json::Error),
}

fn has_entry(archive: &ZipArchive<File>, name: &str) -> bool {
    archive.file_names().any(|entry| entry == name)
}

fn read_index(archive: &mut ZipArchive<File>) -> Result<EmbeddedIndex, IndexError> {
    let mut content = Vec::new();
    archive
        .by_name(LICENSE_INDEX_ENTRY)
        .map_err(|e| IndexError::Io(e.into()))?
        .read_to_end(&mut content)
        .map_err(IndexError::Io)?;

    serde_json::from_slice(&content).map_err(IndexError::Format)
}

/// Skip `range.start` bytes, then read `range.length` bytes (or everything left)
pub fn read_range<R: Read>(mut reader: R, range: EmbeddedRange) -> io::Result<Vec<u8>> {
    let skipped = io::copy(&mut reader.by_ref().take(range.start), &mut io::sink())?;
    if skipped < range.start {
        return Err(
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("license text ends at byte {}, before offset {}", skipped, range.start)
            )
        );
    }

    let mut text = Vec::new();
    if range.length <= 0 {
        reader.read_to_end(&mut text)?;
    } else {
        // Grow with the bytes actually present; the index's length is untrusted
        let wanted = range.length as u64;
        reader.take(wanted).read_to_end(&mut text)?;
        if (text.len() as u64) < wanted {
            return Err(
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "license text has {} bytes after offset {}, index claims {}",
                        text.len(),
                        range.start,
                        wanted
                    )
                )
            );
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn write_archive(path: &Path, entries: &[(&str, &[u8])]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        for (name, content) in entries {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap();
    }

    fn artifact() -> ArtifactInfo {
        ArtifactInfo::new("com.google.android.gms", "play-services-base", "17.0.0")
    }

    const TEXT: &[u8] = b"Apache License text\nMIT License text";

    #[test]
    fn test_read_range() {
        let range = EmbeddedRange { start: 20, length: 16 };
        assert_eq!(read_range(Cursor::new(TEXT), range).unwrap(), b"MIT License text".to_vec());

        let to_end = EmbeddedRange { start: 20, length: 0 };
        assert_eq!(read_range(Cursor::new(TEXT), to_end).unwrap(), b"MIT License text".to_vec());

        let negative = EmbeddedRange { start: 0, length: -1 };
        assert_eq!(read_range(Cursor::new(TEXT), negative).unwrap(), TEXT.to_vec());
    }

    #[test]
    fn test_read_range_past_end_fails() {
        let too_long = EmbeddedRange { start: 20, length: 100 };
        assert!(read_range(Cursor::new(TEXT), too_long).is_err());

        let bad_start = EmbeddedRange { start: 500, length: 1 };
        let err = read_range(Cursor::new(TEXT), bad_start).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_extracts_bundled_licenses() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("base.aar");
        let index =
            br#"{"Apache": {"start": 0, "length": 19}, "MIT": {"start": 20, "length": 16}, "MIT copy": {"start": 20, "length": 16}}"#;
        write_archive(&path, &[(LICENSE_INDEX_ENTRY, index), (LICENSE_TEXT_ENTRY, TEXT)]);

        let mut store = LicenseStore::new(Vec::new());
        let added = extract_embedded_licenses(&artifact(), &path, &mut store).unwrap();
        assert_eq!(added, 3);

        let lines: Vec<String> = store.metadata_lines().collect();
        assert_eq!(lines, vec!["0:19 Apache", "20:16 MIT", "20:16 MIT copy"]);
        assert_eq!(store.get("MIT").map(|e| e.display_name.as_str()), Some("MIT"));

        let contents = store.finish().unwrap();
        assert_eq!(contents.pack, b"Apache License text\nMIT License text\n".to_vec());
        assert_eq!(contents.manifest[1].license_name, "MIT");
        assert_eq!(contents.manifest[1].version, "17.0.0");
    }

    #[test]
    fn test_skips_keys_already_stored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("base.aar");
        let index = br#"{"MIT": {"start": 20, "length": 16}}"#;
        write_archive(&path, &[(LICENSE_INDEX_ENTRY, index), (LICENSE_TEXT_ENTRY, TEXT)]);

        let mut store = LicenseStore::new(Vec::new());
        store.append(&Dependency::detached("MIT", "MIT"), b"earlier").unwrap();

        let added = extract_embedded_licenses(&artifact(), &path, &mut store).unwrap();
        assert_eq!(added, 0);
        assert_eq!(store.finish().unwrap().pack, b"earlier\n".to_vec());
    }

    #[test]
    fn test_missing_entries_are_not_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.jar");
        write_archive(&path, &[(LICENSE_TEXT_ENTRY, TEXT), ("classes.dex", b"dex")]);

        let mut store = LicenseStore::new(Vec::new());
        assert_eq!(extract_embedded_licenses(&artifact(), &path, &mut store).unwrap(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_out_of_range_slice_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrupt.aar");
        let index = br#"{"MIT": {"start": 30, "length": 100}}"#;
        write_archive(&path, &[(LICENSE_INDEX_ENTRY, index), (LICENSE_TEXT_ENTRY, TEXT)]);

        let mut store = LicenseStore::new(Vec::new());
        let err = extract_embedded_licenses(&artifact(), &path, &mut store).unwrap_err();
        assert!(matches!(err, LicenseError::EmbeddedRead { .. }));
    }

    #[test]
    fn test_huge_claimed_length_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("huge.aar");
        let index = br#"{"MIT": {"start": 0, "length": 9223372036854775807}}"#;
        write_archive(&path, &[(LICENSE_INDEX_ENTRY, index), (LICENSE_TEXT_ENTRY, b"MIT")]);

        let mut store = LicenseStore::new(Vec::new());
        let err = extract_embedded_licenses(&artifact(), &path, &mut store).unwrap_err();
        assert!(matches!(err, LicenseError::EmbeddedRead { .. }));
        assert_eq!(store.len(), 0);

        let range = EmbeddedRange { start: 0, length: i64::MAX };
        let err = read_range(Cursor::new(b"MIT"), range).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_malformed_index_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad-index.aar");
        let index = br#"{"MIT": {"begin": 0}}"#;
        write_archive(&path, &[(LICENSE_INDEX_ENTRY, index), (LICENSE_TEXT_ENTRY, TEXT)]);

        let mut store = LicenseStore::new(Vec::new());
        let err = extract_embedded_licenses(&artifact(), &path, &mut store).unwrap_err();
        assert!(matches!(err, LicenseError::EmbeddedIndex { .. }));
    }

    #[test]
    fn test_unreadable_archive_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("not-a-zip.aar");
        std::fs::write(&path, b"definitely not a zip").unwrap();

        let mut store = LicenseStore::new(Vec::new());
        let err = extract_embedded_licenses(&artifact(), &path, &mut store).unwrap_err();
        assert!(matches!(err, LicenseError::EmbeddedRead { .. }));
    }
}
