use std::fs;
use std::path::Path;
use crate::error::{ IndexParseError, LicenseError };
use crate::store::LicenseRef;

/// A parsed metadata line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub license: LicenseRef,
    pub display_name: String,
}

/// Parse a metadata index back into entries
pub fn parse_index(content: &str) -> Result<Vec<IndexEntry>, IndexParseError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(number, line)| parse_line(line).map_err(|reason| IndexParseError { line: number + 1, reason }))
        .collect()
}

fn parse_line(line: &str) -> Result<IndexEntry, String> {
    let (range, display_name) = line
        .split_once(' ')
        .ok_or_else(|| format!("expected \"offset:length name\", got {:?}", line))?;
    let (offset, length) = range
        .split_once(':')
        .ok_or_else(|| format!("expected \"offset:length\", got {:?}", range))?;

    let offset = offset.parse::<u64>().map_err(|e| format!("bad offset {:?}: {}", offset, e))?;
    let length = length.parse::<u64>().map_err(|e| format!("bad length {:?}: {}", length, e))?;

    Ok(IndexEntry {
        license: LicenseRef { offset, length },
        display_name: display_name.to_string(),
    })
}

/// Bytes of one entry, or `None` if the range falls outside the pack
pub fn slice_license(pack: &[u8], license: LicenseRef) -> Option<&[u8]> {
    let start = usize::try_from(license.offset).ok()?;
    let end = start.checked_add(usize::try_from(license.length).ok()?)?;
    pack.get(start..end)
}

/// Check that every metadata entry addresses a range inside the pack
pub fn verify_outputs(pack_path: &Path, metadata_path: &Path) -> Result<usize, LicenseError> {
    let pack = fs::read(pack_path).map_err(|source| LicenseError::Output { what: "license pack", source })?;
    let metadata = fs::read_to_string(metadata_path).map_err(|source| LicenseError::Output {
        what: "license metadata",
        source,
    })?;

    let entries = parse_index(&metadata).map_err(|e| LicenseError::Verification(e.to_string()))?;
    for entry in &entries {
        if slice_license(&pack, entry.license).is_none() {
            return Err(
                LicenseError::Verification(
                    format!(
                        "{} points at {} but the pack is {} bytes",
                        entry.display_name,
                        entry.license,
                        pack.len()
                    )
                )
            );
        }
    }

    Ok(entries.len())
}
