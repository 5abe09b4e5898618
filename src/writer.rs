use std::io::{ self, Write };
use crate::artifact::ExtendedArtifactInfo;
use crate::error::LicenseError;
use crate::store::{ MetadataEntry, LINE_SEPARATOR };

/// Write one `offset:length displayName` line per entry, in order
pub fn write_metadata<W: Write>(out: &mut W, entries: &[MetadataEntry]) -> io::Result<()> {
    for entry in entries {
        out.write_all(entry.to_line().as_bytes())?;
        out.write_all(LINE_SEPARATOR.as_bytes())?;
    }
    out.flush()
}

/// Write the enriched dependency manifest as pretty-printed JSON
pub fn write_manifest<W: Write>(
    out: &mut W,
    manifest: &[ExtendedArtifactInfo]
) -> Result<(), LicenseError> {
    serde_json::to_writer_pretty(&mut *out, manifest).map_err(LicenseError::Manifest)?;
    out.flush().map_err(|source| LicenseError::Output { what: "dependency manifest", source })
}
