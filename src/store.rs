use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::io::{ self, Write };
use crate::artifact::{ Dependency, ExtendedArtifactInfo };

/// Delimiter written after every text in the pack. Not part of any entry's range.
pub const LINE_SEPARATOR: &str = "\n";

/// Byte range of one license text inside the pack, rendered as `offset:length`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LicenseRef {
    pub offset: u64,
    pub length: u64,
}

impl fmt::Display for LicenseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.offset, self.length)
    }
}

/// One line of the metadata index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    pub license: LicenseRef,
    pub display_name: String,
}

impl MetadataEntry {
    /// `offset:length displayName`
    pub fn to_line(&self) -> String {
        format!("{} {}", self.license, self.display_name)
    }
}

/// Accumulates license texts, storing each distinct text once.
///
/// Texts are written to `pack` as they arrive; offsets are never rewritten.
pub struct LicenseStore<W: Write> {
    pack: W,
    cursor: u64,
    offsets: HashMap<Vec<u8>, LicenseRef>, // exact text bytes -> range in pack
    entries: IndexMap<String, MetadataEntry>, // dedup key -> metadata line, insertion ordered
    manifest: Vec<ExtendedArtifactInfo>,
}

/// Everything the store accumulated, handed to the writer
pub struct StoreContents<W> {
    pub pack: W,
    pub pack_len: u64,
    pub entries: Vec<MetadataEntry>,
    pub manifest: Vec<ExtendedArtifactInfo>,
    pub distinct_texts: usize,
}

impl<W: Write> LicenseStore<W> {
    pub fn new(pack: W) -> Self {
        LicenseStore {
            pack,
            cursor: 0,
            offsets: HashMap::new(),
            entries: IndexMap::new(),
            manifest: Vec::new(),
        }
    }

    /// Record `text` as the license of `dependency`.
    ///
    /// A key that is already stored keeps its first license and nothing changes.
    pub fn append(&mut self, dependency: &Dependency, text: &[u8]) -> io::Result<LicenseRef> {
        if let Some(existing) = self.entries.get(&dependency.key) {
            return Ok(existing.license);
        }

        let license = match self.offsets.get(text) {
            Some(license) => *license,
            None => self.write_text(&dependency.key, text)?,
        };

        self.entries.insert(dependency.key.clone(), MetadataEntry {
            license,
            display_name: dependency.display_name.clone(),
        });
        self.manifest.push(dependency.to_extended());

        Ok(license)
    }

    fn write_text(&mut self, key: &str, text: &[u8]) -> io::Result<LicenseRef> {
        if let Err(e) = std::str::from_utf8(text) {
            log::warn!("License text for {} is not valid UTF-8 ({}), storing it as raw bytes", key, e);
        }

        let license = LicenseRef {
            offset: self.cursor,
            length: text.len() as u64,
        };

        self.pack.write_all(text)?;
        self.pack.write_all(LINE_SEPARATOR.as_bytes())?;
        self.cursor += (text.len() + LINE_SEPARATOR.len()) as u64;
        self.offsets.insert(text.to_vec(), license);

        Ok(license)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&MetadataEntry> {
        self.entries.get(key)
    }

    /// Number of attributions recorded
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn distinct_texts(&self) -> usize {
        self.offsets.len()
    }

    /// Bytes written to the pack so far, separators included
    pub fn pack_len(&self) -> u64 {
        self.cursor
    }

    /// Metadata lines in insertion order
    #[cfg(test)]
    pub fn metadata_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.entries.values().map(MetadataEntry::to_line)
    }

    #[cfg(test)]
    pub fn manifest(&self) -> &[ExtendedArtifactInfo] {
        &self.manifest
    }

    /// Flush the pack and hand back everything accumulated
    pub fn finish(mut self) -> io::Result<StoreContents<W>> {
        self.pack.flush()?;
        Ok(StoreContents {
            pack: self.pack,
            pack_len: self.cursor,
            distinct_texts: self.offsets.len(),
            entries: self.entries.into_values().collect(),
            manifest: self.manifest,
        })
    }
}
