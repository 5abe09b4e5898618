use serde::{ Serialize, Deserialize };
use std::fmt;

/// Identity of a resolved dependency
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactInfo {
    pub group: String,
    #[serde(rename = "name")]
    pub artifact_id: String,
    pub version: String,
}

// Marker written by the dependency collector when no dependency information exists
// for a build variant (debug builds, for instance)
pub const ABSENT_MARKER: &str = "absent";

impl ArtifactInfo {
    pub fn new(group: &str, artifact_id: &str, version: &str) -> Self {
        ArtifactInfo {
            group: group.to_string(),
            artifact_id: artifact_id.to_string(),
            version: version.to_string(),
        }
    }

    /// The sentinel meaning "no dependency information available"
    pub fn absent() -> Self {
        ArtifactInfo::new(ABSENT_MARKER, ABSENT_MARKER, ABSENT_MARKER)
    }

    pub fn is_absent(&self) -> bool {
        self.group == ABSENT_MARKER &&
            self.artifact_id == ABSENT_MARKER &&
            self.version == ABSENT_MARKER
    }

    /// `group:artifact`, the default dedup key
    pub fn coordinates(&self) -> String {
        format!("{}:{}", self.group, self.artifact_id)
    }
}

impl fmt::Display for ArtifactInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact_id, self.version)
    }
}

/// A single license attribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub key: String, // dedup identity, e.g. "g:a" or "g:a MIT"
    pub display_name: String,
    pub group: String,
    pub artifact_id: String,
    pub version: String,
    pub license_name: String,
}

impl Dependency {
    /// Create an attribution for an artifact
    pub fn new(
        key: String,
        display_name: String,
        artifact: &ArtifactInfo,
        license_name: String
    ) -> Self {
        Dependency {
            key,
            display_name,
            group: artifact.group.clone(),
            artifact_id: artifact.artifact_id.clone(),
            version: artifact.version.clone(),
            license_name,
        }
    }

    /// Attribution with no artifact behind it (placeholder entries)
    pub fn detached(key: &str, license_name: &str) -> Self {
        Dependency {
            key: key.to_string(),
            display_name: key.to_string(),
            group: String::new(),
            artifact_id: String::new(),
            version: String::new(),
            license_name: license_name.to_string(),
        }
    }

    pub fn to_extended(&self) -> ExtendedArtifactInfo {
        ExtendedArtifactInfo {
            group: self.group.clone(),
            artifact: self.artifact_id.clone(),
            version: self.version.clone(),
            display_name: self.display_name.clone(),
            license_name: self.license_name.clone(),
        }
    }
}

/// Manifest record pairing a dependency with its resolved license
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedArtifactInfo {
    pub group: String,
    pub artifact: String,
    pub version: String,
    pub display_name: String,
    pub license_name: String,
}
