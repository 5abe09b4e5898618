use crate::artifact::ArtifactInfo;

// Groups whose artifacts may carry an embedded license bundle
pub const VENDOR_GROUPS: [&str; 2] = ["com.google.android.gms", "com.google.firebase"];

// Suffix of the side artifact older vendor releases ship their licenses in
pub const LICENSE_ARTIFACT_SUFFIX: &str = "-license";

// First major version that embeds licenses in every artifact
pub const GRANULAR_BASE_VERSION: u64 = 14;

/// Which license sources to consult for one dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionPlan {
    pub read_descriptor: bool,
    pub extract_embedded: bool,
}

pub fn is_vendor_group(group: &str) -> bool {
    VENDOR_GROUPS.contains(&group)
}

pub fn is_license_artifact(artifact_id: &str) -> bool {
    artifact_id.ends_with(LICENSE_ARTIFACT_SUFFIX)
}

/// Whether a vendor release embeds its own licenses (major version >= 14).
///
/// Returns `None` when the first version component is not a number.
pub fn is_granular_version(version: &str) -> Option<bool> {
    let major = version.split('.').next()?.trim();
    major
        .parse::<u64>()
        .ok()
        .map(|major| major >= GRANULAR_BASE_VERSION)
}

/// Decide where the licenses of `artifact` come from
pub fn plan_for(artifact: &ArtifactInfo) -> ExtractionPlan {
    if !is_vendor_group(&artifact.group) {
        return ExtractionPlan {
            read_descriptor: true,
            extract_embedded: false,
        };
    }

    let license_artifact = is_license_artifact(&artifact.artifact_id);
    let granular = match is_granular_version(&artifact.version) {
        Some(granular) => granular,
        None => {
            log::warn!("{}: unrecognized version, treating it as pre-granular", artifact);
            false
        }
    };

    ExtractionPlan {
        read_descriptor: !license_artifact,
        extract_embedded: granular || license_artifact,
    }
}
