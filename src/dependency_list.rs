use serde::Deserialize;
use indexmap::IndexSet;
use std::fs;
use std::path::Path;
use crate::artifact::{ ArtifactInfo, ABSENT_MARKER };
use crate::error::LicenseError;

// The collector writes either a list of records or the bare marker string
#[derive(Deserialize)]
#[serde(untagged)]
enum DependencyListFile {
    Records(Vec<ArtifactInfo>),
    Marker(String),
}

/// Read the resolved-dependency file produced by the dependency collector
pub fn read_dependency_list(path: &Path) -> Result<Vec<ArtifactInfo>, LicenseError> {
    let content = fs::read_to_string(path).map_err(|source| LicenseError::DependencyListIo {
        path: path.to_path_buf(),
        source,
    })?;

    parse_dependency_list(&content).map_err(|source| LicenseError::DependencyListFormat {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse the dependency list, collapsing duplicates but keeping first-seen order
pub fn parse_dependency_list(content: &str) -> Result<Vec<ArtifactInfo>, serde_json::Error> {
    let parsed: DependencyListFile = serde_json::from_str(content)?;

    let records = match parsed {
        DependencyListFile::Records(records) => records,
        DependencyListFile::Marker(marker) => {
            if marker != ABSENT_MARKER {
                return Err(
                    serde::de::Error::custom(
                        format!("expected a list of dependencies or \"{}\", got \"{}\"", ABSENT_MARKER, marker)
                    )
                );
            }
            vec![ArtifactInfo::absent()]
        }
    };

    let unique: IndexSet<ArtifactInfo> = records.into_iter().collect();
    Ok(unique.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_records_in_order() {
        let content =
            r#"[
            {"group": "com.b", "name": "second", "version": "2.0"},
            {"group": "com.a", "name": "first", "version": "1.0"},
            {"group": "com.b", "name": "second", "version": "2.0"}
        ]"#;
        let deps = parse_dependency_list(content).unwrap();
        assert_eq!(
            deps,
            vec![ArtifactInfo::new("com.b", "second", "2.0"), ArtifactInfo::new("com.a", "first", "1.0")]
        );
    }

    #[test]
    fn test_parse_absent_marker() {
        let deps = parse_dependency_list("\"absent\"").unwrap();
        assert_eq!(deps.len(), 1);
        assert!(deps[0].is_absent());

        let deps = parse_dependency_list(
            r#"[{"group": "absent", "name": "absent", "version": "absent"}]"#
        ).unwrap();
        assert!(deps[0].is_absent());
    }

    #[test]
    fn test_rejects_unknown_marker_and_bad_records() {
        assert!(parse_dependency_list("\"missing\"").is_err());
        assert!(parse_dependency_list(r#"[{"group": "g", "version": "1"}]"#).is_err());
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_dependency_list(Path::new("/nonexistent/deps.json")).unwrap_err();
        assert!(matches!(err, LicenseError::DependencyListIo { .. }));
    }
}
