use std::path::PathBuf;
use crate::artifact::ArtifactInfo;

// Archive extensions tried in order when locating an artifact's own file
pub const ARCHIVE_EXTENSIONS: [&str; 2] = ["aar", "jar"];

/// Locates the files that belong to a resolved dependency.
///
/// `None` means "not found", which callers treat as a normal outcome.
pub trait ArtifactResolver {
    /// Location of the dependency's descriptor (POM)
    fn descriptor(&self, artifact: &ArtifactInfo) -> Option<PathBuf>;

    /// Location of the dependency's own archive
    fn archive(&self, artifact: &ArtifactInfo) -> Option<PathBuf>;
}

/// Resolves files from one or more Maven-layout repository directories
pub struct MavenRepositoryResolver {
    roots: Vec<PathBuf>,
}

impl MavenRepositoryResolver {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        MavenRepositoryResolver { roots }
    }

    /// Relative directory of an artifact version, e.g. `com/example/lib/1.0`
    pub fn artifact_dir(artifact: &ArtifactInfo) -> PathBuf {
        let mut dir = PathBuf::new();
        for segment in artifact.group.split('.') {
            dir.push(segment);
        }
        dir.push(&artifact.artifact_id);
        dir.push(&artifact.version);
        dir
    }

    // First root holding the file wins
    fn find_file(&self, artifact: &ArtifactInfo, extension: &str) -> Option<PathBuf> {
        let file_name = format!("{}-{}.{}", artifact.artifact_id, artifact.version, extension);
        let relative = Self::artifact_dir(artifact).join(file_name);

        self.roots
            .iter()
            .map(|root| root.join(&relative))
            .find(|path| path.is_file())
    }
}

impl ArtifactResolver for MavenRepositoryResolver {
    fn descriptor(&self, artifact: &ArtifactInfo) -> Option<PathBuf> {
        self.find_file(artifact, "pom")
    }

    fn archive(&self, artifact: &ArtifactInfo) -> Option<PathBuf> {
        ARCHIVE_EXTENSIONS.iter().find_map(|extension| self.find_file(artifact, extension))
    }
}
