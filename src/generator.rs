use std::fs::File;
use std::io::{ self, BufWriter, Write };
use std::path::{ Path, PathBuf };
use crate::artifact::{ ArtifactInfo, Dependency };
use crate::descriptor;
use crate::embedded;
use crate::error::LicenseError;
use crate::policy;
use crate::resolver::ArtifactResolver;
use crate::store::LicenseStore;
use crate::writer;

pub const ABSENT_LICENSE_KEY: &str = "Debug License Info";
pub const ABSENT_LICENSE_TEXT: &str =
    "Licenses are only provided in build variants (e.g. release) where dependency information is available.";

/// Where the three outputs go
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub licenses: Option<PathBuf>,
    pub metadata: PathBuf,
    pub manifest: PathBuf,
}

/// Counters from one pass over the dependency list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectStats {
    pub processed: usize,
    pub skipped: usize,
}

/// What a full run produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub dependencies: usize,
    pub skipped: usize,
    pub attributions: usize,
    pub distinct_texts: usize,
    pub pack_bytes: u64,
}

/// Feed every dependency's licenses into the store, in list order
pub fn collect_licenses<R: ArtifactResolver, W: Write>(
    dependencies: &[ArtifactInfo],
    resolver: &R,
    store: &mut LicenseStore<W>
) -> Result<CollectStats, LicenseError> {
    let mut stats = CollectStats::default();

    if dependencies.iter().any(ArtifactInfo::is_absent) {
        if dependencies.len() > 1 {
            return Err(LicenseError::AbsentMixedWithDependencies { count: dependencies.len() });
        }
        log::info!("No dependency information for this build, writing placeholder license");
        let placeholder = Dependency::detached(ABSENT_LICENSE_KEY, ABSENT_LICENSE_KEY);
        append(store, &placeholder, ABSENT_LICENSE_TEXT.as_bytes())?;
        return Ok(stats);
    }

    for artifact in dependencies {
        log::debug!("Processing {}", artifact);
        stats.processed += 1;

        let plan = policy::plan_for(artifact);

        if plan.read_descriptor && !add_descriptor_licenses(artifact, resolver, store)? {
            stats.skipped += 1;
        }

        if plan.extract_embedded {
            match resolver.archive(artifact) {
                Some(path) => {
                    embedded::extract_embedded_licenses(artifact, &path, store)?;
                }
                None => log::debug!("{}: archive not found, no embedded licenses", artifact),
            }
        }
    }

    Ok(stats)
}

// Returns false when the dependency had to be skipped
fn add_descriptor_licenses<R: ArtifactResolver, W: Write>(
    artifact: &ArtifactInfo,
    resolver: &R,
    store: &mut LicenseStore<W>
) -> Result<bool, LicenseError> {
    let path = match resolver.descriptor(artifact) {
        Some(path) => path,
        None => {
            log::warn!("{}: descriptor not found, no license recorded", artifact);
            return Ok(false);
        }
    };

    let attributions = match descriptor::read_attributions(artifact, &path) {
        Ok(attributions) => attributions,
        Err(e) => {
            log::warn!("{}: {}", artifact, e);
            return Ok(false);
        }
    };

    for attribution in &attributions {
        append(store, &attribution.dependency, &attribution.text)?;
    }
    Ok(!attributions.is_empty())
}

fn append<W: Write>(
    store: &mut LicenseStore<W>,
    dependency: &Dependency,
    text: &[u8]
) -> Result<(), LicenseError> {
    store
        .append(dependency, text)
        .map(|_| ())
        .map_err(|source| LicenseError::Output { what: "license pack", source })
}

/// Regenerate the pack, metadata index and manifest from scratch
pub fn generate<R: ArtifactResolver>(
    dependencies: &[ArtifactInfo],
    resolver: &R,
    outputs: &OutputPaths
) -> Result<Summary, LicenseError> {
    // All outputs are truncated up front so a failed run never leaves a valid-looking set
    let pack: Box<dyn Write> = match &outputs.licenses {
        Some(path) => Box::new(BufWriter::new(create(path, "license pack")?)),
        None => {
            log::error!("License output file is not defined, license texts will be discarded");
            Box::new(io::sink())
        }
    };
    let mut metadata = BufWriter::new(create(&outputs.metadata, "license metadata")?);
    let mut manifest = BufWriter::new(create(&outputs.manifest, "dependency manifest")?);

    let mut store = LicenseStore::new(pack);
    let stats = collect_licenses(dependencies, resolver, &mut store)?;
    if store.is_empty() {
        log::warn!("No licenses were recorded for {} dependencies", dependencies.len());
    }
    log::info!(
        "Recorded {} attributions sharing {} distinct license texts ({} bytes)",
        store.len(),
        store.distinct_texts(),
        store.pack_len()
    );

    let contents = store
        .finish()
        .map_err(|source| LicenseError::Output { what: "license pack", source })?;

    writer
        ::write_metadata(&mut metadata, &contents.entries)
        .map_err(|source| LicenseError::Output { what: "license metadata", source })?;
    writer::write_manifest(&mut manifest, &contents.manifest)?;

    Ok(Summary {
        dependencies: stats.processed,
        skipped: stats.skipped,
        attributions: contents.entries.len(),
        distinct_texts: contents.distinct_texts,
        pack_bytes: contents.pack_len,
    })
}

fn create(path: &Path, what: &'static str) -> Result<File, LicenseError> {
    File::create(path).map_err(|source| LicenseError::Output { what, source })
}
