use serde::Deserialize;
use std::fs;
use std::path::Path;
use crate::artifact::{ ArtifactInfo, Dependency };
use crate::error::DescriptorError;

/// The parts of a POM that carry license information
#[derive(Debug, Default, Deserialize)]
pub struct Descriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub licenses: Option<DeclaredLicenses>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeclaredLicenses {
    #[serde(default, rename = "license")]
    pub entries: Vec<DeclaredLicense>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeclaredLicense {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Descriptor {
    pub fn parse(content: &str) -> Result<Self, quick_xml::DeError> {
        quick_xml::de::from_str(content)
    }

    pub fn declared_licenses(&self) -> &[DeclaredLicense] {
        self.licenses
            .as_ref()
            .map(|licenses| licenses.entries.as_slice())
            .unwrap_or(&[])
    }

    fn project_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// A license text ready to be handed to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    pub dependency: Dependency,
    pub text: Vec<u8>,
}

/// Read an artifact's descriptor and turn its declared licenses into attributions
pub fn read_attributions(
    artifact: &ArtifactInfo,
    path: &Path
) -> Result<Vec<Attribution>, DescriptorError> {
    let content = fs::read_to_string(path).map_err(|source| DescriptorError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let descriptor = Descriptor::parse(&content).map_err(|source| DescriptorError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if descriptor.declared_licenses().is_empty() {
        return Err(DescriptorError::NoLicenses { path: path.to_path_buf() });
    }

    Ok(attributions_for(artifact, &descriptor))
}

/// One attribution per declared license. The license URL is the text recorded in the pack.
pub fn attributions_for(artifact: &ArtifactInfo, descriptor: &Descriptor) -> Vec<Attribution> {
    let licenses = descriptor.declared_licenses();
    let multiple = licenses.len() > 1;
    let mut attributions = Vec::new();

    for license in licenses {
        let url = match license.url.as_deref().map(str::trim).filter(|url| !url.is_empty()) {
            Some(url) => url,
            None => {
                log::warn!(
                    "{}: license {:?} has no url, skipping it",
                    artifact,
                    license.name.as_deref().unwrap_or("<unnamed>")
                );
                continue;
            }
        };

        let license_name = license.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(url)
            .to_string();

        let key = if multiple {
            format!("{} {}", artifact.coordinates(), license_name)
        } else {
            artifact.coordinates()
        };

        let display_name = descriptor
            .project_name()
            .map(|name| name.to_string())
            .unwrap_or_else(|| key.clone());

        attributions.push(Attribution {
            dependency: Dependency::new(key, display_name, artifact, license_name),
            text: url.as_bytes().to_vec(),
        });
    }

    attributions
}
