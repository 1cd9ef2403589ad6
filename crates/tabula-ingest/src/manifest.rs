//! Manifest of active schema descriptions.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tabula_model::{InputDefinition, OutputDefinition, SchemaCatalog, SchemaError};

use crate::error::{FileKind, IngestError, Result};

/// File name of the manifest inside the configuration directory.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

fn default_active() -> bool {
    true
}

/// One listed schema description.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestEntry {
    #[serde(default = "default_active")]
    pub active: bool,
    /// Path of the description, relative to the configuration directory.
    #[serde(alias = "descriptionFile")]
    pub description_file: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    inputs: Option<Vec<ManifestEntry>>,
    outputs: Option<Vec<ManifestEntry>>,
}

/// Listing of input and output descriptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub inputs: Vec<ManifestEntry>,
    pub outputs: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn active_inputs(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.inputs.iter().filter(|entry| entry.active)
    }

    pub fn active_outputs(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.outputs.iter().filter(|entry| entry.active)
    }
}

/// Reads `manifest.json` from the configuration directory.
pub fn load_manifest(config_dir: &Path) -> Result<Manifest> {
    let path = config_dir.join(MANIFEST_FILE_NAME);
    let text = std::fs::read_to_string(&path)
        .map_err(|e| IngestError::from_io(FileKind::Manifest, &path, e))?;
    let entity = format!("manifest {}", path.display());
    let raw: RawManifest = serde_json::from_str(&text).map_err(|e| SchemaError::Malformed {
        entity: entity.clone(),
        message: e.to_string(),
    })?;
    match (raw.inputs, raw.outputs) {
        (Some(inputs), Some(outputs)) => Ok(Manifest { inputs, outputs }),
        (inputs, outputs) => {
            let mut fields = Vec::new();
            if inputs.is_none() {
                fields.push("inputs".to_string());
            }
            if outputs.is_none() {
                fields.push("outputs".to_string());
            }
            Err(SchemaError::MissingFields { entity, fields }.into())
        }
    }
}

/// Loads every active description listed in the manifest and assembles the
/// catalog. Inactive entries are skipped without reading their files.
pub fn load_catalog(config_dir: &Path) -> Result<SchemaCatalog> {
    let manifest = load_manifest(config_dir)?;

    let inputs = manifest
        .active_inputs()
        .map(|entry| InputDefinition::from_json_file(&config_dir.join(&entry.description_file)))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let outputs = manifest
        .active_outputs()
        .map(|entry| OutputDefinition::from_json_file(&config_dir.join(&entry.description_file)))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let skipped = manifest.inputs.len() + manifest.outputs.len() - inputs.len() - outputs.len();
    tracing::debug!(
        config_dir = %config_dir.display(),
        inputs = inputs.len(),
        outputs = outputs.len(),
        skipped,
        "loaded manifest"
    );
    Ok(SchemaCatalog::new(inputs, outputs)?)
}
