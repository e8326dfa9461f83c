//! Prototype loading: an asset file when one is configured, the procedural
//! model otherwise or when the file cannot be used.

use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::error::{PlacementError, PlacementResult};
use crate::model::Prototype;
use crate::types::AnimalKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    Procedural,
    /// Directory containing `<kind>.json` files.
    Dir(PathBuf),
}

impl AssetSource {
    pub fn from_dir(dir: Option<PathBuf>) -> Self {
        dir.map(AssetSource::Dir).unwrap_or(AssetSource::Procedural)
    }
}

/// Path of the asset file for `kind` inside `dir`.
pub fn asset_path(dir: &Path, kind: AnimalKind) -> PathBuf {
    dir.join(format!("{}.json", kind.name()))
}

/// Read and validate a prototype asset file.
pub fn read_prototype(path: &Path, kind: AnimalKind) -> PlacementResult<Prototype> {
    let text = std::fs::read_to_string(path)?;
    let prototype: Prototype = serde_json::from_str(&text)?;

    if prototype.kind != kind {
        return Err(PlacementError::AssetLoad {
            kind,
            reason: format!("{} describes a {}", path.display(), prototype.kind),
        });
    }
    if prototype.parts.is_empty() {
        return Err(PlacementError::AssetLoad {
            kind,
            reason: format!("{} has no parts", path.display()),
        });
    }
    Ok(prototype)
}

/// Load the prototype for `kind`, falling back to the procedural model if
/// the asset path fails.
pub fn load_prototype(kind: AnimalKind, source: &AssetSource) -> Prototype {
    match source {
        AssetSource::Procedural => Prototype::procedural(kind),
        AssetSource::Dir(dir) => {
            let path = asset_path(dir, kind);
            match read_prototype(&path, kind) {
                Ok(prototype) => {
                    debug!("Loaded {} from {}", kind, path.display());
                    prototype
                }
                Err(e) => {
                    let err = match e {
                        e @ PlacementError::AssetLoad { .. } => e,
                        other => PlacementError::AssetLoad {
                            kind,
                            reason: other.to_string(),
                        },
                    };
                    warn!("{}; using procedural model", err);
                    Prototype::procedural(kind)
                }
            }
        }
    }
}
