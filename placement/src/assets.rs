use std::path::PathBuf;

use log::debug;
use thiserror::Error;
use tobj::LoadOptions;

/// Extensions tried when resolving a model identifier, in preference order;
/// the first existing file wins.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["obj", "gltf", "glb"];

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("model '{0}' not found")]
    NotFound(String),
    #[error("model '{name}' has invalid format: {reason}")]
    InvalidFormat { name: String, reason: String },
}

/// A resolved, validated asset ready to hand to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAsset {
    pub path: PathBuf,
    /// Mesh count for formats parsed eagerly; zero for formats passed to the
    /// renderer unparsed.
    pub mesh_count: usize,
}

/// Resolves model identifiers to loadable 3D assets. Failures are typed,
/// never a panic.
pub trait AssetResolver {
    /// Path of the first existing file for `model` in extension preference
    /// order.
    fn resolve(&self, model: &str) -> Result<PathBuf, AssetError>;

    /// Resolves and validates the asset contents.
    fn load(&self, model: &str) -> Result<ResolvedAsset, AssetError>;

    fn exists(&self, model: &str) -> bool {
        self.resolve(model).is_ok()
    }
}

/// Resolver over a directory of model files.
pub struct DiskAssetResolver {
    root: PathBuf,
}

impl DiskAssetResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetResolver for DiskAssetResolver {
    fn resolve(&self, model: &str) -> Result<PathBuf, AssetError> {
        for ext in SUPPORTED_EXTENSIONS {
            let candidate = self.root.join(format!("{}.{}", model, ext));
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
        Err(AssetError::NotFound(model.to_string()))
    }

    fn load(&self, model: &str) -> Result<ResolvedAsset, AssetError> {
        let path = self.resolve(model)?;
        let mesh_count = match path.extension().and_then(|ext| ext.to_str()) {
            Some("obj") => {
                let (models, _materials) = tobj::load_obj(
                    &path,
                    &LoadOptions {
                        triangulate: true,
                        single_index: true,
                        ..Default::default()
                    },
                )
                .map_err(|err| AssetError::InvalidFormat {
                    name: model.to_string(),
                    reason: err.to_string(),
                })?;
                models.len()
            }
            // gltf/glb are decoded by the renderer
            _ => 0,
        };
        debug!("resolved model '{}' at {}", model, path.display());
        Ok(ResolvedAsset { path, mesh_count })
    }
}
