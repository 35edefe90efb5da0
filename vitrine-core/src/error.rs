/// Error type shared by the loader, the OBJ decoder and the config layer
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    /// A static asset could not be fetched or decoded by the host
    #[error("failed to load {url}: {reason}")]
    AssetLoad { url: String, reason: String },

    #[error("OBJ line {line}: {reason}")]
    MeshParse { line: usize, reason: String },

    #[error("mesh contains no faces")]
    EmptyMesh,

    #[error("invalid viewer config: {0}")]
    Config(#[from] serde_json::Error),
}

impl ViewerError {
    pub fn asset_load(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AssetLoad {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;
