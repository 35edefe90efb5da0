/// Vitrine Core - platform-independent logic for the showcase viewer
///
/// Asset bookkeeping, OBJ decoding, material and scene assembly, the
/// entrance sequence, orbit control and page-chrome decisions. Nothing in
/// here touches the browser; `vitrine-web` drives it.

pub mod chrome;
pub mod config;
pub mod entrance;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod loading;
pub mod material;
pub mod obj;
pub mod orbit;
pub mod projection;
pub mod scene;
pub mod transform;
pub mod viewer;

// Re-export commonly used types
pub use config::ViewerConfig;
pub use entrance::{EntranceEvent, EntrancePhase};
pub use error::{Result, ViewerError};
pub use geometry::{Mesh, Triangle, Vertex};
pub use interaction::{AnimationIcon, SceneControls};
pub use loading::{AssetId, LoadProgress, TextureHandle, TextureSlot};
pub use obj::parse_obj;
pub use projection::Camera;
pub use scene::Scene;
pub use transform::{ModelTransform, Transform};
pub use viewer::{MeshLoadReport, MeshOutcome, RenderBackend, Viewer};
