/// Asset bookkeeping: what gets fetched, what arrived, how far along we are
use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Deserialize;

use crate::config::AssetConfig;

/// Semantic role of a texture image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureSlot {
    Diffuse,
    Normal,
    Roughness,
    Metallic,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 4] = [
        TextureSlot::Diffuse,
        TextureSlot::Normal,
        TextureSlot::Roughness,
        TextureSlot::Metallic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TextureSlot::Diffuse => "diffuse",
            TextureSlot::Normal => "normal",
            TextureSlot::Roughness => "roughness",
            TextureSlot::Metallic => "metallic",
        }
    }
}

impl fmt::Display for TextureSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque id of a texture uploaded by the render backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Successfully loaded textures by slot. Missing slots are a valid state.
#[derive(Debug, Clone, Default)]
pub struct TextureSet {
    slots: HashMap<TextureSlot, TextureHandle>,
}

impl TextureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, slot: TextureSlot, handle: TextureHandle) {
        self.slots.insert(slot, handle);
    }

    pub fn get(&self, slot: TextureSlot) -> Option<TextureHandle> {
        self.slots.get(&slot).copied()
    }

    pub fn diffuse(&self) -> Option<TextureHandle> {
        self.get(TextureSlot::Diffuse)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Completed vs expected asset count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    expected: u32,
    completed: u32,
}

impl LoadProgress {
    pub fn new(expected: u32) -> Self {
        Self {
            expected: expected.max(1),
            completed: 0,
        }
    }

    pub fn expected(&self) -> u32 {
        self.expected
    }

    pub fn completed(&self) -> u32 {
        self.completed
    }

    /// Count one finished asset. Saturates at `expected`.
    fn record(&mut self) -> bool {
        if self.completed >= self.expected {
            return false;
        }
        self.completed += 1;
        true
    }

    pub fn fraction(&self) -> f64 {
        f64::from(self.completed) / f64::from(self.expected)
    }

    pub fn percent(&self) -> f64 {
        self.fraction() * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.expected
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetId {
    Mesh,
    Texture(TextureSlot),
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetId::Mesh => f.write_str("mesh"),
            AssetId::Texture(slot) => write!(f, "texture {slot}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub id: AssetId,
    pub url: String,
}

/// The fixed list of static assets fetched on page load
#[derive(Debug, Clone)]
pub struct AssetManifest {
    pub mesh_url: String,
    pub textures: Vec<(TextureSlot, String)>,
}

impl AssetManifest {
    /// A slot listed more than once keeps its first URL
    pub fn from_config(config: &AssetConfig) -> Self {
        let mut textures: Vec<(TextureSlot, String)> = Vec::with_capacity(config.textures.len());
        for source in &config.textures {
            if textures.iter().any(|(slot, _)| *slot == source.slot) {
                log::warn!("texture {} listed twice; ignoring {}", source.slot, source.url);
                continue;
            }
            textures.push((source.slot, source.url.clone()));
        }
        Self {
            mesh_url: config.mesh_url.clone(),
            textures,
        }
    }

    /// Textures first so the mesh callback sees as many of them as possible
    pub fn requests(&self) -> Vec<AssetRequest> {
        self.textures
            .iter()
            .map(|(slot, url)| AssetRequest {
                id: AssetId::Texture(*slot),
                url: url.clone(),
            })
            .chain(std::iter::once(AssetRequest {
                id: AssetId::Mesh,
                url: self.mesh_url.clone(),
            }))
            .collect()
    }

    pub fn expected_items(&self) -> u32 {
        self.textures.len() as u32 + 1
    }

    pub fn url_of(&self, id: AssetId) -> Option<&str> {
        match id {
            AssetId::Mesh => Some(&self.mesh_url),
            AssetId::Texture(slot) => self
                .textures
                .iter()
                .find(|(s, _)| *s == slot)
                .map(|(_, url)| url.as_str()),
        }
    }
}

/// Enforces one terminal outcome per asset and turns outcomes into progress
#[derive(Debug, Clone)]
pub struct AssetTracker {
    progress: LoadProgress,
    finished: HashSet<AssetId>,
}

impl AssetTracker {
    pub fn new(manifest: &AssetManifest) -> Self {
        Self {
            progress: LoadProgress::new(manifest.expected_items()),
            finished: HashSet::new(),
        }
    }

    /// Record a success or failure for `id`. Returns false, leaving progress
    /// untouched, if `id` already finished.
    pub fn complete(&mut self, id: AssetId) -> bool {
        if !self.finished.insert(id) {
            log::warn!("ignoring repeated completion for {id}");
            return false;
        }
        if !self.progress.record() {
            log::warn!("{id} finished but all {} expected assets are done", self.progress.expected());
        }
        true
    }

    pub fn is_finished(&self, id: AssetId) -> bool {
        self.finished.contains(&id)
    }

    pub fn progress(&self) -> LoadProgress {
        self.progress
    }
}
