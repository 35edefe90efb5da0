/// Material assembly for the model's surfaces
use crate::geometry::Mesh;
use crate::loading::{TextureHandle, TextureSet};

/// Identity of a material instance; stays fixed for its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub enum Shading {
    /// Texture shown as-is, unaffected by lights
    Unlit { map: TextureHandle, color: [f32; 3] },
    /// Untextured fallback that glows white so the model stays visible
    Emissive {
        color: [f32; 3],
        emissive: [f32; 3],
        emissive_intensity: f32,
        metalness: f32,
        roughness: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    id: MaterialId,
    pub shading: Shading,
    pub wireframe: bool,
}

impl Material {
    pub fn id(&self) -> MaterialId {
        self.id
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.shading, Shading::Emissive { .. })
    }
}

/// One drawable part of the model with its own material
#[derive(Debug, Clone)]
pub struct Surface {
    pub mesh: Mesh,
    pub material: Material,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

#[derive(Debug, Default)]
pub struct MaterialAssembler {
    next_id: u32,
}

impl MaterialAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh material for the textures available right now. Only the
    /// diffuse slot is consumed.
    pub fn material_for(&mut self, textures: &TextureSet, wireframe: bool) -> Material {
        let shading = match textures.diffuse() {
            Some(map) => Shading::Unlit {
                map,
                color: [1.0, 1.0, 1.0],
            },
            None => Shading::Emissive {
                color: [1.0, 1.0, 1.0],
                emissive: [1.0, 1.0, 1.0],
                emissive_intensity: 1.0,
                metalness: 0.0,
                roughness: 1.0,
            },
        };
        let id = MaterialId(self.next_id);
        self.next_id += 1;
        Material {
            id,
            shading,
            wireframe,
        }
    }

    /// Give every mesh exactly one new material
    pub fn assemble(&mut self, meshes: Vec<Mesh>, textures: &TextureSet, wireframe: bool) -> Vec<Surface> {
        meshes
            .into_iter()
            .map(|mesh| Surface {
                mesh,
                material: self.material_for(textures, wireframe),
                cast_shadow: true,
                receive_shadow: true,
            })
            .collect()
    }
}

/// Flip the wireframe flag on existing materials without replacing them
pub fn set_wireframe(surfaces: &mut [Surface], on: bool) {
    for surface in surfaces {
        surface.material.wireframe = on;
    }
}
