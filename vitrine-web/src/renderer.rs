/// WebGL2 backend for the viewer
use std::collections::HashMap;

use js_sys::{Float32Array, Uint32Array};
use nalgebra::Matrix4;
use wasm_bindgen::JsValue;
use web_sys::{
    HtmlImageElement, WebGl2RenderingContext as Gl, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlTexture, WebGlUniformLocation, WebGlVertexArrayObject,
};

use vitrine_core::geometry::Mesh;
use vitrine_core::material::{MaterialId, Shading, Surface};
use vitrine_core::scene::{Fog, Light, LightRig, ParticleField};
use vitrine_core::{Camera, RenderBackend, Scene, TextureHandle};

use crate::shaders::{self, MAX_DIRECTIONAL_LIGHTS, MAX_POINT_LIGHTS};

/// position(3) + normal(3) + uv(2)
const MESH_STRIDE: usize = 8;

/// GPU copy of one surface's geometry
struct SurfaceBuffers {
    vao: WebGlVertexArrayObject,
    _vertices: WebGlBuffer,
    edges: WebGlBuffer,
    vertex_count: i32,
    edge_count: i32,
}

struct ParticleBuffers {
    vao: WebGlVertexArrayObject,
    _positions: WebGlBuffer,
    _colors: WebGlBuffer,
    count: i32,
}

/// Light rig flattened into uniform arrays
#[derive(Default)]
struct LightUniforms {
    ambient: [f32; 3],
    sky: [f32; 3],
    ground: [f32; 3],
    directional_direction: Vec<f32>,
    directional_color: Vec<f32>,
    point_position: Vec<f32>,
    point_color: Vec<f32>,
    point_range: Vec<f32>,
}

impl LightUniforms {
    fn pack(rig: &LightRig) -> Self {
        let mut packed = Self::default();
        let scaled = |color: &[f32; 3], intensity: f32| color.map(|c| c * intensity);

        for light in &rig.lights {
            match light {
                Light::Ambient { color, intensity } => {
                    let c = scaled(color, *intensity);
                    for i in 0..3 {
                        packed.ambient[i] += c[i];
                    }
                }
                Light::Directional {
                    color,
                    intensity,
                    position,
                } => {
                    if packed.directional_color.len() / 3 >= MAX_DIRECTIONAL_LIGHTS {
                        continue;
                    }
                    let direction = position.coords.normalize();
                    packed.directional_direction.extend_from_slice(direction.as_slice());
                    packed.directional_color.extend(scaled(color, *intensity));
                }
                Light::Point {
                    color,
                    intensity,
                    range,
                    position,
                } => {
                    if packed.point_range.len() >= MAX_POINT_LIGHTS {
                        continue;
                    }
                    packed.point_position.extend_from_slice(position.coords.as_slice());
                    packed.point_color.extend(scaled(color, *intensity));
                    packed.point_range.push(*range);
                }
                Light::Hemisphere { sky, ground, intensity } => {
                    packed.sky = scaled(sky, *intensity);
                    packed.ground = scaled(ground, *intensity);
                }
            }
        }
        packed
    }
}

pub struct WebRenderer {
    gl: Gl,
    mesh_program: WebGlProgram,
    points_program: WebGlProgram,
    uniforms: HashMap<&'static str, WebGlUniformLocation>,
    point_uniforms: HashMap<&'static str, WebGlUniformLocation>,
    textures: HashMap<TextureHandle, WebGlTexture>,
    next_texture: u32,
    surfaces: HashMap<MaterialId, SurfaceBuffers>,
    particles: Option<ParticleBuffers>,
    lights: Option<LightUniforms>,
    viewport: (i32, i32),
}

const MESH_UNIFORMS: &[&str] = &[
    "u_model",
    "u_view",
    "u_projection",
    "u_mode",
    "u_map",
    "u_color",
    "u_emissive",
    "u_emissive_intensity",
    "u_ambient",
    "u_hemisphere_sky",
    "u_hemisphere_ground",
    "u_directional_count",
    "u_directional_direction",
    "u_directional_color",
    "u_point_count",
    "u_point_position",
    "u_point_color",
    "u_point_range",
    "u_fog_color",
    "u_fog_near",
    "u_fog_far",
];

const POINT_UNIFORMS: &[&str] = &[
    "u_view",
    "u_projection",
    "u_size",
    "u_scale",
    "u_opacity",
    "u_fog_color",
    "u_fog_near",
    "u_fog_far",
];

impl WebRenderer {
    pub fn new(gl: Gl) -> Result<Self, JsValue> {
        let mesh_program = link_program(&gl, shaders::MESH_VERTEX, shaders::MESH_FRAGMENT)?;
        let points_program = link_program(&gl, shaders::POINTS_VERTEX, shaders::POINTS_FRAGMENT)?;
        let uniforms = locate_uniforms(&gl, &mesh_program, MESH_UNIFORMS);
        let point_uniforms = locate_uniforms(&gl, &points_program, POINT_UNIFORMS);

        gl.enable(Gl::DEPTH_TEST);
        gl.clear_color(0.0, 0.0, 0.0, 0.0);

        Ok(Self {
            gl,
            mesh_program,
            points_program,
            uniforms,
            point_uniforms,
            textures: HashMap::new(),
            next_texture: 0,
            surfaces: HashMap::new(),
            particles: None,
            lights: None,
            viewport: (1, 1),
        })
    }

    /// Backing-store size in device pixels
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width.max(1) as i32, height.max(1) as i32);
        self.gl.viewport(0, 0, self.viewport.0, self.viewport.1);
    }

    /// Upload a decoded image as a mipmapped, Y-flipped texture
    pub fn upload_texture(&mut self, image: &HtmlImageElement) -> Result<TextureHandle, JsValue> {
        let gl = &self.gl;
        let texture = gl
            .create_texture()
            .ok_or_else(|| JsValue::from_str("unable to create texture"))?;
        gl.bind_texture(Gl::TEXTURE_2D, Some(&texture));
        gl.pixel_storei(Gl::UNPACK_FLIP_Y_WEBGL, 1);
        gl.tex_image_2d_with_u32_and_u32_and_html_image_element(
            Gl::TEXTURE_2D,
            0,
            Gl::RGBA as i32,
            Gl::RGBA,
            Gl::UNSIGNED_BYTE,
            image,
        )?;
        gl.generate_mipmap(Gl::TEXTURE_2D);
        gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MIN_FILTER, Gl::LINEAR_MIPMAP_LINEAR as i32);
        gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MAG_FILTER, Gl::LINEAR as i32);
        gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_WRAP_S, Gl::REPEAT as i32);
        gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_WRAP_T, Gl::REPEAT as i32);
        gl.bind_texture(Gl::TEXTURE_2D, None);

        let handle = TextureHandle(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(handle, texture);
        Ok(handle)
    }

    fn surface_buffers(&mut self, id: MaterialId, mesh: &Mesh) -> Result<&SurfaceBuffers, JsValue> {
        if !self.surfaces.contains_key(&id) {
            let buffers = upload_mesh(&self.gl, mesh)?;
            log::debug!("uploaded surface '{}' ({} vertices)", mesh.name, buffers.vertex_count);
            self.surfaces.insert(id, buffers);
        }
        self.surfaces
            .get(&id)
            .ok_or_else(|| JsValue::from_str("surface buffers missing"))
    }

    fn draw_model(&mut self, scene: &Scene, camera: &Camera) -> Result<(), JsValue> {
        let Some(model) = &scene.model else {
            return Ok(());
        };
        if self.lights.is_none() {
            self.lights = Some(LightUniforms::pack(&scene.lights));
        }

        self.gl.use_program(Some(&self.mesh_program));
        self.set_mesh_frame_uniforms(&model.transform.matrix(), camera, &scene.fog);

        for surface in &model.surfaces {
            self.draw_surface(surface)?;
        }
        Ok(())
    }

    fn set_mesh_frame_uniforms(&self, model: &Matrix4<f32>, camera: &Camera, fog: &Fog) {
        let gl = &self.gl;
        let u = |name: &str| self.uniforms.get(name);

        gl.uniform_matrix4fv_with_f32_array(u("u_model"), false, model.as_slice());
        gl.uniform_matrix4fv_with_f32_array(u("u_view"), false, camera.view_matrix().as_slice());
        gl.uniform_matrix4fv_with_f32_array(u("u_projection"), false, camera.projection_matrix().as_slice());
        gl.uniform3fv_with_f32_array(u("u_fog_color"), &fog.color);
        gl.uniform1f(u("u_fog_near"), fog.near);
        gl.uniform1f(u("u_fog_far"), fog.far);

        if let Some(lights) = &self.lights {
            gl.uniform3fv_with_f32_array(u("u_ambient"), &lights.ambient);
            gl.uniform3fv_with_f32_array(u("u_hemisphere_sky"), &lights.sky);
            gl.uniform3fv_with_f32_array(u("u_hemisphere_ground"), &lights.ground);
            gl.uniform1i(u("u_directional_count"), (lights.directional_color.len() / 3) as i32);
            if !lights.directional_color.is_empty() {
                gl.uniform3fv_with_f32_array(u("u_directional_direction"), &lights.directional_direction);
                gl.uniform3fv_with_f32_array(u("u_directional_color"), &lights.directional_color);
            }
            gl.uniform1i(u("u_point_count"), lights.point_range.len() as i32);
            if !lights.point_range.is_empty() {
                gl.uniform3fv_with_f32_array(u("u_point_position"), &lights.point_position);
                gl.uniform3fv_with_f32_array(u("u_point_color"), &lights.point_color);
                gl.uniform1fv_with_f32_array(u("u_point_range"), &lights.point_range);
            }
        }
    }

    fn draw_surface(&mut self, surface: &Surface) -> Result<(), JsValue> {
        let material = &surface.material;
        match &material.shading {
            Shading::Unlit { map, color } => {
                let Some(texture) = self.textures.get(map) else {
                    log::warn!("texture {map:?} is not on the GPU, skipping surface");
                    return Ok(());
                };
                self.gl.active_texture(Gl::TEXTURE0);
                self.gl.bind_texture(Gl::TEXTURE_2D, Some(texture));
                self.gl.uniform1i(self.uniforms.get("u_map"), 0);
                self.gl.uniform1i(self.uniforms.get("u_mode"), 0);
                self.gl.uniform3fv_with_f32_array(self.uniforms.get("u_color"), color);
            }
            Shading::Emissive {
                color,
                emissive,
                emissive_intensity,
                ..
            } => {
                self.gl.uniform1i(self.uniforms.get("u_mode"), 1);
                self.gl.uniform3fv_with_f32_array(self.uniforms.get("u_color"), color);
                self.gl.uniform3fv_with_f32_array(self.uniforms.get("u_emissive"), emissive);
                self.gl.uniform1f(self.uniforms.get("u_emissive_intensity"), *emissive_intensity);
            }
        }

        let wireframe = material.wireframe;
        let gl = self.gl.clone();
        let buffers = self.surface_buffers(material.id(), &surface.mesh)?;
        gl.bind_vertex_array(Some(&buffers.vao));
        if wireframe {
            gl.bind_buffer(Gl::ELEMENT_ARRAY_BUFFER, Some(&buffers.edges));
            gl.draw_elements_with_i32(Gl::LINES, buffers.edge_count, Gl::UNSIGNED_INT, 0);
        } else {
            gl.draw_arrays(Gl::TRIANGLES, 0, buffers.vertex_count);
        }
        gl.bind_vertex_array(None);
        Ok(())
    }

    fn draw_particles(&mut self, field: &ParticleField, camera: &Camera, fog: &Fog) -> Result<(), JsValue> {
        if field.is_empty() {
            return Ok(());
        }
        if self.particles.is_none() {
            self.particles = Some(upload_particles(&self.gl, field)?);
        }
        let Some(particles) = &self.particles else {
            return Ok(());
        };

        let gl = &self.gl;
        let u = |name: &str| self.point_uniforms.get(name);
        gl.use_program(Some(&self.points_program));
        gl.uniform_matrix4fv_with_f32_array(u("u_view"), false, camera.view_matrix().as_slice());
        gl.uniform_matrix4fv_with_f32_array(u("u_projection"), false, camera.projection_matrix().as_slice());
        gl.uniform1f(u("u_size"), field.size);
        gl.uniform1f(u("u_scale"), self.viewport.1 as f32 / 2.0);
        gl.uniform1f(u("u_opacity"), field.opacity);
        gl.uniform3fv_with_f32_array(u("u_fog_color"), &fog.color);
        gl.uniform1f(u("u_fog_near"), fog.near);
        gl.uniform1f(u("u_fog_far"), fog.far);

        gl.enable(Gl::BLEND);
        gl.blend_func(Gl::SRC_ALPHA, Gl::ONE);
        gl.depth_mask(false);
        gl.bind_vertex_array(Some(&particles.vao));
        gl.draw_arrays(Gl::POINTS, 0, particles.count);
        gl.bind_vertex_array(None);
        gl.depth_mask(true);
        gl.disable(Gl::BLEND);
        Ok(())
    }
}

impl RenderBackend for WebRenderer {
    fn draw(&mut self, scene: &Scene, camera: &Camera) {
        self.gl.clear(Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT);

        if let Err(e) = self.draw_model(scene, camera) {
            log::error!("model draw failed: {e:?}");
        }
        if let Err(e) = self.draw_particles(&scene.particles, camera, &scene.fog) {
            log::error!("particle draw failed: {e:?}");
        }
    }
}

fn compile_shader(gl: &Gl, kind: u32, source: &str) -> Result<WebGlShader, JsValue> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| JsValue::from_str("unable to create shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        Err(JsValue::from_str(&format!("shader compile failed: {log}")))
    }
}

fn link_program(gl: &Gl, vertex: &str, fragment: &str) -> Result<WebGlProgram, JsValue> {
    let vertex = compile_shader(gl, Gl::VERTEX_SHADER, vertex)?;
    let fragment = compile_shader(gl, Gl::FRAGMENT_SHADER, fragment)?;
    let program = gl
        .create_program()
        .ok_or_else(|| JsValue::from_str("unable to create program"))?;
    gl.attach_shader(&program, &vertex);
    gl.attach_shader(&program, &fragment);
    gl.link_program(&program);

    if gl
        .get_program_parameter(&program, Gl::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        Err(JsValue::from_str(&format!("program link failed: {log}")))
    }
}

fn locate_uniforms(
    gl: &Gl,
    program: &WebGlProgram,
    names: &[&'static str],
) -> HashMap<&'static str, WebGlUniformLocation> {
    names
        .iter()
        .filter_map(|name| gl.get_uniform_location(program, name).map(|loc| (*name, loc)))
        .collect()
}

fn array_buffer(gl: &Gl, target: u32, data: &js_sys::Object) -> Result<WebGlBuffer, JsValue> {
    let buffer = gl
        .create_buffer()
        .ok_or_else(|| JsValue::from_str("unable to create buffer"))?;
    gl.bind_buffer(target, Some(&buffer));
    gl.buffer_data_with_array_buffer_view(target, data, Gl::STATIC_DRAW);
    Ok(buffer)
}

fn upload_mesh(gl: &Gl, mesh: &Mesh) -> Result<SurfaceBuffers, JsValue> {
    let mut vertices = Vec::with_capacity(mesh.triangles.len() * 3 * MESH_STRIDE);
    for triangle in &mesh.triangles {
        for vertex in &triangle.vertices {
            vertices.extend_from_slice(vertex.position.coords.as_slice());
            vertices.extend_from_slice(vertex.normal.as_slice());
            vertices.extend_from_slice(vertex.uv.coords.as_slice());
        }
    }
    let vertex_count = (vertices.len() / MESH_STRIDE) as u32;
    let edges: Vec<u32> = (0..vertex_count)
        .step_by(3)
        .flat_map(|i| [i, i + 1, i + 1, i + 2, i + 2, i])
        .collect();

    let vao = gl
        .create_vertex_array()
        .ok_or_else(|| JsValue::from_str("unable to create vertex array"))?;
    gl.bind_vertex_array(Some(&vao));

    let vertex_buffer = array_buffer(gl, Gl::ARRAY_BUFFER, &Float32Array::from(vertices.as_slice()))?;
    let stride = (MESH_STRIDE * 4) as i32;
    for (location, size, offset) in [(0u32, 3i32, 0i32), (1, 3, 12), (2, 2, 24)] {
        gl.enable_vertex_attrib_array(location);
        gl.vertex_attrib_pointer_with_i32(location, size, Gl::FLOAT, false, stride, offset);
    }
    gl.bind_vertex_array(None);

    let edge_buffer = array_buffer(gl, Gl::ELEMENT_ARRAY_BUFFER, &Uint32Array::from(edges.as_slice()))?;
    gl.bind_buffer(Gl::ELEMENT_ARRAY_BUFFER, None);

    Ok(SurfaceBuffers {
        vao,
        _vertices: vertex_buffer,
        edges: edge_buffer,
        vertex_count: vertex_count as i32,
        edge_count: edges.len() as i32,
    })
}

fn upload_particles(gl: &Gl, field: &ParticleField) -> Result<ParticleBuffers, JsValue> {
    let positions: Vec<f32> = field.positions.iter().flatten().copied().collect();
    let colors: Vec<f32> = field.colors.iter().flatten().copied().collect();

    let vao = gl
        .create_vertex_array()
        .ok_or_else(|| JsValue::from_str("unable to create vertex array"))?;
    gl.bind_vertex_array(Some(&vao));

    let position_buffer = array_buffer(gl, Gl::ARRAY_BUFFER, &Float32Array::from(positions.as_slice()))?;
    gl.enable_vertex_attrib_array(0);
    gl.vertex_attrib_pointer_with_i32(0, 3, Gl::FLOAT, false, 0, 0);

    let color_buffer = array_buffer(gl, Gl::ARRAY_BUFFER, &Float32Array::from(colors.as_slice()))?;
    gl.enable_vertex_attrib_array(1);
    gl.vertex_attrib_pointer_with_i32(1, 3, Gl::FLOAT, false, 0, 0);
    gl.bind_vertex_array(None);

    Ok(ParticleBuffers {
        vao,
        _positions: position_buffer,
        _colors: color_buffer,
        count: field.len() as i32,
    })
}

