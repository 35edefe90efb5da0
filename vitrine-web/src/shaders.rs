/// GLSL ES 3.00 sources for the mesh and particle programs

pub const MAX_DIRECTIONAL_LIGHTS: usize = 8;
pub const MAX_POINT_LIGHTS: usize = 4;

pub const MESH_VERTEX: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec2 a_uv;

uniform mat4 u_model;
uniform mat4 u_view;
uniform mat4 u_projection;

out vec3 v_world_position;
out vec3 v_normal;
out vec2 v_uv;
out float v_view_depth;

void main() {
    vec4 world = u_model * vec4(a_position, 1.0);
    vec4 view = u_view * world;
    v_world_position = world.xyz;
    v_normal = mat3(u_model) * a_normal;
    v_uv = a_uv;
    v_view_depth = -view.z;
    gl_Position = u_projection * view;
}
"#;

pub const MESH_FRAGMENT: &str = r#"#version 300 es
precision highp float;

#define MAX_DIRECTIONAL 8
#define MAX_POINT 4

in vec3 v_world_position;
in vec3 v_normal;
in vec2 v_uv;
in float v_view_depth;

// 0: unlit texture, 1: lit with emissive
uniform int u_mode;
uniform sampler2D u_map;
uniform vec3 u_color;
uniform vec3 u_emissive;
uniform float u_emissive_intensity;

uniform vec3 u_ambient;
uniform vec3 u_hemisphere_sky;
uniform vec3 u_hemisphere_ground;
uniform int u_directional_count;
uniform vec3 u_directional_direction[MAX_DIRECTIONAL];
uniform vec3 u_directional_color[MAX_DIRECTIONAL];
uniform int u_point_count;
uniform vec3 u_point_position[MAX_POINT];
uniform vec3 u_point_color[MAX_POINT];
uniform float u_point_range[MAX_POINT];

uniform vec3 u_fog_color;
uniform float u_fog_near;
uniform float u_fog_far;

out vec4 out_color;

vec3 lit(vec3 albedo) {
    vec3 n = normalize(v_normal);
    float up = 0.5 * n.y + 0.5;
    vec3 light = u_ambient + mix(u_hemisphere_ground, u_hemisphere_sky, up);

    for (int i = 0; i < MAX_DIRECTIONAL; i++) {
        if (i >= u_directional_count) break;
        light += u_directional_color[i] * max(dot(n, u_directional_direction[i]), 0.0);
    }
    for (int i = 0; i < MAX_POINT; i++) {
        if (i >= u_point_count) break;
        vec3 to_light = u_point_position[i] - v_world_position;
        float falloff = clamp(1.0 - length(to_light) / u_point_range[i], 0.0, 1.0);
        light += u_point_color[i] * max(dot(n, normalize(to_light)), 0.0) * falloff * falloff;
    }
    return albedo * light + u_emissive * u_emissive_intensity;
}

void main() {
    vec3 color;
    if (u_mode == 0) {
        color = texture(u_map, v_uv).rgb * u_color;
    } else {
        color = lit(u_color);
    }
    float fog = clamp((v_view_depth - u_fog_near) / (u_fog_far - u_fog_near), 0.0, 1.0);
    out_color = vec4(mix(clamp(color, 0.0, 1.0), u_fog_color, fog), 1.0);
}
"#;

pub const POINTS_VERTEX: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_color;

uniform mat4 u_view;
uniform mat4 u_projection;
uniform float u_size;
uniform float u_scale;

out vec3 v_color;
out float v_view_depth;

void main() {
    vec4 view = u_view * vec4(a_position, 1.0);
    v_color = a_color;
    v_view_depth = -view.z;
    gl_PointSize = max(u_size * u_scale / v_view_depth, 1.0);
    gl_Position = u_projection * view;
}
"#;

pub const POINTS_FRAGMENT: &str = r#"#version 300 es
precision mediump float;

in vec3 v_color;
in float v_view_depth;

uniform float u_opacity;
uniform vec3 u_fog_color;
uniform float u_fog_near;
uniform float u_fog_far;

out vec4 out_color;

void main() {
    float fog = clamp((v_view_depth - u_fog_near) / (u_fog_far - u_fog_near), 0.0, 1.0);
    out_color = vec4(mix(v_color, u_fog_color, fog), u_opacity);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    const LINEAR_FOG: &str = "clamp((v_view_depth - u_fog_near) / (u_fog_far - u_fog_near), 0.0, 1.0)";

    #[test]
    fn test_fog_is_linear_in_view_depth() {
        for source in [MESH_FRAGMENT, POINTS_FRAGMENT] {
            assert!(source.contains(LINEAR_FOG));
            assert!(!source.contains("smoothstep"));
        }
    }

    #[test]
    fn test_light_array_sizes_match_defines() {
        assert!(MESH_FRAGMENT.contains(&format!("#define MAX_DIRECTIONAL {MAX_DIRECTIONAL_LIGHTS}")));
        assert!(MESH_FRAGMENT.contains(&format!("#define MAX_POINT {MAX_POINT_LIGHTS}")));
    }
}
