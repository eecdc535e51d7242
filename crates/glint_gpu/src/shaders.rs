//! Built-in WGSL shaders
//!
//! The sprite pair draws [`QuadVertex`](crate::QuadVertex) meshes:
//! - positions are in pixels and go through `transform` (a 2D affine `Mat3`)
//! - `resolution` maps pixels to clip space with y pointing down
//! - texture coordinates are in texels and normalised by the texture size

/// WGSL vertex shader for textured sprites
pub const SPRITE_VERTEX_SHADER: &str = r#"
struct SpriteUniforms {
    transform: mat3x3<f32>,
    resolution: vec2<f32>,
    alpha: f32,
}

@group(0) @binding(0) var<uniform> sprite: SpriteUniforms;

struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) tex_coord: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) tex_coord: vec2<f32>,
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let world = sprite.transform * vec3<f32>(in.position, 1.0);
    let ndc = world.xy / sprite.resolution * 2.0 - vec2<f32>(1.0, 1.0);

    var out: VertexOutput;
    out.clip_position = vec4<f32>(ndc.x, -ndc.y, 0.0, 1.0);
    out.tex_coord = in.tex_coord;
    return out;
}
"#;

/// WGSL fragment shader for textured sprites
pub const SPRITE_FRAGMENT_SHADER: &str = r#"
struct SpriteUniforms {
    transform: mat3x3<f32>,
    resolution: vec2<f32>,
    alpha: f32,
}

@group(0) @binding(0) var<uniform> sprite: SpriteUniforms;
@group(0) @binding(1) var sprite_texture: texture_2d<f32>;
@group(0) @binding(2) var sprite_sampler: sampler;

@fragment
fn fs_main(@location(0) tex_coord: vec2<f32>) -> @location(0) vec4<f32> {
    let size = vec2<f32>(textureDimensions(sprite_texture));
    let color = textureSample(sprite_texture, sprite_sampler, tex_coord / size);
    return vec4<f32>(color.rgb, color.a * sprite.alpha);
}
"#;
