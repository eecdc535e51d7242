//! Sprite quad geometry
//!
//! A quad is two triangles sharing the edge from `(x, y + h)` to `(x + w, y)`:
//!
//! ```text
//! 0-2        2
//! |/        /|
//! 1        0-1
//! ```
//!
//! Texture coordinates are in texels, spanning `0..tex_w` and `0..tex_h`.

/// A vertex for sprite rendering
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
}

impl QuadVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

    pub const fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y],
            tex_coord: [u, v],
        }
    }

    /// Vertex buffer layout matching `@location(0) position` and
    /// `@location(1) tex_coord`
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Build the six vertices of an axis-aligned textured quad
pub fn make_quad(x: f32, y: f32, w: f32, h: f32, tex_w: f32, tex_h: f32) -> [QuadVertex; 6] {
    [
        QuadVertex::new(x, y, 0.0, 0.0),
        QuadVertex::new(x, y + h, 0.0, tex_h),
        QuadVertex::new(x + w, y, tex_w, 0.0),
        QuadVertex::new(x, y + h, 0.0, tex_h),
        QuadVertex::new(x + w, y + h, tex_w, tex_h),
        QuadVertex::new(x + w, y, tex_w, 0.0),
    ]
}

/// [`make_quad`] as interleaved `x, y, u, v` floats
pub fn quad_floats(x: f32, y: f32, w: f32, h: f32, tex_w: f32, tex_h: f32) -> [f32; 24] {
    bytemuck::cast(make_quad(x, y, w, h, tex_w, tex_h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_vertex_order() {
        let quad = make_quad(10.0, 20.0, 30.0, 40.0, 64.0, 32.0);

        assert_eq!(quad[0], QuadVertex::new(10.0, 20.0, 0.0, 0.0));
        assert_eq!(quad[1], QuadVertex::new(10.0, 60.0, 0.0, 32.0));
        assert_eq!(quad[2], QuadVertex::new(40.0, 20.0, 64.0, 0.0));
        assert_eq!(quad[3], quad[1]);
        assert_eq!(quad[4], QuadVertex::new(40.0, 60.0, 64.0, 32.0));
        assert_eq!(quad[5], quad[2]);
    }

    #[test]
    fn test_quad_floats_interleaved() {
        let floats = quad_floats(0.0, 0.0, 2.0, 3.0, 1.0, 1.0);
        assert_eq!(
            floats,
            [
                0.0, 0.0, 0.0, 0.0, //
                0.0, 3.0, 0.0, 1.0, //
                2.0, 0.0, 1.0, 0.0, //
                0.0, 3.0, 0.0, 1.0, //
                2.0, 3.0, 1.0, 1.0, //
                2.0, 0.0, 1.0, 0.0,
            ]
        );
    }

    #[test]
    fn test_layout_matches_struct() {
        let layout = QuadVertex::layout();
        assert_eq!(layout.array_stride, 16);
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[1].offset, 8);
        assert_eq!(layout.attributes[1].shader_location, 1);
    }
}
