//! Shader programs
//!
//! A [`ShaderProgram`] is a linked WGSL vertex/fragment pair registered with a
//! [`RenderContext`]. Uniform setters address values by name; the program
//! keeps a CPU copy of every uniform buffer, patches the named field and
//! pushes the whole buffer to the context.

use glint_core::Mat3;
use rustc_hash::FxHashMap;

use crate::compile::{Attribute, LinkedShaders, UniformBinding, UniformSlot, UniformType};
use crate::config::ProgramConfig;
use crate::context::{ProgramId, RenderContext};
use crate::error::{ProgramError, Result};

/// Byte stride between `mat3x3<f32>` columns in a uniform buffer
const MAT3_COLUMN_STRIDE: usize = 16;

/// A compiled, linked program bound to a rendering context
#[derive(Debug)]
pub struct ShaderProgram {
    id: ProgramId,
    shaders: LinkedShaders,
    staging: FxHashMap<UniformBinding, Vec<u8>>,
}

impl ShaderProgram {
    /// Compile and link `vertex_source` with `fragment_source` using default
    /// options
    pub fn new<C: RenderContext + ?Sized>(
        ctx: &mut C,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self> {
        Self::with_config(ctx, vertex_source, fragment_source, &ProgramConfig::default())
    }

    pub fn with_config<C: RenderContext + ?Sized>(
        ctx: &mut C,
        vertex_source: &str,
        fragment_source: &str,
        config: &ProgramConfig,
    ) -> Result<Self> {
        let shaders = LinkedShaders::link(vertex_source, fragment_source, config)?;
        let id = ctx.create_program(&shaders);
        let staging = shaders
            .uniform_blocks()
            .iter()
            .map(|&(binding, size)| (binding, vec![0u8; size as usize]))
            .collect();

        Ok(Self {
            id,
            shaders,
            staging,
        })
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn shaders(&self) -> &LinkedShaders {
        &self.shaders
    }

    /// Whether `ctx` currently has this program bound
    pub fn in_use<C: RenderContext + ?Sized>(&self, ctx: &C) -> bool {
        ctx.current_program() == Some(self.id)
    }

    /// Bind this program, unless it already is
    pub fn use_program<C: RenderContext + ?Sized>(&self, ctx: &mut C) {
        if !self.in_use(ctx) {
            ctx.use_program(self.id);
        }
    }

    /// Vertex buffer location of the input called `name`
    pub fn attribute_location(&self, name: &str) -> Result<u32> {
        self.shaders
            .attribute(name)
            .map(|a| a.location)
            .ok_or_else(|| ProgramError::UnknownAttribute(name.to_string()))
    }

    pub fn attributes(&self) -> &[Attribute] {
        self.shaders.attributes()
    }

    pub fn uniforms(&self) -> Vec<(&str, &UniformSlot)> {
        self.shaders.uniforms()
    }

    /// Current CPU-side contents of a uniform buffer
    pub fn uniform_block(&self, binding: UniformBinding) -> Option<&[u8]> {
        self.staging.get(&binding).map(Vec::as_slice)
    }

    fn find_uniform(&self, name: &str) -> Result<UniformSlot> {
        self.shaders
            .uniform(name)
            .copied()
            .ok_or_else(|| ProgramError::UnknownUniform(name.to_string()))
    }

    fn write_uniform<C: RenderContext + ?Sized>(
        &mut self,
        ctx: &mut C,
        name: &str,
        expected: UniformType,
        bytes: &[u8],
    ) -> Result<()> {
        let slot = self.find_uniform(name)?;
        if slot.ty != expected {
            return Err(ProgramError::UniformType {
                name: name.to_string(),
                expected,
                found: slot.ty,
            });
        }

        let block = self
            .staging
            .get_mut(&slot.binding)
            .ok_or_else(|| ProgramError::UnknownUniform(name.to_string()))?;
        let start = slot.offset as usize;
        let len = block.len();
        let Some(dst) = block.get_mut(start..start + bytes.len()) else {
            return Err(ProgramError::Link(format!(
                "uniform `{}` at offset {} overruns its {}-byte buffer",
                name, start, len
            )));
        };
        dst.copy_from_slice(bytes);

        ctx.write_uniform_block(self.id, slot.binding, block);
        Ok(())
    }

    pub fn set_uniform_1f<C: RenderContext + ?Sized>(
        &mut self,
        ctx: &mut C,
        name: &str,
        value: f32,
    ) -> Result<()> {
        self.write_uniform(ctx, name, UniformType::Float, bytemuck::bytes_of(&value))
    }

    pub fn set_uniform_2f<C: RenderContext + ?Sized>(
        &mut self,
        ctx: &mut C,
        name: &str,
        x: f32,
        y: f32,
    ) -> Result<()> {
        self.write_uniform(ctx, name, UniformType::Vec2, bytemuck::bytes_of(&[x, y]))
    }

    pub fn set_uniform_3f<C: RenderContext + ?Sized>(
        &mut self,
        ctx: &mut C,
        name: &str,
        x: f32,
        y: f32,
        z: f32,
    ) -> Result<()> {
        self.write_uniform(ctx, name, UniformType::Vec3, bytemuck::bytes_of(&[x, y, z]))
    }

    pub fn set_uniform_4f<C: RenderContext + ?Sized>(
        &mut self,
        ctx: &mut C,
        name: &str,
        x: f32,
        y: f32,
        z: f32,
        w: f32,
    ) -> Result<()> {
        self.write_uniform(ctx, name, UniformType::Vec4, bytemuck::bytes_of(&[x, y, z, w]))
    }

    pub fn set_uniform_1i<C: RenderContext + ?Sized>(
        &mut self,
        ctx: &mut C,
        name: &str,
        value: i32,
    ) -> Result<()> {
        self.write_uniform(ctx, name, UniformType::Int, bytemuck::bytes_of(&value))
    }

    /// Set a `mat3x3<f32>` uniform. Columns are padded to 16 bytes as WGSL
    /// uniform layout requires.
    pub fn set_uniform_mat3<C: RenderContext + ?Sized>(
        &mut self,
        ctx: &mut C,
        name: &str,
        value: &Mat3,
    ) -> Result<()> {
        let mut padded = [0u8; 3 * MAT3_COLUMN_STRIDE];
        for (col, chunk) in value.m.chunks_exact(3).enumerate() {
            let start = col * MAT3_COLUMN_STRIDE;
            padded[start..start + 12].copy_from_slice(bytemuck::cast_slice(chunk));
        }
        self.write_uniform(ctx, name, UniformType::Mat3, &padded)
    }
}
