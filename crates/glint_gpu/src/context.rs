//! Rendering contexts a shader program is bound to
//!
//! [`RenderContext`] is the small slice of a graphics API a
//! [`ShaderProgram`](crate::ShaderProgram) needs: register a linked program,
//! track which program is current, and receive uniform buffer contents.

use std::borrow::Cow;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

use crate::compile::{LinkedShaders, UniformBinding};
use crate::error::ContextError;

new_key_type! {
    pub struct ProgramId;
}

/// Graphics context operations used by shader programs
pub trait RenderContext {
    /// Create GPU-side objects for a linked program
    fn create_program(&mut self, shaders: &LinkedShaders) -> ProgramId;

    /// The program subsequent draws would use
    fn current_program(&self) -> Option<ProgramId>;

    fn use_program(&mut self, program: ProgramId);

    /// Replace the contents of one of `program`'s uniform buffers
    fn write_uniform_block(&mut self, program: ProgramId, binding: UniformBinding, data: &[u8]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Recording context
// ─────────────────────────────────────────────────────────────────────────────

/// What a [`RecordingContext`] knows about one program
#[derive(Debug, Default)]
pub struct RecordedProgram {
    pub label: Option<String>,
    /// Last contents written to each uniform buffer
    pub blocks: FxHashMap<UniformBinding, Vec<u8>>,
    /// Number of block writes received
    pub writes: usize,
}

/// A context with no GPU behind it.
///
/// Keeps the state a driver would hold so programs can be linked, bound and
/// fed uniforms on machines without an adapter (dry runs, tests).
#[derive(Debug, Default)]
pub struct RecordingContext {
    programs: SlotMap<ProgramId, RecordedProgram>,
    current: Option<ProgramId>,
    binds: usize,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn program(&self, id: ProgramId) -> Option<&RecordedProgram> {
        self.programs.get(id)
    }

    /// Last contents of a uniform buffer
    pub fn block(&self, id: ProgramId, binding: UniformBinding) -> Option<&[u8]> {
        self.programs
            .get(id)
            .and_then(|p| p.blocks.get(&binding))
            .map(Vec::as_slice)
    }

    /// Number of times the current program actually changed
    pub fn bind_count(&self) -> usize {
        self.binds
    }

    pub fn program_count(&self) -> usize {
        self.programs.len()
    }
}

impl RenderContext for RecordingContext {
    fn create_program(&mut self, shaders: &LinkedShaders) -> ProgramId {
        self.programs.insert(RecordedProgram {
            label: shaders.label().map(str::to_string),
            blocks: FxHashMap::default(),
            writes: 0,
        })
    }

    fn current_program(&self) -> Option<ProgramId> {
        self.current
    }

    fn use_program(&mut self, program: ProgramId) {
        self.current = Some(program);
        self.binds += 1;
    }

    fn write_uniform_block(&mut self, program: ProgramId, binding: UniformBinding, data: &[u8]) {
        if let Some(recorded) = self.programs.get_mut(program) {
            recorded.blocks.insert(binding, data.to_vec());
            recorded.writes += 1;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// wgpu context
// ─────────────────────────────────────────────────────────────────────────────

/// GPU objects owned for one program
pub struct GpuProgram {
    pub vertex_module: wgpu::ShaderModule,
    pub fragment_module: wgpu::ShaderModule,
    pub vertex_entry: String,
    pub fragment_entry: String,
    /// One `UNIFORM | COPY_DST` buffer per uniform binding
    pub uniform_buffers: FxHashMap<UniformBinding, wgpu::Buffer>,
}

/// A context backed by a wgpu device and queue.
///
/// Pipelines and bind groups stay with the caller; this context owns the
/// shader modules and uniform buffers and keeps the buffers up to date.
pub struct WgpuContext {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    programs: SlotMap<ProgramId, GpuProgram>,
    current: Option<ProgramId>,
}

impl WgpuContext {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self {
            device,
            queue,
            programs: SlotMap::with_key(),
            current: None,
        }
    }

    /// Create a context on the default adapter without a surface
    pub fn headless() -> Result<Self, ContextError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or(ContextError::AdapterNotFound)?;

        let info = adapter.get_info();
        tracing::info!("headless adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("glint headless device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
            },
            None,
        ))?;

        Ok(Self::new(Arc::new(device), Arc::new(queue)))
    }

    pub fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }

    pub fn queue(&self) -> &Arc<wgpu::Queue> {
        &self.queue
    }

    pub fn program(&self, id: ProgramId) -> Option<&GpuProgram> {
        self.programs.get(id)
    }

    pub fn uniform_buffer(&self, id: ProgramId, binding: UniformBinding) -> Option<&wgpu::Buffer> {
        self.programs
            .get(id)
            .and_then(|p| p.uniform_buffers.get(&binding))
    }
}

impl RenderContext for WgpuContext {
    fn create_program(&mut self, shaders: &LinkedShaders) -> ProgramId {
        let label = shaders.label().unwrap_or("glint program");

        let vertex_module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(Cow::Owned(shaders.vertex_source().to_string())),
            });
        let fragment_module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(Cow::Owned(
                    shaders.fragment_source().to_string(),
                )),
            });

        let uniform_buffers = shaders
            .uniform_blocks()
            .iter()
            .map(|&(binding, size)| {
                let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(label),
                    size: size as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                (binding, buffer)
            })
            .collect::<FxHashMap<_, _>>();

        tracing::debug!(
            "created GPU program {:?} with {} uniform buffers",
            label,
            uniform_buffers.len()
        );

        self.programs.insert(GpuProgram {
            vertex_module,
            fragment_module,
            vertex_entry: shaders.vertex_entry().to_string(),
            fragment_entry: shaders.fragment_entry().to_string(),
            uniform_buffers,
        })
    }

    fn current_program(&self) -> Option<ProgramId> {
        self.current
    }

    fn use_program(&mut self, program: ProgramId) {
        self.current = Some(program);
    }

    fn write_uniform_block(&mut self, program: ProgramId, binding: UniformBinding, data: &[u8]) {
        match self.uniform_buffer(program, binding) {
            Some(buffer) => self.queue.write_buffer(buffer, 0, data),
            None => tracing::warn!("no uniform buffer at {} for {:?}", binding, program),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProgramConfig;
    use crate::shaders::{SPRITE_FRAGMENT_SHADER, SPRITE_VERTEX_SHADER};

    #[test]
    fn test_recording_context_tracks_programs() {
        let linked = LinkedShaders::link(
            SPRITE_VERTEX_SHADER,
            SPRITE_FRAGMENT_SHADER,
            &ProgramConfig::default().with_label("sprite"),
        )
        .unwrap();

        let mut ctx = RecordingContext::new();
        let a = ctx.create_program(&linked);
        let b = ctx.create_program(&linked);
        assert_ne!(a, b);
        assert_eq!(ctx.program_count(), 2);
        assert_eq!(ctx.program(a).and_then(|p| p.label.as_deref()), Some("sprite"));

        assert_eq!(ctx.current_program(), None);
        ctx.use_program(b);
        assert_eq!(ctx.current_program(), Some(b));
        assert_eq!(ctx.bind_count(), 1);

        let binding = UniformBinding {
            group: 0,
            binding: 0,
        };
        ctx.write_uniform_block(a, binding, &[1, 2, 3, 4]);
        assert_eq!(ctx.block(a, binding), Some(&[1u8, 2, 3, 4][..]));
        assert_eq!(ctx.block(b, binding), None);
    }
}
