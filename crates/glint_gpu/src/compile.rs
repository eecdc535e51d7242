//! WGSL compilation, linking and reflection
//!
//! Both stages are parsed and validated with naga. Linking checks that every
//! fragment `@location` input is produced by the vertex stage with the same
//! type, and that uniforms seen by both stages agree. The result is a
//! [`LinkedShaders`] carrying name tables for uniforms and vertex attributes,
//! so later lookups never go back to the shader source.

use std::collections::hash_map::Entry;
use std::fmt;

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{AddressSpace, Binding, Handle, Module, Scalar, Type, TypeInner, VectorSize};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::config::ProgramConfig;
use crate::error::{ProgramError, Result};

/// Programmable pipeline stage
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }

    fn attribute(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "@vertex",
            ShaderStage::Fragment => "@fragment",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "Vertex"),
            ShaderStage::Fragment => write!(f, "Fragment"),
        }
    }
}

/// Value types a uniform can be set as
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UniformType {
    Float,
    Int,
    Vec2,
    Vec3,
    Vec4,
    Mat3,
    /// Declared with a type no setter writes (arrays, nested structs, ...)
    Unsupported,
}

impl UniformType {
    fn classify(inner: &TypeInner) -> UniformType {
        match *inner {
            TypeInner::Scalar(scalar) if scalar == Scalar::F32 => UniformType::Float,
            TypeInner::Scalar(scalar) if scalar == Scalar::I32 => UniformType::Int,
            TypeInner::Vector { size, scalar } if scalar == Scalar::F32 => match size {
                VectorSize::Bi => UniformType::Vec2,
                VectorSize::Tri => UniformType::Vec3,
                VectorSize::Quad => UniformType::Vec4,
            },
            TypeInner::Matrix {
                columns: VectorSize::Tri,
                rows: VectorSize::Tri,
                scalar,
            } if scalar == Scalar::F32 => UniformType::Mat3,
            _ => UniformType::Unsupported,
        }
    }
}

impl fmt::Display for UniformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UniformType::Float => "f32",
            UniformType::Int => "i32",
            UniformType::Vec2 => "vec2<f32>",
            UniformType::Vec3 => "vec3<f32>",
            UniformType::Vec4 => "vec4<f32>",
            UniformType::Mat3 => "mat3x3<f32>",
            UniformType::Unsupported => "an unsupported type",
        };
        f.write_str(name)
    }
}

/// Bind group slot of a `var<uniform>` buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniformBinding {
    pub group: u32,
    pub binding: u32,
}

impl fmt::Display for UniformBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@group({}) @binding({})", self.group, self.binding)
    }
}

/// Where a named uniform lives inside its buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformSlot {
    pub binding: UniformBinding,
    /// Byte offset within the buffer
    pub offset: u32,
    pub ty: UniformType,
}

/// A vertex stage input
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub location: u32,
}

/// A `@location` value crossing a stage boundary
struct InterfaceVar {
    name: String,
    location: u32,
    inner: TypeInner,
}

/// Parse and (optionally) validate a single WGSL stage
pub fn compile_stage(stage: ShaderStage, source: &str, validate: bool) -> Result<Module> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| ProgramError::Compile {
        stage,
        log: e.emit_to_string(source),
    })?;

    if validate {
        Validator::new(ValidationFlags::all(), Capabilities::all())
            .validate(&module)
            .map_err(|e| ProgramError::Compile {
                stage,
                log: error_chain(&e),
            })?;
    }

    Ok(module)
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut log = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        log.push_str("\n  caused by: ");
        log.push_str(&cause.to_string());
        source = cause.source();
    }
    log
}

fn find_entry_point<'m>(
    module: &'m Module,
    stage: ShaderStage,
    name: Option<&str>,
) -> Result<&'m naga::EntryPoint> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage.naga() && name.map_or(true, |n| ep.name == n))
        .ok_or_else(|| match name {
            Some(n) => ProgramError::Link(format!(
                "no {} entry point named `{}`",
                stage.attribute(),
                n
            )),
            None => ProgramError::Link(format!(
                "{} shader has no {} entry point",
                stage,
                stage.attribute()
            )),
        })
}

fn collect_locations(
    module: &Module,
    name: Option<&String>,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    out: &mut Vec<InterfaceVar>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(InterfaceVar {
            name: name.cloned().unwrap_or_default(),
            location: *location,
            inner: module.types[ty].inner.clone(),
        }),
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_locations(
                        module,
                        member.name.as_ref(),
                        member.ty,
                        member.binding.as_ref(),
                        out,
                    );
                }
            }
        }
    }
}

fn entry_inputs(module: &Module, entry: &naga::EntryPoint) -> Vec<InterfaceVar> {
    let mut inputs = Vec::new();
    for arg in &entry.function.arguments {
        collect_locations(module, arg.name.as_ref(), arg.ty, arg.binding.as_ref(), &mut inputs);
    }
    inputs
}

fn entry_outputs(module: &Module, entry: &naga::EntryPoint) -> Vec<InterfaceVar> {
    let mut outputs = Vec::new();
    if let Some(result) = &entry.function.result {
        collect_locations(module, None, result.ty, result.binding.as_ref(), &mut outputs);
    }
    outputs
}

/// Uniform name table and buffer sizes gathered across stages
#[derive(Default)]
struct UniformTable {
    slots: FxHashMap<String, UniformSlot>,
    blocks: FxHashMap<UniformBinding, u32>,
}

impl UniformTable {
    fn add_module(&mut self, stage: ShaderStage, module: &Module) -> Result<()> {
        for (_, var) in module.global_variables.iter() {
            if var.space != AddressSpace::Uniform {
                continue;
            }
            let Some(resource) = &var.binding else {
                continue;
            };
            let binding = UniformBinding {
                group: resource.group,
                binding: resource.binding,
            };
            let inner = &module.types[var.ty].inner;
            self.add_block(stage, binding, inner.size(module.to_ctx()))?;

            match inner {
                TypeInner::Struct { members, .. } => {
                    for member in members {
                        let Some(name) = &member.name else {
                            continue;
                        };
                        let slot = UniformSlot {
                            binding,
                            offset: member.offset,
                            ty: UniformType::classify(&module.types[member.ty].inner),
                        };
                        self.add_slot(stage, name, slot)?;
                    }
                }
                other => {
                    if let Some(name) = &var.name {
                        let slot = UniformSlot {
                            binding,
                            offset: 0,
                            ty: UniformType::classify(other),
                        };
                        self.add_slot(stage, name, slot)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn add_block(&mut self, stage: ShaderStage, binding: UniformBinding, size: u32) -> Result<()> {
        match self.blocks.entry(binding) {
            Entry::Occupied(e) if *e.get() != size => Err(ProgramError::Link(format!(
                "uniform buffer at {} is {} bytes in the {} stage but {} bytes elsewhere",
                binding,
                size,
                stage,
                e.get()
            ))),
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(e) => {
                e.insert(size);
                Ok(())
            }
        }
    }

    fn add_slot(&mut self, stage: ShaderStage, name: &str, slot: UniformSlot) -> Result<()> {
        match self.slots.get(name) {
            Some(existing) if *existing != slot => Err(ProgramError::Link(format!(
                "uniform `{}` is declared differently in the {} stage",
                name, stage
            ))),
            Some(_) => Ok(()),
            None => {
                self.slots.insert(name.to_string(), slot);
                Ok(())
            }
        }
    }
}

/// A compiled and linked vertex/fragment pair with its reflection tables
#[derive(Clone, Debug)]
pub struct LinkedShaders {
    label: Option<String>,
    vertex_source: String,
    fragment_source: String,
    vertex_entry: String,
    fragment_entry: String,
    uniforms: FxHashMap<String, UniformSlot>,
    blocks: Vec<(UniformBinding, u32)>,
    attributes: SmallVec<[Attribute; 4]>,
}

impl LinkedShaders {
    /// Compile both stages and link them into a program description
    pub fn link(vertex_source: &str, fragment_source: &str, config: &ProgramConfig) -> Result<Self> {
        let vertex = compile_stage(ShaderStage::Vertex, vertex_source, config.validate)?;
        let fragment = compile_stage(ShaderStage::Fragment, fragment_source, config.validate)?;

        let vs = find_entry_point(&vertex, ShaderStage::Vertex, config.vertex_entry.as_deref())?;
        let fs = find_entry_point(
            &fragment,
            ShaderStage::Fragment,
            config.fragment_entry.as_deref(),
        )?;

        let outputs = entry_outputs(&vertex, vs);
        for input in entry_inputs(&fragment, fs) {
            let Some(output) = outputs.iter().find(|o| o.location == input.location) else {
                return Err(ProgramError::Link(format!(
                    "fragment input `{}` at @location({}) is not written by the vertex stage",
                    input.name, input.location
                )));
            };
            if output.inner != input.inner {
                return Err(ProgramError::Link(format!(
                    "fragment input `{}` at @location({}) does not match the type of vertex output `{}`",
                    input.name, input.location, output.name
                )));
            }
        }

        let mut table = UniformTable::default();
        table.add_module(ShaderStage::Vertex, &vertex)?;
        table.add_module(ShaderStage::Fragment, &fragment)?;

        let mut blocks: Vec<_> = table.blocks.into_iter().collect();
        blocks.sort();

        let attributes = entry_inputs(&vertex, vs)
            .into_iter()
            .map(|var| Attribute {
                name: var.name,
                location: var.location,
            })
            .collect();

        let linked = Self {
            label: config.label.clone(),
            vertex_source: vertex_source.to_string(),
            fragment_source: fragment_source.to_string(),
            vertex_entry: vs.name.clone(),
            fragment_entry: fs.name.clone(),
            uniforms: table.slots,
            blocks,
            attributes,
        };

        tracing::debug!(
            "linked program {:?} ({} -> {}): {} uniforms in {} buffers, {} attributes",
            linked.label,
            linked.vertex_entry,
            linked.fragment_entry,
            linked.uniforms.len(),
            linked.blocks.len(),
            linked.attributes.len()
        );

        Ok(linked)
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn vertex_source(&self) -> &str {
        &self.vertex_source
    }

    pub fn fragment_source(&self) -> &str {
        &self.fragment_source
    }

    pub fn vertex_entry(&self) -> &str {
        &self.vertex_entry
    }

    pub fn fragment_entry(&self) -> &str {
        &self.fragment_entry
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformSlot> {
        self.uniforms.get(name)
    }

    /// Uniforms sorted by binding, then offset
    pub fn uniforms(&self) -> Vec<(&str, &UniformSlot)> {
        let mut uniforms: Vec<_> = self
            .uniforms
            .iter()
            .map(|(name, slot)| (name.as_str(), slot))
            .collect();
        uniforms.sort_by_key(|(_, slot)| (slot.binding, slot.offset));
        uniforms
    }

    /// Uniform buffers and their sizes in bytes, sorted by binding
    pub fn uniform_blocks(&self) -> &[(UniformBinding, u32)] {
        &self.blocks
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaders::{SPRITE_FRAGMENT_SHADER, SPRITE_VERTEX_SHADER};

    fn link(vs: &str, fs: &str) -> Result<LinkedShaders> {
        LinkedShaders::link(vs, fs, &ProgramConfig::default())
    }

    #[test]
    fn test_sprite_shaders_link() {
        let linked = link(SPRITE_VERTEX_SHADER, SPRITE_FRAGMENT_SHADER).unwrap();
        assert_eq!(linked.vertex_entry(), "vs_main");
        assert_eq!(linked.fragment_entry(), "fs_main");

        let binding = UniformBinding {
            group: 0,
            binding: 0,
        };
        assert_eq!(linked.uniform_blocks(), &[(binding, 64)]);

        let transform = linked.uniform("transform").unwrap();
        assert_eq!(transform.offset, 0);
        assert_eq!(transform.ty, UniformType::Mat3);

        let resolution = linked.uniform("resolution").unwrap();
        assert_eq!(resolution.offset, 48);
        assert_eq!(resolution.ty, UniformType::Vec2);

        let alpha = linked.uniform("alpha").unwrap();
        assert_eq!(alpha.offset, 56);
        assert_eq!(alpha.ty, UniformType::Float);

        let names: Vec<_> = linked.uniforms().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["transform", "resolution", "alpha"]);
    }

    #[test]
    fn test_attributes_reflected_from_struct_input() {
        let linked = link(SPRITE_VERTEX_SHADER, SPRITE_FRAGMENT_SHADER).unwrap();
        assert_eq!(linked.attribute("position").map(|a| a.location), Some(0));
        assert_eq!(linked.attribute("tex_coord").map(|a| a.location), Some(1));
        assert!(linked.attribute("color").is_none());
        assert_eq!(linked.attributes().len(), 2);
    }

    #[test]
    fn test_compile_error_names_stage() {
        let err = link("fn vs_main( {", SPRITE_FRAGMENT_SHADER).unwrap_err();
        match err {
            ProgramError::Compile { stage, log } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(!log.is_empty());
            }
            other => panic!("expected compile error, got {:?}", other),
        }

        let err = link(SPRITE_VERTEX_SHADER, "@fragment fn fs_main() -> ").unwrap_err();
        assert!(matches!(
            err,
            ProgramError::Compile {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_entry_point_is_link_error() {
        let err = link(SPRITE_FRAGMENT_SHADER, SPRITE_FRAGMENT_SHADER).unwrap_err();
        assert!(matches!(err, ProgramError::Link(_)));

        let config = ProgramConfig::default().with_entry_points("main", "fs_main");
        let err =
            LinkedShaders::link(SPRITE_VERTEX_SHADER, SPRITE_FRAGMENT_SHADER, &config).unwrap_err();
        assert!(matches!(err, ProgramError::Link(msg) if msg.contains("`main`")));
    }

    #[test]
    fn test_unmatched_fragment_input_is_link_error() {
        let fragment = r#"
@fragment
fn fs_main(@location(3) tint: vec4<f32>) -> @location(0) vec4<f32> {
    return tint;
}
"#;
        let err = link(SPRITE_VERTEX_SHADER, fragment).unwrap_err();
        assert!(matches!(err, ProgramError::Link(msg) if msg.contains("tint")));
    }

    #[test]
    fn test_mismatched_interface_type_is_link_error() {
        let fragment = r#"
@fragment
fn fs_main(@location(0) uv: vec4<f32>) -> @location(0) vec4<f32> {
    return uv;
}
"#;
        let err = link(SPRITE_VERTEX_SHADER, fragment).unwrap_err();
        assert!(matches!(err, ProgramError::Link(_)));
    }

    #[test]
    fn test_conflicting_uniform_is_link_error() {
        let fragment = r#"
struct Other {
    alpha: vec4<f32>,
}

@group(0) @binding(0) var<uniform> other: Other;

@fragment
fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    return other.alpha * uv.x;
}
"#;
        let err = link(SPRITE_VERTEX_SHADER, fragment).unwrap_err();
        assert!(matches!(err, ProgramError::Link(_)));
    }

    #[test]
    fn test_plain_uniform_variable() {
        let vertex = r#"
@group(1) @binding(0) var<uniform> scale: f32;

@vertex
fn main(@location(0) pos: vec2<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(pos * scale, 0.0, 1.0);
}
"#;
        let fragment = r#"
@fragment
fn main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 1.0, 1.0, 1.0);
}
"#;
        let linked = link(vertex, fragment).unwrap();
        let scale = linked.uniform("scale").unwrap();
        assert_eq!(scale.binding, UniformBinding { group: 1, binding: 0 });
        assert_eq!(scale.offset, 0);
        assert_eq!(scale.ty, UniformType::Float);
        assert_eq!(linked.attribute("pos").map(|a| a.location), Some(0));
    }
}
