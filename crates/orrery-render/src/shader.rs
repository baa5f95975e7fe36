//! Body shader program: source loading, compilation and linking.
//!
//! Each stage lives in its own WGSL file. "Compiling" a stage parses and
//! validates it with naga; "linking" checks that the two stages agree with
//! each other and with the bindings the renderer provides. Failures are
//! reported through [`ShaderError`] and never abort the program.

use std::fmt;
use std::path::Path;

use log::{debug, error, info};
use thiserror::Error;

/// Entry point names required in each stage.
pub const VERTEX_ENTRY_POINT: &str = "vs_main";
pub const FRAGMENT_ENTRY_POINT: &str = "fs_main";

/// Named resources the program must declare, with their `(group, binding)`.
pub const UNIFORM_CONTRACT: [(&str, u32, u32); 4] = [
    ("model", 0, 0),
    ("view", 0, 1),
    ("projection", 0, 2),
    ("ourTexture", 1, 0),
];

/// What the pipeline layout binds in a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SlotKind {
    /// 64-byte uniform buffer.
    Matrix,
    /// Filterable float 2D texture.
    Texture,
    /// Filtering sampler.
    Sampler,
}

impl SlotKind {
    /// Whether `var` can be bound to a slot of this kind.
    fn accepts(self, module: &naga::Module, var: &naga::GlobalVariable) -> bool {
        let inner = &module.types[var.ty].inner;
        match self {
            SlotKind::Matrix => {
                var.space == naga::AddressSpace::Uniform
                    && matches!(
                        inner,
                        naga::TypeInner::Matrix {
                            columns: naga::VectorSize::Quad,
                            rows: naga::VectorSize::Quad,
                            scalar,
                        } if *scalar == naga::Scalar::F32
                    )
            }
            SlotKind::Texture => matches!(
                inner,
                naga::TypeInner::Image {
                    dim: naga::ImageDimension::D2,
                    arrayed: false,
                    class: naga::ImageClass::Sampled {
                        kind: naga::ScalarKind::Float,
                        multi: false,
                    },
                }
            ),
            SlotKind::Sampler => matches!(inner, naga::TypeInner::Sampler { comparison: false }),
        }
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SlotKind::Matrix => "a `var<uniform>` of type mat4x4<f32>",
            SlotKind::Texture => "a texture_2d<f32>",
            SlotKind::Sampler => "a filtering sampler",
        })
    }
}

/// Every binding slot the pipeline layout provides, as `(group, binding)`.
const PROVIDED_BINDINGS: [((u32, u32), SlotKind); 5] = [
    ((0, 0), SlotKind::Matrix),
    ((0, 1), SlotKind::Matrix),
    ((0, 2), SlotKind::Matrix),
    ((1, 0), SlotKind::Texture),
    ((1, 1), SlotKind::Sampler),
];

/// Vertex attribute locations fed by the sphere mesh.
const MESH_LOCATIONS: [u32; 2] = [0, 1];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn naga_stage(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "VERTEX",
            ShaderStage::Fragment => "FRAGMENT",
        })
    }
}

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("ERROR::SHADER::{stage}::COMPILATION_FAILED\n{message}")]
    CompilationFailed { stage: ShaderStage, message: String },

    #[error("ERROR::SHADER::PROGRAM::LINKING_FAILED\n{message}")]
    LinkingFailed { message: String },
}

impl ShaderError {
    fn link(message: impl Into<String>) -> Self {
        ShaderError::LinkingFailed {
            message: message.into(),
        }
    }
}

/// WGSL text for both stages.
#[derive(Debug, Clone, Default)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSources {
    /// Read `dir/vertex_file` and `dir/fragment_file`.
    ///
    /// An unreadable file is logged and replaced by an empty source, which
    /// then fails to compile.
    pub fn read(dir: &Path, vertex_file: &str, fragment_file: &str) -> Self {
        Self {
            vertex: read_source(&dir.join(vertex_file)),
            fragment: read_source(&dir.join(fragment_file)),
        }
    }

    pub fn from_strings(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

fn read_source(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(source) => {
            debug!("Read shader source {} ({} bytes)", path.display(), source.len());
            source
        }
        Err(err) => {
            error!("Could not read file {}. File does not exist.", path.display());
            debug!("Shader read error: {err}");
            String::new()
        }
    }
}

/// A compiled and linked vertex/fragment pair.
pub struct ShaderProgram {
    pub vertex: wgpu::ShaderModule,
    pub fragment: wgpu::ShaderModule,
}

impl ShaderProgram {
    /// Compile and link `sources`, then create the GPU shader modules.
    ///
    /// Errors are logged before being returned.
    pub fn build(device: &wgpu::Device, sources: &ShaderSources) -> Result<Self, ShaderError> {
        if let Err(err) = compile_and_link(sources) {
            error!("{err}");
            return Err(err);
        }

        let vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("body-vertex-shader"),
            source: wgpu::ShaderSource::Wgsl(sources.vertex.as_str().into()),
        });
        let fragment = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("body-fragment-shader"),
            source: wgpu::ShaderSource::Wgsl(sources.fragment.as_str().into()),
        });
        info!("Body shader program linked");

        Ok(Self { vertex, fragment })
    }
}

/// Compile both stages and link them, without touching the GPU.
pub fn compile_and_link(sources: &ShaderSources) -> Result<(), ShaderError> {
    let vertex = compile_stage(ShaderStage::Vertex, &sources.vertex)?;
    let fragment = compile_stage(ShaderStage::Fragment, &sources.fragment)?;
    link(&vertex, &fragment)
}

/// Parse and validate one stage. A stage without an entry point of its kind
/// does not compile.
pub fn compile_stage(stage: ShaderStage, source: &str) -> Result<naga::Module, ShaderError> {
    let failed = |message: String| ShaderError::CompilationFailed { stage, message };

    let module =
        naga::front::wgsl::parse_str(source).map_err(|err| failed(err.emit_to_string(source)))?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|err| failed(err.to_string()))?;

    if !module
        .entry_points
        .iter()
        .any(|ep| ep.stage == stage.naga_stage())
    {
        return Err(failed(format!("no {stage} entry point")));
    }

    Ok(module)
}

fn entry_point<'a>(
    module: &'a naga::Module,
    stage: naga::ShaderStage,
    name: &str,
) -> Option<&'a naga::EntryPoint> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage && ep.name == name)
}

/// User-defined locations carried by `ty` with `binding`, flattening structs.
fn locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
) -> Vec<u32> {
    if let Some(naga::Binding::Location { location, .. }) = binding {
        return vec![*location];
    }
    match &module.types[ty].inner {
        naga::TypeInner::Struct { members, .. } => members
            .iter()
            .filter_map(|member| match &member.binding {
                Some(naga::Binding::Location { location, .. }) => Some(*location),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn input_locations(module: &naga::Module, ep: &naga::EntryPoint) -> Vec<u32> {
    ep.function
        .arguments
        .iter()
        .flat_map(|arg| locations(module, arg.ty, arg.binding.as_ref()))
        .collect()
}

fn output_locations(module: &naga::Module, ep: &naga::EntryPoint) -> Vec<u32> {
    ep.function
        .result
        .as_ref()
        .map(|result| locations(module, result.ty, result.binding.as_ref()))
        .unwrap_or_default()
}

/// Check the stages against each other and against the renderer's bindings.
pub fn link(vertex: &naga::Module, fragment: &naga::Module) -> Result<(), ShaderError> {
    let vs = entry_point(vertex, naga::ShaderStage::Vertex, VERTEX_ENTRY_POINT).ok_or_else(|| {
        ShaderError::link(format!("vertex entry point `{VERTEX_ENTRY_POINT}` not found"))
    })?;
    let fs = entry_point(fragment, naga::ShaderStage::Fragment, FRAGMENT_ENTRY_POINT)
        .ok_or_else(|| {
            ShaderError::link(format!("fragment entry point `{FRAGMENT_ENTRY_POINT}` not found"))
        })?;

    for location in input_locations(vertex, vs) {
        if !MESH_LOCATIONS.contains(&location) {
            return Err(ShaderError::link(format!(
                "vertex input at location {location} is not provided by the mesh"
            )));
        }
    }

    let varyings = output_locations(vertex, vs);
    for location in input_locations(fragment, fs) {
        if !varyings.contains(&location) {
            return Err(ShaderError::link(format!(
                "fragment input at location {location} is not written by the vertex stage"
            )));
        }
    }

    let globals: Vec<(&naga::Module, &naga::GlobalVariable)> = [vertex, fragment]
        .into_iter()
        .flat_map(|module| module.global_variables.iter().map(move |(_, var)| (module, var)))
        .collect();

    for (module, var) in &globals {
        let Some(binding) = &var.binding else {
            continue;
        };
        let slot = (binding.group, binding.binding);
        let name = var.name.as_deref().unwrap_or("<unnamed>");
        let Some((_, kind)) = PROVIDED_BINDINGS.iter().find(|(provided, _)| *provided == slot)
        else {
            return Err(ShaderError::link(format!(
                "`{name}` is bound at group {} binding {}, which the renderer does not provide",
                slot.0, slot.1
            )));
        };
        if !kind.accepts(module, var) {
            return Err(ShaderError::link(format!(
                "`{name}` at group {} binding {} must be {kind}",
                slot.0, slot.1
            )));
        }
    }

    for (name, group, binding) in UNIFORM_CONTRACT {
        let (_, var) = globals
            .iter()
            .find(|(_, var)| var.name.as_deref() == Some(name))
            .ok_or_else(|| ShaderError::link(format!("uniform `{name}` not found")))?;

        let bound_at = var.binding.as_ref().map(|b| (b.group, b.binding));
        if bound_at != Some((group, binding)) {
            return Err(ShaderError::link(format!(
                "uniform `{name}` must be bound at group {group} binding {binding}"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY_VERTEX: &str = include_str!("../../../assets/earth.vert.wgsl");
    const BODY_FRAGMENT: &str = include_str!("../../../assets/earth.frag.wgsl");

    fn bundled() -> ShaderSources {
        ShaderSources::from_strings(BODY_VERTEX, BODY_FRAGMENT)
    }

    #[test]
    fn test_bundled_shaders_compile_and_link() {
        compile_and_link(&bundled()).unwrap();
    }

    #[test]
    fn test_empty_vertex_source_fails_to_compile() {
        let sources = ShaderSources::from_strings("", BODY_FRAGMENT);
        let err = compile_and_link(&sources).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::CompilationFailed {
                stage: ShaderStage::Vertex,
                ..
            }
        ));
        assert!(
            err.to_string()
                .starts_with("ERROR::SHADER::VERTEX::COMPILATION_FAILED")
        );
    }

    #[test]
    fn test_syntax_error_in_fragment_reported_for_fragment() {
        let sources = ShaderSources::from_strings(BODY_VERTEX, "@fragment fn fs_main( {");
        let err = compile_and_link(&sources).unwrap_err();
        assert!(
            err.to_string()
                .starts_with("ERROR::SHADER::FRAGMENT::COMPILATION_FAILED")
        );
    }

    #[test]
    fn test_undeclared_identifier_fails_to_compile() {
        let source = r#"
            @vertex
            fn vs_main() -> @builtin(position) vec4<f32> {
                return undeclared_variable;
            }
        "#;
        assert!(compile_stage(ShaderStage::Vertex, source).is_err());
    }

    #[test]
    fn test_wrong_entry_point_name_fails_to_link() {
        let renamed = BODY_VERTEX.replace("fn vs_main", "fn main");
        let err = compile_and_link(&ShaderSources::from_strings(renamed, BODY_FRAGMENT)).unwrap_err();
        assert!(matches!(err, ShaderError::LinkingFailed { .. }));
        assert!(
            err.to_string()
                .starts_with("ERROR::SHADER::PROGRAM::LINKING_FAILED")
        );
    }

    #[test]
    fn test_renamed_uniform_fails_to_link() {
        let renamed = BODY_VERTEX.replace("projection", "proj");
        let err = compile_and_link(&ShaderSources::from_strings(renamed, BODY_FRAGMENT)).unwrap_err();
        assert!(err.to_string().contains("`projection`"));
    }

    #[test]
    fn test_missing_texture_uniform_fails_to_link() {
        let fragment = r#"
            @fragment
            fn fs_main(@location(0) tex_coord: vec2<f32>) -> @location(0) vec4<f32> {
                return vec4<f32>(tex_coord, 0.0, 1.0);
            }
        "#;
        let err = compile_and_link(&ShaderSources::from_strings(BODY_VERTEX, fragment)).unwrap_err();
        assert!(err.to_string().contains("`ourTexture`"));
    }

    #[test]
    fn test_oversized_matrix_uniform_fails_to_link() {
        let vertex = format!(
            "struct Pair {{ a: mat4x4<f32>, b: mat4x4<f32> }};\n{}",
            BODY_VERTEX
                .replace("var<uniform> model: mat4x4<f32>;", "var<uniform> model: Pair;")
                .replace("* model *", "* model.a *")
        );
        // Both stages are valid WGSL on their own.
        compile_stage(ShaderStage::Vertex, &vertex).unwrap();

        let err = compile_and_link(&ShaderSources::from_strings(vertex, BODY_FRAGMENT)).unwrap_err();
        assert!(matches!(err, ShaderError::LinkingFailed { .. }));
        assert!(err.to_string().contains("`model` at group 0 binding 0"));
    }

    #[test]
    fn test_integer_texture_fails_to_link() {
        let fragment = r#"
            @group(1) @binding(0) var ourTexture: texture_2d<u32>;

            @fragment
            fn fs_main(@location(0) tex_coord: vec2<f32>) -> @location(0) vec4<f32> {
                let texel = textureLoad(ourTexture, vec2<i32>(tex_coord * 4.0), 0);
                return vec4<f32>(texel) / 255.0;
            }
        "#;
        compile_stage(ShaderStage::Fragment, fragment).unwrap();

        let err = compile_and_link(&ShaderSources::from_strings(BODY_VERTEX, fragment)).unwrap_err();
        assert!(matches!(err, ShaderError::LinkingFailed { .. }));
        assert!(err.to_string().contains("`ourTexture` at group 1 binding 0"));
    }

    #[test]
    fn test_comparison_sampler_fails_to_link() {
        let fragment = BODY_FRAGMENT
            .replace("var ourSampler: sampler;", "var ourSampler: sampler_comparison;")
            .replace(
                "return textureSample(ourTexture, ourSampler, tex_coord);",
                "return textureLoad(ourTexture, vec2<i32>(tex_coord), 0);",
            );
        let err = compile_and_link(&ShaderSources::from_strings(BODY_VERTEX, fragment)).unwrap_err();
        assert!(err.to_string().contains("`ourSampler`"));
    }

    #[test]
    fn test_unmatched_varying_fails_to_link() {
        let fragment = BODY_FRAGMENT.replace("@location(0) tex_coord", "@location(3) tex_coord");
        let err = compile_and_link(&ShaderSources::from_strings(BODY_VERTEX, fragment)).unwrap_err();
        assert!(err.to_string().contains("location 3"));
    }

    #[test]
    fn test_read_missing_files_yields_empty_sources() {
        let dir = tempfile::tempdir().unwrap();
        let sources = ShaderSources::read(dir.path(), "earth.vert.wgsl", "earth.frag.wgsl");
        assert!(sources.vertex.is_empty());
        assert!(sources.fragment.is_empty());
        assert!(compile_and_link(&sources).is_err());
    }

    #[test]
    fn test_read_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("v.wgsl"), BODY_VERTEX).unwrap();
        std::fs::write(dir.path().join("f.wgsl"), BODY_FRAGMENT).unwrap();
        let sources = ShaderSources::read(dir.path(), "v.wgsl", "f.wgsl");
        assert_eq!(sources.vertex, BODY_VERTEX);
        assert!(compile_and_link(&sources).is_ok());
    }

    #[test]
    fn test_build_creates_modules_on_gpu() {
        let Some((device, _queue)) = crate::create_test_device_queue() else {
            return;
        };
        assert!(ShaderProgram::build(&device, &bundled()).is_ok());
        assert!(ShaderProgram::build(&device, &ShaderSources::default()).is_err());
    }
}
