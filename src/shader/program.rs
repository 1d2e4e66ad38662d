use std::fs;
use std::path::Path;
use std::rc::Rc;

use glam::{Mat4, Vec3};
use log::{debug, error, warn};

use crate::error::ShaderError;
use crate::light::{DirectionalLight, Light, PointLight, SpotLight, MAX_POINT_LIGHTS, MAX_SPOT_LIGHTS};
use crate::material::Material;
use crate::shader::uniform::{element_name, member_name, UniformStruct, UniformValue};
use crate::shader::{ShaderBackend, ShaderStage};

pub const MODEL: &str = "model";
pub const PROJECTION: &str = "projection";
pub const VIEW: &str = "view";
pub const EYE_POSITION: &str = "eyePosition";
pub const MATERIAL: &str = "material";
pub const DIRECTIONAL_LIGHT: &str = "directionalLight";
pub const POINT_LIGHT_COUNT: &str = "pointLightCount";
pub const POINT_LIGHTS: &str = "pointLights";
pub const SPOT_LIGHT_COUNT: &str = "spotLightCount";
pub const SPOT_LIGHTS: &str = "spotLights";

/// Locations of one struct uniform, in the order of its field paths.
struct StructSlot<L> {
    locations: Vec<Option<L>>,
}

impl<L> StructSlot<L> {
    fn resolve<S: UniformStruct>(root: &str, resolve: &mut impl FnMut(&str) -> Option<L>) -> Self {
        let locations = S::field_paths()
            .iter()
            .map(|path| resolve(&member_name(root, path)))
            .collect();
        Self { locations }
    }
}

/// Every location the binder uploads to, resolved once after linking.
struct UniformLocations<L> {
    model: Option<L>,
    projection: Option<L>,
    view: Option<L>,
    eye_position: Option<L>,
    material: StructSlot<L>,
    directional_light: StructSlot<L>,
    point_light_count: Option<L>,
    point_lights: Vec<StructSlot<L>>,
    spot_light_count: Option<L>,
    spot_lights: Vec<StructSlot<L>>,
}

impl<L> UniformLocations<L> {
    fn resolve(mut resolve: impl FnMut(&str) -> Option<L>) -> Self {
        Self {
            model: resolve(MODEL),
            projection: resolve(PROJECTION),
            view: resolve(VIEW),
            eye_position: resolve(EYE_POSITION),
            material: StructSlot::resolve::<Material>(MATERIAL, &mut resolve),
            directional_light: StructSlot::resolve::<DirectionalLight>(
                DIRECTIONAL_LIGHT,
                &mut resolve,
            ),
            point_light_count: resolve(POINT_LIGHT_COUNT),
            point_lights: (0..MAX_POINT_LIGHTS)
                .map(|i| {
                    StructSlot::resolve::<PointLight>(&element_name(POINT_LIGHTS, i), &mut resolve)
                })
                .collect(),
            spot_light_count: resolve(SPOT_LIGHT_COUNT),
            spot_lights: (0..MAX_SPOT_LIGHTS)
                .map(|i| {
                    StructSlot::resolve::<SpotLight>(&element_name(SPOT_LIGHTS, i), &mut resolve)
                })
                .collect(),
        }
    }
}

/// Every uniform name the binder resolves, in resolution order.
pub fn expected_uniforms() -> Vec<String> {
    let mut names = Vec::new();
    UniformLocations::<()>::resolve(|name| {
        names.push(name.to_string());
        None
    });
    names
}

/// Reads a shader source file. A missing file is logged and yields an empty
/// source, which then fails to compile.
pub fn read_source(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            error!("failed to read shader source {}: {err}", path.display());
            String::new()
        }
    }
}

/// A linked vertex + fragment program and its cached uniform locations.
pub struct ShaderProgram<B: ShaderBackend> {
    backend: Rc<B>,
    program: B::ProgramHandle,
    uniforms: UniformLocations<B::Location>,
    missing: Vec<String>,
    scratch: Vec<UniformValue>,
}

impl<B: ShaderBackend> ShaderProgram<B> {
    /// Compiles and links a program from in-memory sources.
    pub fn from_sources(
        backend: Rc<B>,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, ShaderError> {
        let vertex = compile(&*backend, ShaderStage::Vertex, vertex_source)?;
        let fragment = match compile(&*backend, ShaderStage::Fragment, fragment_source) {
            Ok(fragment) => fragment,
            Err(err) => {
                backend.release_stage(vertex);
                return Err(err);
            }
        };

        let linked = backend.link_stages(&vertex, &fragment);
        backend.release_stage(vertex);
        backend.release_stage(fragment);
        let program = linked.map_err(|log| {
            error!("shader program linking failed: {log}");
            ShaderError::Link { log }
        })?;

        let mut missing = Vec::new();
        let uniforms = UniformLocations::resolve(|name| {
            let location = backend.locate_uniform(&program, name);
            if location.is_none() {
                missing.push(name.to_string());
            }
            location
        });
        if missing.is_empty() {
            debug!("shader program linked with every uniform resolved");
        } else {
            warn!(
                "shader program does not declare {} uniform(s): {}",
                missing.len(),
                missing.join(", ")
            );
        }

        Ok(Self {
            backend,
            program,
            uniforms,
            missing,
            scratch: Vec::new(),
        })
    }

    /// Reads both stages from disk, then behaves like [`ShaderProgram::from_sources`].
    pub fn from_files(
        backend: Rc<B>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ShaderError> {
        let vertex = read_source(vertex_path.as_ref());
        let fragment = read_source(fragment_path.as_ref());
        debug!(
            "read shader sources: vertex {} bytes, fragment {} bytes",
            vertex.len(),
            fragment.len()
        );
        Self::from_sources(backend, &vertex, &fragment)
    }

    pub fn handle(&self) -> &B::ProgramHandle {
        &self.program
    }

    /// Uniform names this program does not declare; uploads to them are no-ops.
    pub fn missing_uniforms(&self) -> &[String] {
        &self.missing
    }

    /// Makes this program the target of subsequent uploads.
    pub fn use_program(&self) {
        self.backend.bind_program(&self.program);
    }

    pub fn set_model(&self, model: &Mat4) {
        self.upload(self.uniforms.model.as_ref(), UniformValue::Mat4(*model));
    }

    pub fn set_projection(&self, projection: &Mat4) {
        self.upload(
            self.uniforms.projection.as_ref(),
            UniformValue::Mat4(*projection),
        );
    }

    pub fn set_view(&self, view: &Mat4) {
        self.upload(self.uniforms.view.as_ref(), UniformValue::Mat4(*view));
    }

    pub fn set_eye_position(&self, position: Vec3) {
        self.upload(
            self.uniforms.eye_position.as_ref(),
            UniformValue::Vec3(position),
        );
    }

    pub fn set_material(&mut self, material: &Material) {
        bind_struct(
            &*self.backend,
            &self.uniforms.material,
            material,
            &mut self.scratch,
        );
    }

    pub fn set_directional_light(&mut self, light: &DirectionalLight) {
        bind_struct(
            &*self.backend,
            &self.uniforms.directional_light,
            light,
            &mut self.scratch,
        );
    }

    /// Uploads up to [`MAX_POINT_LIGHTS`] lights and returns how many were sent.
    pub fn set_point_lights(&mut self, lights: &[PointLight]) -> usize {
        bind_array(
            &*self.backend,
            self.uniforms.point_light_count.as_ref(),
            &self.uniforms.point_lights,
            lights,
            &mut self.scratch,
        )
    }

    /// Uploads up to [`MAX_SPOT_LIGHTS`] lights and returns how many were sent.
    pub fn set_spot_lights(&mut self, lights: &[SpotLight]) -> usize {
        bind_array(
            &*self.backend,
            self.uniforms.spot_light_count.as_ref(),
            &self.uniforms.spot_lights,
            lights,
            &mut self.scratch,
        )
    }

    fn upload(&self, location: Option<&B::Location>, value: UniformValue) {
        self.backend.upload_uniform(location, value);
    }
}

impl<B: ShaderBackend> Drop for ShaderProgram<B> {
    fn drop(&mut self) {
        self.backend.release_program(&self.program);
    }
}

fn compile<B: ShaderBackend>(
    backend: &B,
    stage: ShaderStage,
    source: &str,
) -> Result<B::CompiledStage, ShaderError> {
    backend.compile_stage(stage, source).map_err(|log| {
        error!("error compiling the {stage} shader: {log}");
        ShaderError::Compile { stage, log }
    })
}

/// Writes every field of `value` into the locations cached for `slot`.
fn bind_struct<B: ShaderBackend, S: UniformStruct>(
    backend: &B,
    slot: &StructSlot<B::Location>,
    value: &S,
    scratch: &mut Vec<UniformValue>,
) {
    scratch.clear();
    value.write_values(scratch);
    debug_assert_eq!(scratch.len(), slot.locations.len());
    for (location, value) in slot.locations.iter().zip(scratch.iter()) {
        backend.upload_uniform(location.as_ref(), *value);
    }
}

fn bind_array<B: ShaderBackend, S: Light + UniformStruct>(
    backend: &B,
    count_location: Option<&B::Location>,
    slots: &[StructSlot<B::Location>],
    lights: &[S],
    scratch: &mut Vec<UniformValue>,
) -> usize {
    let count = lights.len().min(slots.len());
    if count < lights.len() {
        debug!(
            "uploading {count} of {} lights, the shader holds {}",
            lights.len(),
            slots.len()
        );
    }
    backend.upload_uniform(count_location, UniformValue::Int(count as i32));
    for (slot, light) in slots.iter().zip(&lights[..count]) {
        bind_struct(backend, slot, light, scratch);
    }
    count
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::light::{Attenuation, LightBase};
    use crate::shader::DryRunBackend;

    const VERTEX: &str = r#"
        #version 330 core
        layout (location = 0) in vec3 pos;
        uniform mat4 model;
        uniform mat4 projection;
        uniform mat4 view;
        void main() { gl_Position = projection * view * model * vec4(pos, 1.0); }
    "#;

    const FRAGMENT: &str = r#"
        #version 330 core
        const int MAX_POINT_LIGHTS = 3;
        const int MAX_SPOT_LIGHTS = 3;
        struct Light { vec3 color; float ambientIntensity; float diffuseIntensity; };
        struct DirectionalLight { Light base; vec3 direction; };
        struct PointLight { Light base; vec3 position; float constant; float linear; float exponent; };
        struct SpotLight { PointLight base; vec3 direction; float edge; };
        struct Material { float specularIntensity; float shininess; };
        uniform int pointLightCount;
        uniform int spotLightCount;
        uniform DirectionalLight directionalLight;
        uniform PointLight pointLights[MAX_POINT_LIGHTS];
        uniform SpotLight spotLights[MAX_SPOT_LIGHTS];
        uniform Material material;
        uniform vec3 eyePosition;
        out vec4 colour;
        void main() { colour = vec4(1.0); }
    "#;

    fn build() -> (Rc<DryRunBackend>, ShaderProgram<DryRunBackend>) {
        let backend = Rc::new(DryRunBackend::new());
        let program = ShaderProgram::from_sources(Rc::clone(&backend), VERTEX, FRAGMENT).unwrap();
        (backend, program)
    }

    fn point_light(x: f32) -> PointLight {
        PointLight::new(
            LightBase::new(Vec3::new(0.0, 0.0, 1.0), 0.1, 0.1),
            Vec3::new(x, 0.0, 0.0),
            Attenuation::new(0.3, 0.2, 0.1),
        )
    }

    #[test]
    fn every_expected_uniform_resolves_against_matching_source() {
        let (_backend, program) = build();
        assert!(
            program.missing_uniforms().is_empty(),
            "{:?}",
            program.missing_uniforms()
        );
        let expected = expected_uniforms();
        assert!(expected.contains(&"pointLights[2].base.color".to_string()));
        assert!(expected.contains(&"spotLights[0].base.base.color".to_string()));
        assert!(expected.contains(&"directionalLight.base.ambientIntensity".to_string()));
        assert!(expected.contains(&"material.shininess".to_string()));
    }

    #[test]
    fn locations_are_resolved_once_at_link_time() {
        let (backend, mut program) = build();
        let lookups = backend.lookup_count();
        assert_eq!(lookups, expected_uniforms().len());

        program.use_program();
        program.set_point_lights(&[point_light(1.0), point_light(2.0)]);
        program.set_spot_lights(&[SpotLight::default()]);
        program.set_directional_light(&DirectionalLight::default());
        assert_eq!(backend.lookup_count(), lookups);
    }

    #[test]
    fn point_light_count_is_clamped_to_capacity() {
        let (backend, mut program) = build();
        let lights: Vec<PointLight> = (0..5).map(|i| point_light(i as f32)).collect();

        let sent = program.set_point_lights(&lights);

        assert_eq!(sent, MAX_POINT_LIGHTS);
        assert_eq!(
            backend.last_value(POINT_LIGHT_COUNT),
            Some(UniformValue::Int(MAX_POINT_LIGHTS as i32))
        );
        let writes = backend.writes();
        assert_eq!(
            writes.len(),
            1 + MAX_POINT_LIGHTS * PointLight::field_paths().len()
        );
        assert!(writes.iter().all(|write| write.name.is_some()));
        assert!(!writes
            .iter()
            .any(|write| write.name.as_deref().unwrap_or("").starts_with("pointLights[3]")));
    }

    #[test]
    fn spot_light_count_is_clamped_to_capacity() {
        let (backend, mut program) = build();
        let lights: Vec<SpotLight> = (0..5)
            .map(|i| SpotLight::new(point_light(i as f32), Vec3::NEG_Y, 20.0))
            .collect();

        let sent = program.set_spot_lights(&lights);

        assert_eq!(sent, MAX_SPOT_LIGHTS);
        assert_eq!(
            backend.last_value(SPOT_LIGHT_COUNT),
            Some(UniformValue::Int(MAX_SPOT_LIGHTS as i32))
        );
        let writes = backend.writes();
        assert_eq!(
            writes.len(),
            1 + MAX_SPOT_LIGHTS * SpotLight::field_paths().len()
        );
        assert!(!writes
            .iter()
            .any(|write| write.name.as_deref().unwrap_or("").starts_with("spotLights[3]")));
    }

    #[test]
    fn each_slot_receives_its_own_light() {
        let (backend, mut program) = build();
        program.set_point_lights(&[point_light(4.0), point_light(-4.0)]);
        assert_eq!(
            backend.last_value("pointLights[0].position"),
            Some(UniformValue::Vec3(Vec3::new(4.0, 0.0, 0.0)))
        );
        assert_eq!(
            backend.last_value("pointLights[1].position"),
            Some(UniformValue::Vec3(Vec3::new(-4.0, 0.0, 0.0)))
        );
        assert_eq!(backend.last_value("pointLights[2].position"), None);
        assert_eq!(
            backend.last_value("pointLights[1].base.color"),
            Some(UniformValue::Vec3(Vec3::new(0.0, 0.0, 1.0)))
        );
    }

    #[test]
    fn spot_lights_upload_processed_edge() {
        let (backend, mut program) = build();
        let spot = SpotLight::new(point_light(0.0), Vec3::NEG_Y, 60.0);
        program.set_spot_lights(&[spot]);
        match backend.last_value("spotLights[0].edge") {
            Some(UniformValue::Float(edge)) => assert!((edge - 0.5).abs() < 1e-6),
            other => panic!("unexpected edge upload: {other:?}"),
        }
        assert_eq!(
            backend.last_value("spotLights[0].base.constant"),
            Some(UniformValue::Float(0.3))
        );
    }

    #[test]
    fn invalid_fragment_stage_yields_no_program() {
        let backend = Rc::new(DryRunBackend::new());
        let result = ShaderProgram::from_sources(
            Rc::clone(&backend),
            VERTEX,
            "void main() { colour = vec4(1.0);",
        );
        match result {
            Err(ShaderError::Compile { stage, .. }) => assert_eq!(stage, ShaderStage::Fragment),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("invalid fragment stage produced a program"),
        }
        assert_eq!(backend.bound_program(), None);
        assert_eq!(backend.lookup_count(), 0);
    }

    #[test]
    fn bundled_shaders_build_with_reformatted_source() {
        let vertex = include_str!("../../shaders/shader.vert");
        let fragment = include_str!("../../shaders/shader.frag");
        let variants = [
            fragment.replacen("// ", "// (unclosed ", 1),
            fragment.replacen("void main()", "void\nmain()", 1),
        ];
        for variant in &variants {
            let backend = Rc::new(DryRunBackend::new());
            let program = ShaderProgram::from_sources(backend, vertex, variant);
            match program {
                Ok(program) => assert!(program.missing_uniforms().is_empty()),
                Err(err) => panic!("reformatted shader failed to build: {err}"),
            }
        }
    }

    #[test]
    fn link_failure_is_reported() {
        let backend = Rc::new(DryRunBackend::new());
        let fragment = "uniform vec3 model;\nvoid main() {}";
        let result = ShaderProgram::from_sources(backend, VERTEX, fragment);
        assert!(matches!(result, Err(ShaderError::Link { .. })));
    }

    #[test]
    fn missing_source_file_fails_compilation() {
        let backend = Rc::new(DryRunBackend::new());
        let mut fragment = NamedTempFile::new().unwrap();
        fragment.write_all(FRAGMENT.as_bytes()).unwrap();

        let result = ShaderProgram::from_files(
            backend,
            "definitely/not/here/shader.vert",
            fragment.path(),
        );
        assert!(matches!(
            result,
            Err(ShaderError::Compile {
                stage: ShaderStage::Vertex,
                ..
            })
        ));
    }

    #[test]
    fn undeclared_uniforms_are_reported_and_upload_nowhere() {
        let backend = Rc::new(DryRunBackend::new());
        let fragment = "uniform vec3 eyePosition;\nvoid main() {}";
        let mut program = ShaderProgram::from_sources(Rc::clone(&backend), VERTEX, fragment).unwrap();
        assert!(program
            .missing_uniforms()
            .contains(&"pointLights[0].position".to_string()));

        program.set_point_lights(&[point_light(1.0)]);
        assert!(backend.writes().iter().all(|write| write.name.is_none()));
    }

    #[test]
    fn dropping_the_program_releases_it() {
        let (backend, program) = build();
        let handle = *program.handle();
        program.use_program();
        assert_eq!(backend.bound_program(), Some(handle));
        drop(program);
        assert_eq!(backend.released_programs(), vec![handle]);
        assert_eq!(backend.bound_program(), None);
    }
}
