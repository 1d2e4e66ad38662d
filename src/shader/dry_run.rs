//! A backend that builds programs without a GL context.
//!
//! Sources are checked structurally and their uniforms are reflected, so
//! locations resolve exactly when the source declares the name. Every upload is
//! recorded, which lets the headless summary and the tests see what a frame
//! would send to the GPU.

use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, HashMap};

use crate::shader::reflect::{declared_uniforms, strip_comments, tokenize, DeclaredUniforms};
use crate::shader::{ShaderBackend, ShaderStage, UniformValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DryRunStage(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DryRunProgram(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DryRunLocation(u32);

/// One recorded uniform upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformWrite {
    /// Resolved name, `None` when the upload targeted a missing uniform.
    pub name: Option<String>,
    pub value: UniformValue,
}

#[derive(Debug, Default)]
struct State {
    next_handle: u32,
    stages: HashMap<DryRunStage, (ShaderStage, DeclaredUniforms)>,
    programs: HashMap<DryRunProgram, DeclaredUniforms>,
    locations: BTreeMap<u32, String>,
    bound: Option<DryRunProgram>,
    writes: Vec<UniformWrite>,
    lookups: usize,
    released_programs: Vec<DryRunProgram>,
}

impl State {
    fn handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }
}

#[derive(Debug, Default)]
pub struct DryRunBackend {
    state: RefCell<State>,
}

impl DryRunBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads recorded since creation.
    pub fn writes(&self) -> Ref<'_, [UniformWrite]> {
        Ref::map(self.state.borrow(), |state| state.writes.as_slice())
    }

    /// Most recent value written to `name`.
    pub fn last_value(&self, name: &str) -> Option<UniformValue> {
        self.state
            .borrow()
            .writes
            .iter()
            .rev()
            .find(|write| write.name.as_deref() == Some(name))
            .map(|write| write.value)
    }

    /// Number of `locate_uniform` calls served so far.
    pub fn lookup_count(&self) -> usize {
        self.state.borrow().lookups
    }

    pub fn bound_program(&self) -> Option<DryRunProgram> {
        self.state.borrow().bound
    }

    pub fn released_programs(&self) -> Vec<DryRunProgram> {
        self.state.borrow().released_programs.clone()
    }
}

impl ShaderBackend for DryRunBackend {
    type CompiledStage = DryRunStage;
    type ProgramHandle = DryRunProgram;
    type Location = DryRunLocation;

    fn compile_stage(&self, stage: ShaderStage, source: &str) -> Result<DryRunStage, String> {
        check_structure(source)?;
        let uniforms = declared_uniforms(source).map_err(|err| format!("0:0: error: {err}"))?;
        let mut state = self.state.borrow_mut();
        let handle = DryRunStage(state.handle());
        state.stages.insert(handle, (stage, uniforms));
        Ok(handle)
    }

    fn link_stages(
        &self,
        vertex: &DryRunStage,
        fragment: &DryRunStage,
    ) -> Result<DryRunProgram, String> {
        let mut state = self.state.borrow_mut();
        let (vertex_kind, vertex_uniforms) = state
            .stages
            .get(vertex)
            .cloned()
            .ok_or_else(|| "vertex shader object is not valid".to_string())?;
        let (fragment_kind, fragment_uniforms) = state
            .stages
            .get(fragment)
            .cloned()
            .ok_or_else(|| "fragment shader object is not valid".to_string())?;
        if vertex_kind != ShaderStage::Vertex || fragment_kind != ShaderStage::Fragment {
            return Err("program needs one vertex and one fragment shader".to_string());
        }

        let mut merged = vertex_uniforms;
        for (name, ty) in fragment_uniforms {
            match merged.get(&name) {
                Some(existing) if *existing != ty => {
                    return Err(format!(
                        "error: uniform `{name}` declared as `{existing}` and `{ty}`"
                    ));
                }
                _ => {
                    merged.insert(name, ty);
                }
            }
        }

        let handle = DryRunProgram(state.handle());
        state.programs.insert(handle, merged);
        Ok(handle)
    }

    fn release_stage(&self, shader: DryRunStage) {
        self.state.borrow_mut().stages.remove(&shader);
    }

    fn release_program(&self, program: &DryRunProgram) {
        let mut state = self.state.borrow_mut();
        state.programs.remove(program);
        state.released_programs.push(*program);
        if state.bound == Some(*program) {
            state.bound = None;
        }
    }

    fn locate_uniform(&self, program: &DryRunProgram, name: &str) -> Option<DryRunLocation> {
        let mut state = self.state.borrow_mut();
        state.lookups += 1;
        if !state.programs.get(program)?.contains_key(name) {
            return None;
        }
        let id = state.handle();
        state.locations.insert(id, name.to_string());
        Some(DryRunLocation(id))
    }

    fn bind_program(&self, program: &DryRunProgram) {
        self.state.borrow_mut().bound = Some(*program);
    }

    fn upload_uniform(&self, location: Option<&DryRunLocation>, value: UniformValue) {
        let mut state = self.state.borrow_mut();
        let name = location.and_then(|location| state.locations.get(&location.0).cloned());
        state.writes.push(UniformWrite { name, value });
    }
}

/// Rejects sources a GLSL compiler would certainly refuse.
fn check_structure(source: &str) -> Result<(), String> {
    if source.trim().is_empty() {
        return Err("0:0: error: shader source is empty".to_string());
    }
    let tokens = tokenize(source, &mut HashMap::new());
    let has_entry_point = tokens
        .windows(3)
        .any(|window| window[0] == "void" && window[1] == "main" && window[2] == "(");
    if !has_entry_point {
        return Err("0:0: error: missing entry point `main`".to_string());
    }
    let mut depth: i64 = 0;
    for (line_no, line) in strip_comments(source).lines().enumerate() {
        if line.trim_start().starts_with('#') {
            continue;
        }
        for ch in line.chars() {
            match ch {
                '{' | '(' => depth += 1,
                '}' | ')' => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                return Err(format!("0:{}: error: unexpected `{ch}`", line_no + 1));
            }
        }
    }
    if depth != 0 {
        return Err("0:0: error: unexpected end of source".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = "uniform mat4 model;\nvoid main() { gl_Position = vec4(0.0); }";
    const FRAGMENT: &str = "uniform vec3 eyePosition;\nvoid main() {}";

    #[test]
    fn resolves_only_declared_uniforms() {
        let backend = DryRunBackend::new();
        let vertex = backend.compile_stage(ShaderStage::Vertex, VERTEX).unwrap();
        let fragment = backend
            .compile_stage(ShaderStage::Fragment, FRAGMENT)
            .unwrap();
        let program = backend.link_stages(&vertex, &fragment).unwrap();
        assert!(backend.locate_uniform(&program, "model").is_some());
        assert!(backend.locate_uniform(&program, "eyePosition").is_some());
        assert!(backend.locate_uniform(&program, "view").is_none());
        assert_eq!(backend.lookup_count(), 3);
    }

    #[test]
    fn unbalanced_source_fails_to_compile() {
        let backend = DryRunBackend::new();
        let err = backend
            .compile_stage(ShaderStage::Fragment, "void main() { ")
            .unwrap_err();
        assert!(err.contains("unexpected end"), "{err}");
    }

    #[test]
    fn brackets_inside_comments_are_ignored() {
        let backend = DryRunBackend::new();
        let source = "// fade (on the axis\nvoid main() {\n    /* ) } */\n}";
        assert!(backend.compile_stage(ShaderStage::Fragment, source).is_ok());
    }

    #[test]
    fn entry_point_may_span_lines() {
        let backend = DryRunBackend::new();
        assert!(backend
            .compile_stage(ShaderStage::Fragment, "void\nmain ()\n{\n}")
            .is_ok());
        let err = backend
            .compile_stage(ShaderStage::Fragment, "void mainImage() {}")
            .unwrap_err();
        assert!(err.contains("missing entry point"), "{err}");
    }

    #[test]
    fn conflicting_uniform_types_fail_to_link() {
        let backend = DryRunBackend::new();
        let vertex = backend.compile_stage(ShaderStage::Vertex, VERTEX).unwrap();
        let fragment = backend
            .compile_stage(ShaderStage::Fragment, "uniform float model;\nvoid main() {}")
            .unwrap();
        let err = backend.link_stages(&vertex, &fragment).unwrap_err();
        assert!(err.contains("model"), "{err}");
    }

    #[test]
    fn records_writes_to_missing_locations_without_a_name() {
        let backend = DryRunBackend::new();
        backend.upload_uniform(None, UniformValue::Int(4));
        assert_eq!(
            &*backend.writes(),
            &[UniformWrite {
                name: None,
                value: UniformValue::Int(4)
            }]
        );
    }
}
