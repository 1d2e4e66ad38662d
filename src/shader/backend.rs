use std::fmt;

use glow::HasContext;

use crate::shader::{ShaderStage, UniformValue};

/// The GL entry points the shader binder relies on.
///
/// A missing uniform is represented by `None`; uploading to `None` must be a
/// silent no-op, as it is in GL.
pub trait ShaderBackend {
    type CompiledStage;
    type ProgramHandle;
    type Location: Clone + fmt::Debug;

    /// Compiles one stage, returning the info log on failure.
    fn compile_stage(&self, stage: ShaderStage, source: &str) -> Result<Self::CompiledStage, String>;

    /// Links two compiled stages, returning the info log on failure.
    fn link_stages(
        &self,
        vertex: &Self::CompiledStage,
        fragment: &Self::CompiledStage,
    ) -> Result<Self::ProgramHandle, String>;

    fn release_stage(&self, shader: Self::CompiledStage);

    fn release_program(&self, program: &Self::ProgramHandle);

    fn locate_uniform(&self, program: &Self::ProgramHandle, name: &str) -> Option<Self::Location>;

    fn bind_program(&self, program: &Self::ProgramHandle);

    fn upload_uniform(&self, location: Option<&Self::Location>, value: UniformValue);
}

impl ShaderBackend for glow::Context {
    type CompiledStage = <glow::Context as HasContext>::Shader;
    type ProgramHandle = <glow::Context as HasContext>::Program;
    type Location = <glow::Context as HasContext>::UniformLocation;

    fn compile_stage(&self, stage: ShaderStage, source: &str) -> Result<Self::CompiledStage, String> {
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe {
            let shader = self.create_shader(kind)?;
            self.shader_source(shader, source);
            self.compile_shader(shader);
            if self.get_shader_compile_status(shader) {
                Ok(shader)
            } else {
                let log = self.get_shader_info_log(shader);
                self.delete_shader(shader);
                Err(log)
            }
        }
    }

    fn link_stages(
        &self,
        vertex: &Self::CompiledStage,
        fragment: &Self::CompiledStage,
    ) -> Result<Self::ProgramHandle, String> {
        unsafe {
            let program = self.create_program()?;
            self.attach_shader(program, *vertex);
            self.attach_shader(program, *fragment);
            self.link_program(program);
            self.detach_shader(program, *vertex);
            self.detach_shader(program, *fragment);
            if self.get_program_link_status(program) {
                Ok(program)
            } else {
                let log = self.get_program_info_log(program);
                self.delete_program(program);
                Err(log)
            }
        }
    }

    fn release_stage(&self, shader: Self::CompiledStage) {
        unsafe { self.delete_shader(shader) }
    }

    fn release_program(&self, program: &Self::ProgramHandle) {
        unsafe { self.delete_program(*program) }
    }

    fn locate_uniform(&self, program: &Self::ProgramHandle, name: &str) -> Option<Self::Location> {
        unsafe { self.get_uniform_location(*program, name) }
    }

    fn bind_program(&self, program: &Self::ProgramHandle) {
        unsafe { self.use_program(Some(*program)) }
    }

    fn upload_uniform(&self, location: Option<&Self::Location>, value: UniformValue) {
        unsafe {
            match value {
                UniformValue::Int(v) => self.uniform_1_i32(location, v),
                UniformValue::Float(v) => self.uniform_1_f32(location, v),
                UniformValue::Vec3(v) => self.uniform_3_f32(location, v.x, v.y, v.z),
                UniformValue::Mat4(m) => {
                    self.uniform_matrix_4_f32_slice(location, false, &m.to_cols_array())
                }
            }
        }
    }
}
