//! Shader program construction and per-frame uniform uploads.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod backend;
pub mod dry_run;
pub mod program;
pub mod reflect;
pub mod uniform;

pub use backend::ShaderBackend;
pub use dry_run::{DryRunBackend, UniformWrite};
pub use program::{expected_uniforms, read_source, ShaderProgram};
pub use uniform::{UniformStruct, UniformValue};

/// Programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}
