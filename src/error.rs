use std::path::PathBuf;

use thiserror::Error;

use crate::shader::ShaderStage;

/// Rejections from the normal averaging pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("index count {index_count} is not a multiple of 3")]
    IncompleteTriangle { index_count: usize },
    #[error("index {index} is out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds { index: u32, vertex_count: usize },
    #[error("normal slot at offset {normal_offset} does not fit a stride of {stride}")]
    NormalSlotOutOfRange { normal_offset: usize, stride: usize },
    #[error("vertex buffer of {len} floats is not a multiple of the stride {stride}")]
    RaggedVertexBuffer { len: usize, stride: usize },
}

/// Failures while building a shader program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShaderError {
    #[error("failed to compile the {stage} shader: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("failed to link the shader program: {log}")]
    Link { log: String },
}

/// A light list is already at its fixed capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("light list is full ({capacity} slots)")]
pub struct CapacityError {
    pub capacity: usize,
}

/// Failures while reading a scene description.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("unable to read scene file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scene XML")]
    Xml(#[from] roxmltree::Error),
    #[error("<{tag}> is missing the `{attribute}` attribute")]
    MissingAttribute { tag: String, attribute: &'static str },
    #[error("<{parent}> is missing a <{tag}> element")]
    MissingElement { parent: String, tag: &'static str },
    #[error("<{tag}>{value}</{tag}> is not a valid {expected}")]
    InvalidValue {
        tag: String,
        value: String,
        expected: &'static str,
    },
    #[error("object `{object}` references unknown {kind} `{name}`")]
    UnknownReference {
        object: String,
        kind: &'static str,
        name: String,
    },
}
