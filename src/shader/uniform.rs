use glam::{Mat4, Vec3};

/// A single value pushed through one uniform upload call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3(Vec3),
    Mat4(Mat4),
}

/// A value that maps onto a GLSL struct uniform.
///
/// Implementors list their member paths relative to the struct root (for
/// example `base.color`) and emit their values in the same order. Paths are
/// resolved once after linking; values are emitted every frame.
pub trait UniformStruct {
    /// Member paths relative to the struct root, in upload order.
    fn field_paths() -> Vec<String>;

    /// Appends the member values in the order of [`UniformStruct::field_paths`].
    fn write_values(&self, out: &mut Vec<UniformValue>);
}

/// Name of element `index` of a uniform array, e.g. `pointLights[2]`.
pub fn element_name(array: &str, index: usize) -> String {
    format!("{array}[{index}]")
}

/// Name of a struct member, e.g. `pointLights[2].base.color`.
pub fn member_name(root: &str, path: &str) -> String {
    format!("{root}.{path}")
}

/// Prefixes every path with `prefix.`, used when a struct embeds another.
pub fn nested(prefix: &str, paths: Vec<String>) -> Vec<String> {
    paths
        .into_iter()
        .map(|path| member_name(prefix, &path))
        .collect()
}
