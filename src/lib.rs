//! Glimmer, a small OpenGL renderer with Phong lighting.
//!
//! A scene holds one directional light plus a bounded set of point and spot
//! lights, textured meshes with smoothed normals, and a first-person camera.
//! Everything that does not need a live GL context (normal averaging, light
//! descriptors, the uniform binder running against [`shader::DryRunBackend`],
//! scene loading) is usable and testable headless.

pub mod app;
pub mod camera;
pub mod error;
pub mod gpu;
pub mod input;
pub mod light;
pub mod material;
pub mod mesh;
pub mod render;
pub mod scene;
pub mod shader;
pub mod time;
pub mod window;

pub use camera::{Camera, Projection};
pub use error::{CapacityError, GeometryError, SceneError, ShaderError};
pub use input::{InputState, KeyCode, NamedKey};
pub use light::{
    Attenuation, DirectionalLight, Light, LightBase, LightList, PointLight, SpotLight,
    MAX_POINT_LIGHTS, MAX_SPOT_LIGHTS,
};
pub use material::Material;
pub use mesh::{calculate_average_normals, MeshData, Vertex};
pub use render::Renderer;
pub use scene::{MeshKind, Scene, SceneObject};
pub use shader::{DryRunBackend, ShaderBackend, ShaderProgram, ShaderStage};
pub use window::WindowInitError;
