use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{Context, Result};
use glam::Mat4;
use glow::HasContext;
use log::{info, warn};

use crate::camera::Camera;
use crate::gpu::{Mesh, Texture, TextureImage};
use crate::scene::{MeshKind, Scene, SceneObject};
use crate::shader::ShaderProgram;

const CLEAR_COLOR: [f32; 4] = [0.1, 0.1, 0.1, 1.0];

/// Owns every GL object the scene draws with and issues one frame at a time.
pub struct Renderer {
    gl: Rc<glow::Context>,
    program: ShaderProgram<glow::Context>,
    meshes: HashMap<MeshKind, Mesh>,
    textures: HashMap<String, Texture>,
    fallback_texture: Texture,
    projection: Mat4,
}

impl Renderer {
    /// Compiles the scene's shaders and uploads its meshes and textures.
    pub fn new(gl: Rc<glow::Context>, scene: &Scene) -> Result<Self> {
        let program = ShaderProgram::from_files(
            Rc::clone(&gl),
            &scene.shaders.vertex,
            &scene.shaders.fragment,
        )
        .context("failed to build the shader program")?;

        let mut meshes = HashMap::new();
        for object in &scene.objects {
            if meshes.contains_key(&object.mesh) {
                continue;
            }
            let mesh = Mesh::upload(Rc::clone(&gl), &object.mesh.build())
                .with_context(|| format!("failed to upload the {} mesh", object.mesh))?;
            meshes.insert(object.mesh, mesh);
        }

        let mut textures = HashMap::new();
        for (name, path) in &scene.textures {
            let image = TextureImage::load_or_white(path);
            let texture = Texture::upload(Rc::clone(&gl), &image)
                .with_context(|| format!("failed to upload texture {name}"))?;
            textures.insert(name.clone(), texture);
        }
        let fallback_texture = Texture::upload(Rc::clone(&gl), &TextureImage::white())
            .context("failed to upload the fallback texture")?;

        unsafe {
            gl.enable(glow::DEPTH_TEST);
            let [r, g, b, a] = CLEAR_COLOR;
            gl.clear_color(r, g, b, a);
        }
        info!(
            "renderer ready: {} meshes, {} textures",
            meshes.len(),
            textures.len()
        );

        Ok(Self {
            gl,
            program,
            meshes,
            textures,
            fallback_texture,
            projection: Mat4::IDENTITY,
        })
    }

    /// Matches the viewport and projection to a framebuffer size.
    pub fn resize(&mut self, scene: &Scene, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        unsafe {
            self.gl.viewport(0, 0, width as i32, height as i32);
        }
        self.projection = scene.projection.matrix(width as f32 / height as f32);
    }

    /// Draws one frame: lights, camera matrices, then every object.
    pub fn render_frame(&mut self, scene: &mut Scene, camera: &Camera) {
        unsafe {
            self.gl
                .clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        self.program.use_program();
        scene.apply_lighting(&mut self.program, camera);

        self.program.set_projection(&self.projection);
        self.program.set_view(&camera.view_matrix());
        self.program.set_eye_position(camera.position());

        for object in &scene.objects {
            self.draw_object(scene, object);
        }
    }

    fn draw_object(&mut self, scene: &Scene, object: &SceneObject) {
        let Some(mesh) = self.meshes.get(&object.mesh) else {
            return;
        };
        self.program
            .set_model(&Mat4::from_translation(object.position));

        let texture = object
            .texture
            .as_ref()
            .and_then(|name| self.textures.get(name))
            .unwrap_or(&self.fallback_texture);
        texture.bind();

        match scene.materials.get(&object.material) {
            Some(material) => self.program.set_material(material),
            None => warn!(
                "object {} uses unknown material {}",
                object.name, object.material
            ),
        }
        mesh.draw();
    }
}
