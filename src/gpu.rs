//! GL-side resources: uploaded meshes and textures.

use std::path::Path;
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use glow::HasContext;
use log::{debug, warn};

use crate::mesh::{MeshData, Vertex};

const FLOAT_SIZE: i32 = std::mem::size_of::<f32>() as i32;

/// Indexed triangle mesh living in a VAO with its vertex and index buffers.
pub struct Mesh {
    gl: Rc<glow::Context>,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
    index_count: i32,
}

impl Mesh {
    /// Uploads `data` and describes the [`Vertex`] layout to GL: attribute 0
    /// is the position, 1 the texture coordinate and 2 the normal.
    pub fn upload(gl: Rc<glow::Context>, data: &MeshData) -> Result<Self> {
        let index_count = i32::try_from(data.index_count())
            .context("mesh has more indices than GL can draw in one call")?;
        let stride = Vertex::STRIDE as i32 * FLOAT_SIZE;

        unsafe {
            let vao = gl.create_vertex_array().map_err(|err| anyhow!(err))?;
            let vbo = gl.create_buffer().map_err(|err| anyhow!(err))?;
            let ebo = gl.create_buffer().map_err(|err| anyhow!(err))?;

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&data.vertices),
                glow::STATIC_DRAW,
            );
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(&data.indices),
                glow::STATIC_DRAW,
            );

            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(
                1,
                2,
                glow::FLOAT,
                false,
                stride,
                Vertex::UV_OFFSET as i32 * FLOAT_SIZE,
            );
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(
                2,
                3,
                glow::FLOAT,
                false,
                stride,
                Vertex::NORMAL_OFFSET as i32 * FLOAT_SIZE,
            );
            gl.enable_vertex_attrib_array(2);

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);

            debug!(
                "uploaded mesh with {} vertices and {index_count} indices",
                data.vertices.len()
            );
            Ok(Self {
                gl,
                vao,
                vbo,
                ebo,
                index_count,
            })
        }
    }

    pub fn draw(&self) {
        unsafe {
            self.gl.bind_vertex_array(Some(self.vao));
            self.gl
                .draw_elements(glow::TRIANGLES, self.index_count, glow::UNSIGNED_INT, 0);
            self.gl.bind_vertex_array(None);
        }
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.ebo);
            self.gl.delete_buffer(self.vbo);
            self.gl.delete_vertex_array(self.vao);
        }
    }
}

/// Decoded RGBA8 pixels ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    pub fn load(path: &Path) -> Result<Self> {
        let image = image::open(path)
            .with_context(|| format!("failed to decode texture {}", path.display()))?
            .to_rgba8();
        let (width, height) = image.dimensions();
        Ok(Self {
            width,
            height,
            pixels: image.into_raw(),
        })
    }

    /// Single opaque white texel, used when a texture cannot be loaded.
    pub fn white() -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![255; 4],
        }
    }

    /// Loads `path`, logging and substituting [`TextureImage::white`] on failure.
    pub fn load_or_white(path: &Path) -> Self {
        match Self::load(path) {
            Ok(image) => image,
            Err(err) => {
                warn!("{err:#}; using a plain white texture");
                Self::white()
            }
        }
    }
}

/// 2D texture sampled through texture unit 0.
pub struct Texture {
    gl: Rc<glow::Context>,
    texture: glow::Texture,
}

impl Texture {
    pub fn upload(gl: Rc<glow::Context>, image: &TextureImage) -> Result<Self> {
        let width = i32::try_from(image.width).context("texture is too wide")?;
        let height = i32::try_from(image.height).context("texture is too tall")?;
        unsafe {
            let texture = gl.create_texture().map_err(|err| anyhow!(err))?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR_MIPMAP_LINEAR as i32,
            );
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                width,
                height,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                Some(&image.pixels),
            );
            gl.generate_mipmap(glow::TEXTURE_2D);
            gl.bind_texture(glow::TEXTURE_2D, None);
            Ok(Self { gl, texture })
        }
    }

    /// Binds to texture unit 0, the unit `theTexture` samples from.
    pub fn bind(&self) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(self.texture));
        }
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe { self.gl.delete_texture(self.texture) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_png_as_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.png");
        let mut image = image::RgbImage::new(2, 1);
        image.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        image.put_pixel(1, 0, image::Rgb([0, 0, 255]));
        image.save(&path).unwrap();

        let loaded = TextureImage::load(&path).unwrap();
        assert_eq!((loaded.width, loaded.height), (2, 1));
        assert_eq!(loaded.pixels, vec![255, 0, 0, 255, 0, 0, 255, 255]);
    }

    #[test]
    fn unreadable_texture_falls_back_to_white() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.png");
        assert!(TextureImage::load(&path).is_err());
        assert_eq!(TextureImage::load_or_white(&path), TextureImage::white());
    }

    #[test]
    fn bundled_textures_decode() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("textures");
        for name in ["brick", "dirt", "plain"] {
            let image = TextureImage::load(&root.join(format!("{name}.png"))).unwrap();
            assert_eq!(image.pixels.len(), (image.width * image.height * 4) as usize);
        }
    }
}
