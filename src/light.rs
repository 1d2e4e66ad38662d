//! Light descriptors and the bounded lists that hold them.
//!
//! Every variant embeds a [`LightBase`] and mirrors the GLSL struct nesting
//! used by the fragment shader: a point light wraps the base light, a spot
//! light wraps a point light.

use std::ops::Index;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::CapacityError;
use crate::shader::uniform::{nested, UniformStruct, UniformValue};

/// Highest number of point lights the shader declares.
pub const MAX_POINT_LIGHTS: usize = 3;
/// Highest number of spot lights the shader declares.
pub const MAX_SPOT_LIGHTS: usize = 3;

/// Shared capability of every light variant: the colour and intensities the
/// shader reads from each struct's `base` member.
pub trait Light {
    fn base(&self) -> &LightBase;

    /// Pushes the base values in [`LightBase::field_paths`] order.
    fn write_base_values(&self, out: &mut Vec<UniformValue>) {
        out.push(UniformValue::Vec3(self.color()));
        out.push(UniformValue::Float(self.ambient_intensity()));
        out.push(UniformValue::Float(self.diffuse_intensity()));
    }

    fn color(&self) -> Vec3 {
        self.base().color
    }

    fn ambient_intensity(&self) -> f32 {
        self.base().ambient_intensity
    }

    fn diffuse_intensity(&self) -> f32 {
        self.base().diffuse_intensity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LightBase {
    pub color: Vec3,
    pub ambient_intensity: f32,
    pub diffuse_intensity: f32,
}

impl LightBase {
    pub fn new(color: Vec3, ambient_intensity: f32, diffuse_intensity: f32) -> Self {
        Self {
            color,
            ambient_intensity,
            diffuse_intensity,
        }
    }
}

impl UniformStruct for LightBase {
    fn field_paths() -> Vec<String> {
        vec![
            "color".into(),
            "ambientIntensity".into(),
            "diffuseIntensity".into(),
        ]
    }

    fn write_values(&self, out: &mut Vec<UniformValue>) {
        self.write_base_values(out);
    }
}

impl Light for LightBase {
    fn base(&self) -> &LightBase {
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub base: LightBase,
    pub direction: Vec3,
}

impl DirectionalLight {
    pub fn new(base: LightBase, direction: Vec3) -> Self {
        Self { base, direction }
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            base: LightBase::default(),
            direction: Vec3::NEG_Y,
        }
    }
}

impl Light for DirectionalLight {
    fn base(&self) -> &LightBase {
        &self.base
    }
}

impl UniformStruct for DirectionalLight {
    fn field_paths() -> Vec<String> {
        let mut paths = nested("base", LightBase::field_paths());
        paths.push("direction".into());
        paths
    }

    fn write_values(&self, out: &mut Vec<UniformValue>) {
        self.write_base_values(out);
        out.push(UniformValue::Vec3(self.direction));
    }
}

/// Distance falloff `1 / (exponent * d² + linear * d + constant)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub exponent: f32,
}

impl Attenuation {
    pub fn new(constant: f32, linear: f32, exponent: f32) -> Self {
        Self {
            constant,
            linear,
            exponent,
        }
    }
}

impl Default for Attenuation {
    fn default() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointLight {
    pub base: LightBase,
    pub position: Vec3,
    pub attenuation: Attenuation,
}

impl PointLight {
    pub fn new(base: LightBase, position: Vec3, attenuation: Attenuation) -> Self {
        Self {
            base,
            position,
            attenuation,
        }
    }
}

impl Light for PointLight {
    fn base(&self) -> &LightBase {
        &self.base
    }
}

impl UniformStruct for PointLight {
    fn field_paths() -> Vec<String> {
        let mut paths = nested("base", LightBase::field_paths());
        paths.extend(
            ["position", "constant", "linear", "exponent"]
                .into_iter()
                .map(String::from),
        );
        paths
    }

    fn write_values(&self, out: &mut Vec<UniformValue>) {
        self.write_base_values(out);
        out.push(UniformValue::Vec3(self.position));
        out.push(UniformValue::Float(self.attenuation.constant));
        out.push(UniformValue::Float(self.attenuation.linear));
        out.push(UniformValue::Float(self.attenuation.exponent));
    }
}

/// Point light restricted to a cone around `direction`.
///
/// `edge` is the cone half-angle in degrees; the shader receives its cosine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotLight {
    pub point: PointLight,
    direction: Vec3,
    pub edge: f32,
}

impl SpotLight {
    pub fn new(point: PointLight, direction: Vec3, edge: f32) -> Self {
        Self {
            point,
            direction: direction.normalize_or_zero(),
            edge,
        }
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn position(&self) -> Vec3 {
        self.point.position
    }

    /// Cosine of the edge angle, as compared against in the shader.
    pub fn processed_edge(&self) -> f32 {
        self.edge.to_radians().cos()
    }

    /// Re-aims the light, used to keep a flashlight attached to the camera.
    pub fn set_flash(&mut self, position: Vec3, direction: Vec3) {
        self.point.position = position;
        self.direction = direction.normalize_or_zero();
    }
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            point: PointLight::default(),
            direction: Vec3::NEG_Y,
            edge: 0.0,
        }
    }
}

impl Light for SpotLight {
    fn base(&self) -> &LightBase {
        &self.point.base
    }
}

impl UniformStruct for SpotLight {
    fn field_paths() -> Vec<String> {
        let mut paths = nested("base", PointLight::field_paths());
        paths.push("direction".into());
        paths.push("edge".into());
        paths
    }

    fn write_values(&self, out: &mut Vec<UniformValue>) {
        self.point.write_values(out);
        out.push(UniformValue::Vec3(self.direction));
        out.push(UniformValue::Float(self.processed_edge()));
    }
}

/// Light collection that refuses insertions past `N`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LightList<L, const N: usize> {
    lights: Vec<L>,
}

pub type PointLights = LightList<PointLight, MAX_POINT_LIGHTS>;
pub type SpotLights = LightList<SpotLight, MAX_SPOT_LIGHTS>;

impl<L, const N: usize> LightList<L, N> {
    pub fn new() -> Self {
        Self {
            lights: Vec::with_capacity(N),
        }
    }

    /// Appends a light and returns its slot index.
    pub fn push(&mut self, light: L) -> Result<usize, CapacityError> {
        if self.lights.len() >= N {
            return Err(CapacityError { capacity: N });
        }
        self.lights.push(light);
        Ok(self.lights.len() - 1)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut L> {
        self.lights.get_mut(index)
    }

    pub fn as_slice(&self) -> &[L] {
        &self.lights
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }
}

impl<L, const N: usize> Default for LightList<L, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L, const N: usize> Index<usize> for LightList<L, N> {
    type Output = L;

    fn index(&self, index: usize) -> &L {
        &self.lights[index]
    }
}
