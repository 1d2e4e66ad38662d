use serde::{Deserialize, Serialize};

use crate::shader::uniform::{UniformStruct, UniformValue};

/// Specular response of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Material {
    pub specular_intensity: f32,
    pub shininess: f32,
}

impl Material {
    pub fn new(specular_intensity: f32, shininess: f32) -> Self {
        Self {
            specular_intensity,
            shininess,
        }
    }
}

impl UniformStruct for Material {
    fn field_paths() -> Vec<String> {
        vec!["specularIntensity".into(), "shininess".into()]
    }

    fn write_values(&self, out: &mut Vec<UniformValue>) {
        out.push(UniformValue::Float(self.specular_intensity));
        out.push(UniformValue::Float(self.shininess));
    }
}
