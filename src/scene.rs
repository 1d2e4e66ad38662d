//! Scene description: window, shaders, camera, lights, materials, textures
//! and the objects to draw.
//!
//! Scenes are read from XML where every value is the text of a child element:
//!
//! ```xml
//! <scene>
//!     <spot-light flashlight="true">
//!         <color>1 1 1</color>
//!         <diffuse>1</diffuse>
//!         <attenuation>0.3 0.2 0.1</attenuation>
//!         <edge>20</edge>
//!     </spot-light>
//!     <material name="shiny"><specular-intensity>5</specular-intensity><shininess>32</shininess></material>
//!     <object name="floor"><mesh>floor</mesh><material>shiny</material></object>
//! </scene>
//! ```
//!
//! Anything left out falls back to the built-in demo values, and file paths
//! are resolved against the scene file's directory.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use glam::Vec3;
use log::{debug, warn};
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::camera::{Camera, Projection};
use crate::error::SceneError;
use crate::light::{
    Attenuation, DirectionalLight, LightBase, LightList, PointLight, PointLights, SpotLight,
    SpotLights,
};
use crate::material::Material;
use crate::mesh::{self, MeshData};
use crate::shader::{ShaderBackend, ShaderProgram};

/// Offset from the eye to the flashlight, so the beam starts just below the view.
const FLASHLIGHT_OFFSET: Vec3 = Vec3::new(0.0, -0.1, 0.0);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub window: WindowConfig,
    pub shaders: ShaderPaths,
    pub camera: CameraConfig,
    pub projection: Projection,
    pub directional_light: DirectionalLight,
    pub point_lights: PointLights,
    pub spot_lights: SpotLights,
    /// Index into `spot_lights` of the light that follows the camera.
    pub flashlight: Option<usize>,
    pub materials: BTreeMap<String, Material>,
    pub textures: BTreeMap<String, PathBuf>,
    pub objects: Vec<SceneObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1366,
            height: 768,
            title: "Glimmer".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

impl ShaderPaths {
    fn relative_to(base_dir: &Path) -> Self {
        Self {
            vertex: base_dir.join("shaders/shader.vert"),
            fragment: base_dir.join("shaders/shader.frag"),
        }
    }
}

/// Starting pose and speeds of the first-person camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub position: Vec3,
    pub world_up: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub move_speed: f32,
    pub turn_speed: f32,
}

impl CameraConfig {
    pub fn build(&self) -> Camera {
        Camera::new(
            self.position,
            self.world_up,
            self.yaw,
            self.pitch,
            self.move_speed,
            self.turn_speed,
        )
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.4, 2.5),
            world_up: Vec3::Y,
            yaw: -90.0,
            pitch: -12.0,
            move_speed: 5.0,
            turn_speed: 0.2,
        }
    }
}

/// Built-in geometry an object can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshKind {
    Pyramid,
    Floor,
}

impl MeshKind {
    pub fn build(self) -> MeshData {
        match self {
            MeshKind::Pyramid => mesh::pyramid(),
            MeshKind::Floor => mesh::floor(),
        }
    }
}

impl FromStr for MeshKind {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, ()> {
        match value {
            "pyramid" => Ok(MeshKind::Pyramid),
            "floor" => Ok(MeshKind::Floor),
            _ => Err(()),
        }
    }
}

impl fmt::Display for MeshKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MeshKind::Pyramid => "pyramid",
            MeshKind::Floor => "floor",
        })
    }
}

/// One draw: a built-in mesh placed in the world with a texture and material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    pub mesh: MeshKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<String>,
    pub material: String,
    #[serde(default)]
    pub position: Vec3,
}

impl Scene {
    /// Reads and parses a scene file; relative paths inside it resolve
    /// against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let xml = fs::read_to_string(path).map_err(|source| SceneError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_xml(&xml, base_dir)
    }

    /// The demo scene: a pyramid over a dirt floor lit by one directional
    /// light, two point lights, a fixed spot light and a flashlight.
    pub fn demo(base_dir: &Path) -> Self {
        let mut point_lights = PointLights::new();
        let mut spot_lights = SpotLights::new();
        for light in demo_point_lights() {
            push_light(&mut point_lights, light, "point");
        }
        for light in demo_spot_lights() {
            push_light(&mut spot_lights, light, "spot");
        }

        let materials = BTreeMap::from([
            ("shiny".to_string(), Material::new(5.0, 32.0)),
            ("dull".to_string(), Material::new(0.3, 4.0)),
        ]);
        let textures = ["brick", "dirt", "plain"]
            .into_iter()
            .map(|name| (name.to_string(), base_dir.join(format!("textures/{name}.png"))))
            .collect();
        let objects = vec![
            SceneObject {
                name: "pyramid".to_string(),
                mesh: MeshKind::Pyramid,
                texture: Some("plain".to_string()),
                material: "shiny".to_string(),
                position: Vec3::ZERO,
            },
            SceneObject {
                name: "floor".to_string(),
                mesh: MeshKind::Floor,
                texture: Some("dirt".to_string()),
                material: "shiny".to_string(),
                position: Vec3::new(0.0, -1.0, 0.0),
            },
        ];

        Self {
            window: WindowConfig::default(),
            shaders: ShaderPaths::relative_to(base_dir),
            camera: CameraConfig::default(),
            projection: Projection::default(),
            directional_light: DirectionalLight::new(
                LightBase::new(Vec3::ONE, 0.3, 0.1),
                Vec3::new(2.0, -1.0, -2.0),
            ),
            point_lights,
            spot_lights,
            flashlight: Some(1),
            materials,
            textures,
            objects,
        }
    }

    /// Parses scene XML. Sections that are absent keep the demo values;
    /// light and object lists replace the demo lists when any entry is given.
    pub fn from_xml(xml: &str, base_dir: &Path) -> Result<Self, SceneError> {
        let document = Document::parse(xml)?;
        let root = document.root_element();
        let mut scene = Self::demo(base_dir);

        if let Some(node) = child(&root, "window") {
            scene.window.width = parse_or(&node, "width", scene.window.width)?;
            scene.window.height = parse_or(&node, "height", scene.window.height)?;
            if let Some(title) = optional_text(&node, "title") {
                scene.window.title = title;
            }
        }

        if let Some(node) = child(&root, "shaders") {
            if let Some(vertex) = optional_text(&node, "vertex") {
                scene.shaders.vertex = base_dir.join(vertex);
            }
            if let Some(fragment) = optional_text(&node, "fragment") {
                scene.shaders.fragment = base_dir.join(fragment);
            }
        }

        if let Some(node) = child(&root, "camera") {
            let camera = &mut scene.camera;
            camera.position = parse_vec3_or(&node, "position", camera.position)?;
            camera.world_up = parse_vec3_or(&node, "up", camera.world_up)?;
            camera.yaw = parse_or(&node, "yaw", camera.yaw)?;
            camera.pitch = parse_or(&node, "pitch", camera.pitch)?;
            camera.move_speed = parse_or(&node, "move-speed", camera.move_speed)?;
            camera.turn_speed = parse_or(&node, "turn-speed", camera.turn_speed)?;
            let projection = &mut scene.projection;
            projection.fov_degrees = parse_or(&node, "fov", projection.fov_degrees)?;
            projection.near = parse_or(&node, "near", projection.near)?;
            projection.far = parse_or(&node, "far", projection.far)?;
        }

        if let Some(node) = child(&root, "directional-light") {
            scene.directional_light = DirectionalLight::new(
                parse_light_base(&node)?,
                parse_vec3_or(&node, "direction", Vec3::NEG_Y)?,
            );
        }

        let point_nodes: Vec<_> = children(&root, "point-light").collect();
        if !point_nodes.is_empty() {
            scene.point_lights = LightList::new();
            for node in &point_nodes {
                push_light(&mut scene.point_lights, parse_point_light(node)?, "point");
            }
        }

        let spot_nodes: Vec<_> = children(&root, "spot-light").collect();
        if !spot_nodes.is_empty() {
            scene.spot_lights = LightList::new();
            scene.flashlight = None;
            for node in &spot_nodes {
                let point = parse_point_light(node)?;
                let light = SpotLight::new(
                    point,
                    parse_vec3_or(node, "direction", Vec3::NEG_Y)?,
                    parse_or(node, "edge", 0.0)?,
                );
                let Some(index) = push_light(&mut scene.spot_lights, light, "spot") else {
                    continue;
                };
                if node.attribute("flashlight") == Some("true") {
                    if let Some(previous) = scene.flashlight.replace(index) {
                        warn!("spot light {index} replaces spot light {previous} as the flashlight");
                    }
                }
            }
        }

        for node in children(&root, "material") {
            let name = required_attribute(&node, "name")?;
            let material = Material::new(
                parse_or(&node, "specular-intensity", 0.0)?,
                parse_or(&node, "shininess", 0.0)?,
            );
            scene.materials.insert(name, material);
        }

        for node in children(&root, "texture") {
            let name = required_attribute(&node, "name")?;
            let path = node_text(&node).ok_or_else(|| SceneError::InvalidValue {
                tag: "texture".to_string(),
                value: String::new(),
                expected: "texture path",
            })?;
            scene.textures.insert(name, base_dir.join(path));
        }

        let object_nodes: Vec<_> = children(&root, "object").collect();
        if !object_nodes.is_empty() {
            scene.objects = object_nodes
                .iter()
                .map(parse_object)
                .collect::<Result<_, _>>()?;
        }

        scene.validate()?;
        debug!(
            "parsed scene with {} objects, {} point lights, {} spot lights",
            scene.objects.len(),
            scene.point_lights.len(),
            scene.spot_lights.len()
        );
        Ok(scene)
    }

    /// The camera in its configured starting pose.
    pub fn camera(&self) -> Camera {
        self.camera.build()
    }

    /// Re-aims the flashlight from `camera` and uploads every light to
    /// `program`. The program must be bound.
    pub fn apply_lighting<B: ShaderBackend>(
        &mut self,
        program: &mut ShaderProgram<B>,
        camera: &Camera,
    ) {
        if let Some(flashlight) = self.flashlight.and_then(|i| self.spot_lights.get_mut(i)) {
            flashlight.set_flash(camera.position() + FLASHLIGHT_OFFSET, camera.direction());
        }
        program.set_directional_light(&self.directional_light);
        program.set_point_lights(self.point_lights.as_slice());
        program.set_spot_lights(self.spot_lights.as_slice());
    }

    fn validate(&self) -> Result<(), SceneError> {
        for object in &self.objects {
            if !self.materials.contains_key(&object.material) {
                return Err(SceneError::UnknownReference {
                    object: object.name.clone(),
                    kind: "material",
                    name: object.material.clone(),
                });
            }
            if let Some(texture) = &object.texture {
                if !self.textures.contains_key(texture) {
                    return Err(SceneError::UnknownReference {
                        object: object.name.clone(),
                        kind: "texture",
                        name: texture.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::demo(Path::new(""))
    }
}

fn demo_point_lights() -> [PointLight; 2] {
    [
        PointLight::new(
            LightBase::new(Vec3::new(0.0, 0.0, 1.0), 0.1, 0.1),
            Vec3::new(4.0, 0.0, 0.0),
            Attenuation::new(0.3, 0.2, 0.1),
        ),
        PointLight::new(
            LightBase::new(Vec3::new(0.0, 1.0, 0.0), 0.1, 0.1),
            Vec3::new(-4.0, 2.0, 0.0),
            Attenuation::new(0.3, 0.1, 0.1),
        ),
    ]
}

fn demo_spot_lights() -> [SpotLight; 2] {
    [
        SpotLight::new(
            PointLight::new(
                LightBase::new(Vec3::new(0.0, 0.0, 1.0), 0.1, 1.0),
                Vec3::new(4.0, 0.0, 0.0),
                Attenuation::new(1.0, 0.0, 0.0),
            ),
            Vec3::NEG_Y,
            20.0,
        ),
        SpotLight::new(
            PointLight::new(
                LightBase::new(Vec3::ONE, 0.0, 1.0),
                Vec3::new(2.0, 0.9, 0.0),
                Attenuation::new(0.3, 0.2, 0.1),
            ),
            Vec3::new(-1.0, -0.5, 0.0),
            20.0,
        ),
    ]
}

/// Appends to a bounded list, logging and dropping lights past capacity.
fn push_light<L, const N: usize>(
    list: &mut LightList<L, N>,
    light: L,
    kind: &str,
) -> Option<usize> {
    match list.push(light) {
        Ok(index) => Some(index),
        Err(err) => {
            warn!("ignoring {kind} light: {err}");
            None
        }
    }
}

fn parse_light_base(node: &Node<'_, '_>) -> Result<LightBase, SceneError> {
    Ok(LightBase::new(
        parse_vec3_or(node, "color", Vec3::ONE)?,
        parse_or(node, "ambient", 0.0)?,
        parse_or(node, "diffuse", 0.0)?,
    ))
}

fn parse_point_light(node: &Node<'_, '_>) -> Result<PointLight, SceneError> {
    let attenuation = match optional_text(node, "attenuation") {
        Some(text) => {
            let [constant, linear, exponent] = parse_components(&text, "attenuation")?;
            Attenuation::new(constant, linear, exponent)
        }
        None => Attenuation::default(),
    };
    Ok(PointLight::new(
        parse_light_base(node)?,
        parse_vec3_or(node, "position", Vec3::ZERO)?,
        attenuation,
    ))
}

fn parse_object(node: &Node<'_, '_>) -> Result<SceneObject, SceneError> {
    let name = required_attribute(node, "name")?;
    let mesh_text = required_text(node, "mesh")?;
    let mesh = mesh_text
        .parse::<MeshKind>()
        .map_err(|()| SceneError::InvalidValue {
            tag: "mesh".to_string(),
            value: mesh_text.clone(),
            expected: "mesh kind (pyramid or floor)",
        })?;
    Ok(SceneObject {
        name,
        mesh,
        texture: optional_text(node, "texture"),
        material: required_text(node, "material")?,
        position: parse_vec3_or(node, "position", Vec3::ZERO)?,
    })
}

fn child<'a, 'input>(node: &Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(tag))
}

fn children<'a, 'input: 'a>(
    node: &Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |child| child.has_tag_name(tag))
}

fn node_text(node: &Node<'_, '_>) -> Option<String> {
    node.text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    child(node, tag).and_then(|child| node_text(&child))
}

fn required_text(node: &Node<'_, '_>, tag: &'static str) -> Result<String, SceneError> {
    optional_text(node, tag).ok_or_else(|| SceneError::MissingElement {
        parent: node.tag_name().name().to_string(),
        tag,
    })
}

fn required_attribute(node: &Node<'_, '_>, attribute: &'static str) -> Result<String, SceneError> {
    node.attribute(attribute)
        .map(str::to_string)
        .ok_or_else(|| SceneError::MissingAttribute {
            tag: node.tag_name().name().to_string(),
            attribute,
        })
}

fn parse_or<T: FromStr>(node: &Node<'_, '_>, tag: &str, default: T) -> Result<T, SceneError> {
    let Some(value) = optional_text(node, tag) else {
        return Ok(default);
    };
    value.parse::<T>().map_err(|_| SceneError::InvalidValue {
        tag: tag.to_string(),
        value,
        expected: "number",
    })
}

fn parse_vec3_or(node: &Node<'_, '_>, tag: &str, default: Vec3) -> Result<Vec3, SceneError> {
    match optional_text(node, tag) {
        Some(value) => parse_components(&value, tag).map(Vec3::from_array),
        None => Ok(default),
    }
}

fn parse_components(value: &str, tag: &str) -> Result<[f32; 3], SceneError> {
    let invalid = || SceneError::InvalidValue {
        tag: tag.to_string(),
        value: value.to_string(),
        expected: "list of three numbers",
    };
    let mut numbers = value.split_whitespace().map(str::parse::<f32>);
    let mut components = [0.0; 3];
    for component in &mut components {
        *component = numbers.next().ok_or_else(invalid)?.map_err(|_| invalid())?;
    }
    if numbers.next().is_some() {
        return Err(invalid());
    }
    Ok(components)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::rc::Rc;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::light::{MAX_POINT_LIGHTS, MAX_SPOT_LIGHTS};
    use crate::shader::{DryRunBackend, UniformValue};

    const SAMPLE: &str = r#"
    <scene>
        <window><width>640</width><height>480</height><title>Test</title></window>
        <shaders><vertex>glsl/a.vert</vertex><fragment>glsl/a.frag</fragment></shaders>
        <camera><position>0 1 5</position><yaw>-45</yaw><fov>60</fov></camera>
        <directional-light>
            <color>1 0.5 0</color>
            <ambient>0.2</ambient>
            <diffuse>0.4</diffuse>
            <direction>0 -1 -1</direction>
        </directional-light>
        <point-light>
            <color>0 0 1</color>
            <position>1 2 3</position>
            <attenuation>0.3 0.2 0.1</attenuation>
        </point-light>
        <spot-light>
            <position>4 0 0</position>
            <edge>30</edge>
        </spot-light>
        <spot-light flashlight="true">
            <diffuse>1</diffuse>
            <edge>20</edge>
        </spot-light>
        <material name="matte"><specular-intensity>0.1</specular-intensity><shininess>2</shininess></material>
        <texture name="stone">img/stone.png</texture>
        <object name="base">
            <mesh>floor</mesh>
            <texture>stone</texture>
            <material>matte</material>
            <position>0 -2 0</position>
        </object>
    </scene>
    "#;

    #[test]
    fn parses_every_section() {
        let scene = Scene::from_xml(SAMPLE, Path::new("assets")).unwrap();
        assert_eq!(scene.window.width, 640);
        assert_eq!(scene.window.title, "Test");
        assert_eq!(scene.shaders.vertex, Path::new("assets/glsl/a.vert"));
        assert_eq!(scene.camera.position, Vec3::new(0.0, 1.0, 5.0));
        assert_eq!(scene.camera.yaw, -45.0);
        assert_eq!(scene.camera.pitch, -12.0);
        assert_eq!(scene.projection.fov_degrees, 60.0);

        assert_eq!(scene.directional_light.base.color, Vec3::new(1.0, 0.5, 0.0));
        assert_eq!(scene.point_lights.len(), 1);
        assert_eq!(
            scene.point_lights[0].attenuation,
            Attenuation::new(0.3, 0.2, 0.1)
        );
        assert_eq!(scene.spot_lights.len(), 2);
        assert_eq!(scene.flashlight, Some(1));
        assert_eq!(scene.spot_lights[0].edge, 30.0);

        assert_eq!(scene.materials["matte"], Material::new(0.1, 2.0));
        assert!(scene.materials.contains_key("shiny"));
        assert_eq!(scene.textures["stone"], Path::new("assets/img/stone.png"));
        assert_eq!(scene.objects.len(), 1);
        assert_eq!(scene.objects[0].mesh, MeshKind::Floor);
        assert_eq!(scene.objects[0].position, Vec3::new(0.0, -2.0, 0.0));
    }

    #[test]
    fn empty_scene_keeps_the_demo() {
        let scene = Scene::from_xml("<scene/>", Path::new("")).unwrap();
        assert_eq!(scene, Scene::default());
        assert_eq!(scene.point_lights.len(), 2);
        assert_eq!(scene.spot_lights.len(), 2);
        assert_eq!(scene.flashlight, Some(1));
        assert_eq!(scene.objects.len(), 2);
    }

    #[test]
    fn lights_past_capacity_are_dropped() {
        let lights = "<point-light><position>1 0 0</position></point-light>".repeat(5);
        let spots = "<spot-light flashlight=\"true\"/>".repeat(MAX_SPOT_LIGHTS + 1);
        let xml = format!("<scene>{lights}{spots}</scene>");
        let scene = Scene::from_xml(&xml, Path::new("")).unwrap();
        assert_eq!(scene.point_lights.len(), MAX_POINT_LIGHTS);
        assert_eq!(scene.spot_lights.len(), MAX_SPOT_LIGHTS);
        assert_eq!(scene.flashlight, Some(MAX_SPOT_LIGHTS - 1));
    }

    #[test]
    fn unknown_material_is_rejected() {
        let xml = r#"<scene><object name="x"><mesh>pyramid</mesh><material>gold</material></object></scene>"#;
        let err = Scene::from_xml(xml, Path::new("")).unwrap_err();
        assert!(matches!(
            err,
            SceneError::UnknownReference { kind: "material", .. }
        ));
    }

    #[test]
    fn malformed_values_are_reported() {
        let xml = "<scene><camera><position>0 1</position></camera></scene>";
        assert!(matches!(
            Scene::from_xml(xml, Path::new("")),
            Err(SceneError::InvalidValue { .. })
        ));

        let xml = r#"<scene><object name="x"><mesh>cube</mesh><material>shiny</material></object></scene>"#;
        assert!(matches!(
            Scene::from_xml(xml, Path::new("")),
            Err(SceneError::InvalidValue { .. })
        ));

        let xml = "<scene><object name=\"x\"><material>shiny</material></object></scene>";
        assert!(matches!(
            Scene::from_xml(xml, Path::new("")),
            Err(SceneError::MissingElement { tag: "mesh", .. })
        ));
    }

    #[test]
    fn load_resolves_paths_next_to_the_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"<scene/>").unwrap();
        let scene = Scene::load(file.path()).unwrap();
        let dir = file.path().parent().unwrap();
        assert_eq!(scene.shaders.fragment, dir.join("shaders/shader.frag"));
        assert_eq!(scene.textures["dirt"], dir.join("textures/dirt.png"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        assert!(matches!(
            Scene::load("no/such/scene.xml"),
            Err(SceneError::Read { .. })
        ));
    }

    #[test]
    fn apply_lighting_reaims_the_flashlight() {
        let backend = Rc::new(DryRunBackend::new());
        let vertex = include_str!("../shaders/shader.vert");
        let fragment = include_str!("../shaders/shader.frag");
        let mut program = ShaderProgram::from_sources(Rc::clone(&backend), vertex, fragment).unwrap();
        let mut scene = Scene::default();
        let camera = scene.camera();

        program.use_program();
        scene.apply_lighting(&mut program, &camera);

        let flashlight = scene.spot_lights[1];
        assert_eq!(flashlight.position(), camera.position() + FLASHLIGHT_OFFSET);
        assert!((flashlight.direction() - camera.direction()).length() < 1e-6);
        assert_eq!(
            backend.last_value("spotLights[1].base.position"),
            Some(UniformValue::Vec3(camera.position() + FLASHLIGHT_OFFSET))
        );
        assert_eq!(
            backend.last_value("pointLightCount"),
            Some(UniformValue::Int(2))
        );
        assert_eq!(
            backend.last_value("directionalLight.direction"),
            Some(UniformValue::Vec3(Vec3::new(2.0, -1.0, -2.0)))
        );
        // The fixed spot light is untouched.
        assert_eq!(scene.spot_lights[0].position(), Vec3::new(4.0, 0.0, 0.0));
    }
}
