use std::env;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use log::info;

use glimmer::shader::expected_uniforms;
use glimmer::{DryRunBackend, Scene, ShaderProgram, WindowInitError};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;
    let scene = match &options.scene {
        Some(path) => Scene::load(path)
            .with_context(|| format!("failed to load scene {}", path.display()))?,
        None => {
            info!("no scene file given, using the built-in demo scene");
            Scene::default()
        }
    };

    if options.dump_scene {
        println!(
            "{}",
            serde_json::to_string_pretty(&scene).context("failed to serialize scene")?
        );
        if !options.summary_only {
            return Ok(());
        }
    }

    if options.summary_only {
        return run_headless(scene);
    }

    let headless_scene = scene.clone();
    match glimmer::app::run(scene) {
        Ok(()) => Ok(()),
        Err(err) => {
            if err.downcast_ref::<WindowInitError>().is_some() {
                eprintln!(
                    "{err}. Falling back to --summary-only mode (set DISPLAY or install GL drivers to enable rendering)."
                );
                run_headless(headless_scene)
            } else {
                Err(err)
            }
        }
    }
}

/// Prints the scene and checks its shaders against the uniforms the renderer
/// uploads, without opening a window.
fn run_headless(mut scene: Scene) -> Result<()> {
    print_summary(&scene);

    let backend = Rc::new(DryRunBackend::new());
    let mut program = ShaderProgram::from_files(
        Rc::clone(&backend),
        &scene.shaders.vertex,
        &scene.shaders.fragment,
    )
    .context("failed to build the shader program")?;

    let expected = expected_uniforms().len();
    let missing = program.missing_uniforms();
    println!(
        "Shader uniforms: {}/{} resolved",
        expected - missing.len(),
        expected
    );
    for name in missing {
        println!(" - missing {name}");
    }

    let camera = scene.camera();
    program.use_program();
    scene.apply_lighting(&mut program, &camera);
    let uploads = backend.writes().len();
    println!("Lighting uploads per frame: {uploads}");
    Ok(())
}

fn print_summary(scene: &Scene) {
    println!(
        "Loaded scene with {} objects ({} point lights, {} spot lights)",
        scene.objects.len(),
        scene.point_lights.len(),
        scene.spot_lights.len()
    );
    for object in &scene.objects {
        println!(
            " - {} ({}, material {}, texture {})",
            object.name,
            object.mesh,
            object.material,
            object.texture.as_deref().unwrap_or("none")
        );
    }
    if let Some(index) = scene.flashlight {
        println!("Flashlight: spot light {index}");
    }
}

#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    scene: Option<PathBuf>,
    summary_only: bool,
    dump_scene: bool,
}

impl CliOptions {
    fn parse(args: impl Iterator<Item = String>) -> Result<Self> {
        let mut options = Self::default();
        for arg in args {
            match arg.as_str() {
                "--summary-only" => options.summary_only = true,
                "--dump-scene" => options.dump_scene = true,
                other if other.starts_with("--") => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Expected --summary-only or --dump-scene"
                    ));
                }
                path => {
                    if options.scene.is_some() {
                        return Err(anyhow!(
                            "Usage: glimmer [scene.xml] [--summary-only] [--dump-scene]"
                        ));
                    }
                    options.scene = Some(PathBuf::from(path));
                }
            }
        }
        Ok(options)
    }
}
