//! Interactive frame loop.

use std::rc::Rc;

use anyhow::Result;
use log::{debug, info};
use winit::event::{DeviceEvent, ElementState, Event, KeyboardInput, WindowEvent};
use winit::event_loop::ControlFlow;
use winit::platform::run_return::EventLoopExtRunReturn;

use crate::camera::Camera;
use crate::input::{InputState, KeyCode};
use crate::render::Renderer;
use crate::scene::Scene;
use crate::time::{FpsCounter, FrameClock};
use crate::window::{create_event_loop, GraphicsContext};

/// Opens a window for `scene` and renders until it is closed or Escape is
/// pressed.
///
/// Display failures are returned as [`crate::window::WindowInitError`] so the
/// caller can fall back to headless operation.
pub fn run(scene: Scene) -> Result<()> {
    let mut event_loop = create_event_loop()?;
    let graphics = GraphicsContext::new(&event_loop, &scene.window)?;
    let mut renderer = Renderer::new(Rc::clone(graphics.gl()), &scene)?;
    let size = graphics.framebuffer_size();
    renderer.resize(&scene, size.width, size.height);

    let camera = scene.camera();
    let mut app = AppState {
        renderer,
        graphics,
        camera,
        scene,
        input: InputState::new(),
        clock: FrameClock::new(),
        fps: FpsCounter::starting_at(std::time::Instant::now()),
        last_error: None,
    };

    event_loop.run_return(|event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        if let Err(err) = app.process_event(&event, control_flow) {
            app.last_error = Some(err);
            control_flow.set_exit();
        }
    });

    match app.last_error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

// GL objects held by `renderer` must be released while the context is alive,
// so it is declared (and dropped) before `graphics`.
struct AppState {
    renderer: Renderer,
    graphics: GraphicsContext,
    camera: Camera,
    scene: Scene,
    input: InputState,
    clock: FrameClock,
    fps: FpsCounter,
    last_error: Option<anyhow::Error>,
}

impl AppState {
    fn process_event(&mut self, event: &Event<()>, control_flow: &mut ControlFlow) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.graphics.window().id() => {
                match event {
                    WindowEvent::CloseRequested => control_flow.set_exit(),
                    WindowEvent::Resized(size) => self.resize(size.width, size.height),
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        self.resize(new_inner_size.width, new_inner_size.height)
                    }
                    WindowEvent::KeyboardInput { input, .. } => {
                        if self.handle_keyboard(input) {
                            control_flow.set_exit();
                        }
                    }
                    WindowEvent::Focused(false) => self.input.release_all(),
                    _ => {}
                }
            }
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta },
                ..
            } => {
                self.input.record_mouse_motion(delta.0 as f32, delta.1 as f32);
            }
            Event::MainEventsCleared => self.graphics.window().request_redraw(),
            Event::RedrawRequested(window_id) if *window_id == self.graphics.window().id() => {
                self.frame()?;
            }
            _ => {}
        }
        Ok(())
    }

    fn frame(&mut self) -> Result<()> {
        let time = self.clock.tick();
        self.camera.key_control(&self.input, time.dt);
        self.camera.mouse_control(self.input.take_mouse_delta());

        self.renderer.render_frame(&mut self.scene, &self.camera);
        self.graphics.swap_buffers()?;

        if let Some(fps) = self.fps.record(time.now) {
            info!("FPS: {fps:.1}");
        }
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        debug!("framebuffer resized to {width}x{height}");
        self.graphics.resize(winit::dpi::PhysicalSize::new(width, height));
        self.renderer.resize(&self.scene, width, height);
    }

    /// Updates key state and reports whether Escape was pressed.
    fn handle_keyboard(&mut self, input: &KeyboardInput) -> bool {
        let Some(key) = input.virtual_keycode.and_then(KeyCode::from_winit) else {
            return false;
        };
        match input.state {
            ElementState::Pressed => {
                self.input.set_key_down(key);
                key == KeyCode::ESCAPE
            }
            ElementState::Released => {
                self.input.set_key_up(key);
                false
            }
        }
    }
}
