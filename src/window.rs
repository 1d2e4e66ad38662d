//! Window creation and the OpenGL context bound to it.

use std::any::Any;
use std::fmt;
use std::num::NonZeroU32;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use anyhow::Result;
use glutin::config::ConfigTemplateBuilder;
use glutin::context::{ContextApi, ContextAttributesBuilder, PossiblyCurrentContext, Version};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use log::{info, warn};
use raw_window_handle::HasRawWindowHandle;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event_loop::EventLoop;
use winit::window::{CursorGrabMode, Window, WindowBuilder};

use crate::scene::WindowConfig;

/// The display could not be opened; the caller may fall back to headless
/// operation.
#[derive(Debug)]
pub struct WindowInitError {
    message: String,
}

impl WindowInitError {
    pub fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    pub fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

/// Runs a display setup step, turning a panic inside it into a
/// [`WindowInitError`] for `stage`.
fn catch_init_panic<T>(stage: &str, step: impl FnOnce() -> T) -> Result<T, WindowInitError> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let result = panic::catch_unwind(AssertUnwindSafe(step));
    panic::set_hook(default_hook);
    result.map_err(|panic| WindowInitError::from_panic(stage, panic))
}

/// Creates the event loop. winit panics when no display is reachable.
pub fn create_event_loop() -> Result<EventLoop<()>, WindowInitError> {
    catch_init_panic("event loop", EventLoop::new)
}

/// A window with a current OpenGL 3.3 core context and the `glow` loader
/// built on it.
pub struct GraphicsContext {
    gl: Rc<glow::Context>,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    window: Window,
}

impl GraphicsContext {
    pub fn new(event_loop: &EventLoop<()>, config: &WindowConfig) -> Result<Self, WindowInitError> {
        let window_builder = WindowBuilder::new()
            .with_title(&config.title)
            .with_inner_size(LogicalSize::new(config.width, config.height));
        let template = ConfigTemplateBuilder::new().with_depth_size(24);
        // The config picker cannot return an error, so an empty config list
        // surfaces as a panic caught here.
        let (window, gl_config) = catch_init_panic("display", || {
            DisplayBuilder::new()
                .with_window_builder(Some(window_builder))
                .build(event_loop, template, |configs| {
                    configs
                        .reduce(|best, config| {
                            if config.num_samples() > best.num_samples() {
                                config
                            } else {
                                best
                            }
                        })
                        .expect("display reported no GL configs")
                })
        })?
        .map_err(|err| WindowInitError::from_error("display", err))?;
        let window =
            window.ok_or_else(|| WindowInitError::from_error("window", "no window was created"))?;

        let gl_display = gl_config.display();
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .build(Some(window.raw_window_handle()));
        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
            .map_err(|err| WindowInitError::from_error("GL context", err))?;

        let surface_attributes = window.build_surface_attributes(Default::default());
        let surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes) }
            .map_err(|err| WindowInitError::from_error("GL surface", err))?;
        let context = not_current
            .make_current(&surface)
            .map_err(|err| WindowInitError::from_error("GL context", err))?;

        // Uncapped frame rate so the FPS counter measures the renderer.
        if let Err(err) = surface.set_swap_interval(&context, SwapInterval::DontWait) {
            warn!("unable to disable vsync: {err}");
        }

        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|symbol| gl_display.get_proc_address(symbol))
        };
        info!(
            "OpenGL context ready ({} samples per pixel)",
            gl_config.num_samples()
        );

        let graphics = Self {
            gl: Rc::new(gl),
            surface,
            context,
            window,
        };
        graphics.capture_cursor();
        Ok(graphics)
    }

    pub fn gl(&self) -> &Rc<glow::Context> {
        &self.gl
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn framebuffer_size(&self) -> PhysicalSize<u32> {
        self.window.inner_size()
    }

    /// Resizes the default framebuffer. Zero sizes (minimised windows) are
    /// ignored.
    pub fn resize(&self, size: PhysicalSize<u32>) {
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return;
        };
        self.surface.resize(&self.context, width, height);
    }

    pub fn swap_buffers(&self) -> Result<()> {
        self.surface.swap_buffers(&self.context)?;
        Ok(())
    }

    /// Hides the pointer and keeps it inside the window so mouse motion can
    /// steer the camera freely.
    fn capture_cursor(&self) {
        let grabbed = self
            .window
            .set_cursor_grab(CursorGrabMode::Confined)
            .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Locked));
        if let Err(err) = grabbed {
            warn!("unable to grab the cursor: {err}");
        }
        self.window.set_cursor_visible(false);
    }
}
