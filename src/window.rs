use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Result;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::input::InputEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

pub trait AppLoop {
    fn draw(&mut self) -> Result<()>;

    fn input(&mut self, input: InputEvent) -> LoopControl {
        if input.is_exit() {
            LoopControl::Exit
        } else {
            LoopControl::Continue
        }
    }

    fn resized(&mut self, _new_size: PhysicalSize<u32>) {}
}

#[derive(Debug, Clone)]
pub struct App {
    title: String,
    frame_rate: f32,
    window_size: (u32, u32),
}

impl App {
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_framerate(mut self, frame_rate: f32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Minimum time between two drawn frames. A non-positive frame rate means no limit.
    pub fn frame_interval(&self) -> Duration {
        if self.frame_rate > 0.0 {
            Duration::from_secs_f32(1.0 / self.frame_rate)
        } else {
            Duration::ZERO
        }
    }

    /// Opens the window and hands it to `app_loop_init` once the platform is ready,
    /// then drives the returned [AppLoop] until it exits.
    pub fn run<T, F>(self, app_loop_init: F) -> Result<()>
    where
        T: AppLoop,
        F: FnOnce(Arc<Window>, &App) -> Result<T>,
    {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = Runner {
            app: self,
            init: Some(app_loop_init),
            window: None,
            app_loop: None,
            last_frame: Instant::now(),
            error: None,
        };
        event_loop.run_app(&mut runner)?;

        match runner.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct Runner<T, F> {
    app: App,
    init: Option<F>,
    window: Option<Arc<Window>>,
    app_loop: Option<T>,
    last_frame: Instant,
    error: Option<anyhow::Error>,
}

impl<T, F> Runner<T, F> {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{:#}", err);
        self.error = Some(err);
        event_loop.exit();
    }
}

impl<T, F> ApplicationHandler for Runner<T, F>
where
    T: AppLoop,
    F: FnOnce(Arc<Window>, &App) -> Result<T>,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(init) = self.init.take() else {
            return;
        };

        let (width, height) = self.app.window_size;
        let attributes = Window::default_attributes()
            .with_title(self.app.title.clone())
            .with_inner_size(PhysicalSize::new(width, height));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => return self.fail(event_loop, err.into()),
        };

        match init(window.clone(), &self.app) {
            Ok(app_loop) => {
                self.app_loop = Some(app_loop);
                self.window = Some(window);
                self.last_frame = Instant::now();
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(app_loop) = self.app_loop.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(new_size) => {
                log::debug!("resized {:?}", new_size);
                app_loop.resized(new_size);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(input) = InputEvent::keyboard_input(&event) {
                    if app_loop.input(input) == LoopControl::Exit {
                        event_loop.exit();
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                self.last_frame = Instant::now();
                if let Err(err) = app_loop.draw() {
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = self.window.as_ref() else {
            return;
        };

        let next_frame = self.last_frame + self.app.frame_interval();
        if Instant::now() >= next_frame {
            event_loop.set_control_flow(ControlFlow::Poll);
            window.request_redraw();
        } else {
            event_loop.set_control_flow(ControlFlow::WaitUntil(next_frame));
        }
    }
}

pub fn make_window() -> App {
    // a second call keeps the logger that is already installed
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    App {
        title: "glyphscroll".into(),
        frame_rate: 60.0,
        window_size: (1600, 1100),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use approx::assert_relative_eq;

    use super::make_window;

    #[test]
    fn frame_interval_follows_frame_rate() {
        let app = make_window().with_framerate(50.0);
        assert_relative_eq!(app.frame_interval().as_secs_f64(), 0.02, epsilon = 1e-6);
        assert_eq!(make_window().with_framerate(0.0).frame_interval(), Duration::ZERO);
    }

    #[test]
    fn builder_overrides_defaults() {
        let app = make_window()
            .with_title("scroller")
            .with_window_size((800, 600));
        assert_eq!(app.title(), "scroller");
        assert_eq!(app.window_size, (800, 600));
    }
}
