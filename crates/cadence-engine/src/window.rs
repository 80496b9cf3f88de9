//! winit host: the repaint primitive is the window's `RedrawRequested` event.
//!
//! The runtime opens a single window, hands a scheduler to the caller, pumps
//! the frame loop on every redraw, and exits once the caller's signal resolves.

use std::rc::Rc;
use std::time::Instant;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::error::AnimError;
use crate::frame::{FrameLoop, FrameLoopConfig, LoopScheduler};
use crate::signal::{CompletionSignal, RunResult};
use crate::time::SystemClock;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub frames: FrameLoopConfig,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "cadence".to_string(),
            initial_size: LogicalSize::new(640.0, 360.0),
            frames: FrameLoopConfig::default(),
        }
    }
}

/// Entry point for the window host.
pub struct WindowRuntime;

impl WindowRuntime {
    /// Runs the event loop until the signal returned by `start` resolves or the
    /// window is closed.
    ///
    /// `start` is called once the window exists. Closing the window early
    /// yields `Err(AnimError::Abandoned)` as the run result.
    pub fn run<S>(config: WindowConfig, start: S) -> Result<RunResult>
    where
        S: FnOnce(&LoopScheduler, Rc<Window>) -> CompletionSignal,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = WindowState::new(config, start);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        if let Some(e) = state.error {
            return Err(e);
        }
        Ok(state.outcome.unwrap_or(Err(AnimError::Abandoned)))
    }
}

struct WindowState<S> {
    config: WindowConfig,
    frames: FrameLoop<SystemClock>,
    start: Option<S>,
    window: Option<Rc<Window>>,
    signal: Option<CompletionSignal>,
    outcome: Option<RunResult>,
    error: Option<anyhow::Error>,
}

impl<S> WindowState<S>
where
    S: FnOnce(&LoopScheduler, Rc<Window>) -> CompletionSignal,
{
    fn new(config: WindowConfig, start: S) -> Self {
        let frames = FrameLoop::with_config(SystemClock, config.frames.clone());
        Self {
            config,
            frames,
            start: Some(start),
            window: None,
            signal: None,
            outcome: None,
            error: None,
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<Rc<Window>> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;
        Ok(Rc::new(window))
    }

    /// Delivers one frame batch and checks whether the run has finished.
    fn on_redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.frames.pump();

        let Some(signal) = self.signal.as_mut() else {
            return;
        };
        if let Some(result) = signal.try_complete() {
            log::info!("animation finished; closing window");
            self.outcome = Some(result);
            event_loop.exit();
        }
    }
}

impl<S> ApplicationHandler for WindowState<S>
where
    S: FnOnce(&LoopScheduler, Rc<Window>) -> CompletionSignal,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match self.create_window(event_loop) {
            Ok(w) => w,
            Err(e) => {
                log::error!("{e:#}");
                self.error = Some(e);
                event_loop.exit();
                return;
            }
        };

        if let Some(start) = self.start.take() {
            let scheduler = self.frames.scheduler();
            self.signal = Some(start(&scheduler, Rc::clone(&window)));
        }

        window.request_redraw();
        self.window = Some(window);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.frames.pending() == 0 {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        }

        // Pace redraws to the loop's frame interval.
        let now = Instant::now();
        match self.frames.next_deadline() {
            Some(deadline) if deadline > now => {
                event_loop.set_control_flow(ControlFlow::WaitUntil(deadline));
            }
            _ => {
                event_loop.set_control_flow(ControlFlow::Wait);
                if let Some(w) = &self.window {
                    w.request_redraw();
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("window closed before the animation finished");
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => self.on_redraw(event_loop),
            _ => {}
        }
    }
}
