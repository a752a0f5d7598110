mod egui_host;
mod input;
mod timing;

pub use egui_host::{EguiFrameOutput, EguiHost};

use crate::assets::upload::{UploadQueue, UploadTarget};
use crate::assets::TextureStore;
use crate::config::EditorConfig;
use crate::editor::EditorState;
use crate::render::{OrbitCamera, PaintOptions, RenderContext};
use crate::scene::{Background, SceneSession};
use crate::ui;
use input::InputState;
use timing::FrameTiming;

use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

const WINDOW_TITLE: &str = "Scenepaint";
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp", "tga"];

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

pub struct App {
    config: EditorConfig,
    window: Option<Arc<Window>>,
    egui: Option<EguiHost>,
    render: Option<RenderContext>,
    session: SceneSession,
    editor: EditorState,
    textures: TextureStore,
    uploads: UploadQueue,
    camera: OrbitCamera,
    paint_options: PaintOptions,
    input: InputState,
    timing: FrameTiming,
    target_frame_duration: Duration,
    next_frame_time: Instant,
}

impl App {
    fn new(config: EditorConfig) -> Self {
        let mut session = match config.seed {
            Some(seed) => SceneSession::with_seed(seed),
            None => SceneSession::new(),
        };
        session.set_background(Background::Color(config.background_rgb()));

        Self {
            editor: EditorState::new(config.paint_rgb()),
            paint_options: config.paint_options(),
            config,
            window: None,
            egui: None,
            render: None,
            session,
            textures: TextureStore::new(),
            uploads: UploadQueue::new(),
            camera: OrbitCamera::default(),
            input: InputState::default(),
            timing: FrameTiming::new(WINDOW_TITLE),
            target_frame_duration: Duration::from_millis(16),
            next_frame_time: Instant::now(),
        }
    }

    fn update_target_frame_duration(&mut self, window: &Window) {
        let mut target = Duration::from_millis(16);
        if let Some(millihz) = window
            .current_monitor()
            .and_then(|monitor| monitor.refresh_rate_millihertz())
        {
            let hz = millihz as f32 / 1000.0;
            if hz > 1.0 {
                target = Duration::from_secs_f32(1.0 / hz);
            }
        }
        self.target_frame_duration = target;
        self.next_frame_time = Instant::now() + self.target_frame_duration;
    }

    fn frame(&mut self) {
        let Some(window) = self.window.clone() else {
            return;
        };
        let frame_start = Instant::now();
        self.timing.update(Some(&window), frame_start);

        for outcome in self.uploads.poll() {
            self.editor
                .complete_upload(&mut self.session, &mut self.textures, outcome);
        }
        self.camera
            .update_movement(&self.input.movement(), self.timing.frame_dt);
        self.session.sync_auxiliaries();

        let Some(egui) = self.egui.as_mut() else {
            return;
        };
        self.textures.upload_pending(egui.context());

        let mut actions = Vec::new();
        let output = egui.run_ui(&window, |ctx| {
            actions = ui::show_panels(
                ctx,
                &self.session,
                &self.editor,
                &self.textures,
                self.uploads.in_flight(),
            );
            ui::show_viewport(
                ctx,
                &mut self.camera,
                &mut self.session,
                &mut self.editor,
                &self.textures,
                &self.paint_options,
            );
        });
        self.timing.set_paint_time(frame_start.elapsed());

        if output.wants_keyboard_input {
            self.input.release_all();
        }
        if let Some(render) = self.render.as_mut() {
            render.present(&output);
        }

        for action in actions {
            if let Some(target) = ui::apply_action(action, &mut self.session, &mut self.editor) {
                self.pick_and_read(target);
            }
        }
    }

    fn pick_and_read(&mut self, target: UploadTarget) {
        let Some(path) = rfd::FileDialog::new()
            .set_title(target.label())
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
        else {
            return;
        };
        self.uploads.spawn_read(target, path);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(
                self.config.window_width.max(320),
                self.config.window_height.max(240),
            ))
            .with_resizable(true);

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("Failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        match RenderContext::new(window.clone()) {
            Ok(render) => self.render = Some(render),
            Err(err) => {
                log::error!("Failed to initialise renderer: {err}");
                event_loop.exit();
                return;
            }
        }
        self.egui = Some(EguiHost::new(&window));
        self.update_target_frame_duration(&window);
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };
        let consumed = self
            .egui
            .as_mut()
            .is_some_and(|egui| egui.on_window_event(&window, &event));

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Focused(false) => {
                self.input.release_all();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let pressed = event.state == ElementState::Pressed;
                let keyboard_taken = self
                    .egui
                    .as_ref()
                    .is_some_and(|egui| egui.wants_keyboard_input());
                if !pressed || !(consumed || keyboard_taken) {
                    self.input.handle_key(event.physical_key, pressed);
                }
            }
            WindowEvent::Resized(new_size) => {
                if let Some(render) = self.render.as_mut() {
                    render.resize(new_size);
                }
                self.update_target_frame_duration(&window);
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(render) = self.render.as_mut() {
                    render.resize(window.inner_size());
                }
            }
            WindowEvent::Moved(_) => {
                self.update_target_frame_duration(&window);
            }
            WindowEvent::RedrawRequested => {
                self.frame();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_frame_time {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
            self.next_frame_time = now + self.target_frame_duration;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame_time));
    }
}

pub fn run() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("{WINDOW_TITLE} starting");
    let config = EditorConfig::from_env();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    log::info!("Goodbye");
    Ok(())
}
