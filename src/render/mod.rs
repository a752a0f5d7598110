mod camera;
pub mod gizmo;
mod light_helpers;
pub mod pick;
pub mod scene_painter;

pub use camera::{CameraMovement, OrbitCamera, ScreenProjector};
pub use gizmo::{GizmoAxis, TransformGizmo, TransformMode};
pub use pick::raycast;
pub use scene_painter::{paint_scene, PaintOptions};

use crate::app::EguiFrameOutput;
use egui_wgpu::wgpu;
use std::sync::Arc;
use winit::dpi::PhysicalSize;
use winit::window::Window;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    SurfaceCreateFailed(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible graphics adapter found")]
    AdapterUnavailable,
    #[error("failed to create device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),
    #[error("surface is not supported by the adapter")]
    SurfaceUnsupported,
}

/// Window surface plus the egui renderer that draws every frame into it.
pub struct RenderContext {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    egui_renderer: egui_wgpu::Renderer,
}

impl RenderContext {
    pub fn new(window: Arc<Window>) -> Result<Self, RenderError> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window)?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        }))
        .ok_or(RenderError::AdapterUnavailable)?;
        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("scenepaint_device"),
                ..Default::default()
            },
            None,
        ))?;

        let mut config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .ok_or(RenderError::SurfaceUnsupported)?;
        let capabilities = surface.get_capabilities(&adapter);
        // egui expects a non-sRGB target when it blends in gamma space
        if let Some(format) = capabilities.formats.iter().find(|f| !f.is_srgb()) {
            config.format = *format;
        }
        surface.configure(&device, &config);

        let egui_renderer = egui_wgpu::Renderer::new(&device, config.format, None, 1, false);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            egui_renderer,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    pub fn present(&mut self, frame: &EguiFrameOutput) {
        for (id, delta) in &frame.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, delta);
        }

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                self.free_textures(frame);
                return;
            }
            Err(err) => {
                log::error!("Surface error: {err}");
                self.free_textures(frame);
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: frame.pixels_per_point,
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        let mut command_buffers = self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &frame.clipped_primitives,
            &screen_descriptor,
        );
        {
            let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });
            let mut pass = pass.forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &frame.clipped_primitives, &screen_descriptor);
        }
        command_buffers.push(encoder.finish());
        self.queue.submit(command_buffers);
        output.present();

        self.free_textures(frame);
    }

    fn free_textures(&mut self, frame: &EguiFrameOutput) {
        for id in &frame.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}
