//! ImGui integration with wgpu and winit
//!
//! Owns the ImGui context, its winit platform glue and the wgpu renderer.
//! Input is fed in per window event; each frame the UI is built with
//! [`UiManager::update_logic`] and drawn over the scene with
//! [`UiManager::render_display_only`].

use std::time::Instant;

use imgui::{Context, FontConfig, FontSource, MouseCursor};
use imgui_wgpu::{Renderer, RendererConfig};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use wgpu::{CommandEncoder, Device, Queue, TextureFormat, TextureView};
use winit::{
    event::{ElementState, Event, WindowEvent},
    window::{Window, WindowId},
};

const FONT_SIZE: f32 = 18.0;

pub struct UiManager {
    context: Context,
    platform: WinitPlatform,
    renderer: Renderer,
    last_frame: Instant,
    last_cursor: Option<MouseCursor>,
}

impl UiManager {
    pub fn new(
        device: &Device,
        queue: &Queue,
        output_color_format: TextureFormat,
        window: &Window,
    ) -> Self {
        let mut context = Context::create();
        context.set_ini_filename(None);

        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(context.io_mut(), window, HiDpiMode::Default);

        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: FONT_SIZE,
                ..Default::default()
            }),
        }]);

        let renderer_config = RendererConfig {
            texture_format: output_color_format,
            ..Default::default()
        };
        let renderer = Renderer::new(&mut context, device, queue, renderer_config);

        Self {
            context,
            platform,
            renderer,
            last_frame: Instant::now(),
            last_cursor: None,
        }
    }

    /// Feeds an input event to ImGui. Returns true when ImGui captured it,
    /// in which case the event should not reach the camera.
    pub fn handle_input(&mut self, window: &Window, window_id: WindowId, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { .. }
            | WindowEvent::MouseInput { .. }
            | WindowEvent::MouseWheel { .. }
            | WindowEvent::KeyboardInput { .. }
            | WindowEvent::ModifiersChanged(_)
            | WindowEvent::Focused(_)
            | WindowEvent::Resized(_)
            | WindowEvent::ScaleFactorChanged { .. } => {
                let wrapped: Event<()> = Event::WindowEvent {
                    window_id,
                    event: event.clone(),
                };
                self.platform
                    .handle_event(self.context.io_mut(), window, &wrapped);
                let io = self.context.io();
                is_captured(event, io.want_capture_mouse, io.want_capture_keyboard)
            }
            _ => false,
        }
    }

    /// Starts a UI frame, builds it with `run_ui` and returns what the
    /// builder returned.
    pub fn update_logic<F, R>(&mut self, window: &Window, run_ui: F) -> R
    where
        F: FnOnce(&imgui::Ui) -> R,
    {
        let now = Instant::now();
        self.context
            .io_mut()
            .update_delta_time(now - self.last_frame);
        self.last_frame = now;

        if let Err(e) = self.platform.prepare_frame(self.context.io_mut(), window) {
            log::warn!("Failed to prepare UI frame: {e}");
        }

        let ui = self.context.frame();
        let result = run_ui(ui);

        if self.last_cursor != ui.mouse_cursor() {
            self.last_cursor = ui.mouse_cursor();
            self.platform.prepare_render(ui, window);
        }

        result
    }

    /// Draws the UI built by the last [`UiManager::update_logic`] on top of
    /// `color_attachment`, keeping what is already there.
    pub fn render_display_only(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        color_attachment: &TextureView,
    ) {
        let draw_data = self.context.render();
        if draw_data.display_size[0] <= 0.0 || draw_data.display_size[1] <= 0.0 {
            return;
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("imgui_render_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_attachment,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Err(e) = self
            .renderer
            .render(draw_data, queue, device, &mut render_pass)
        {
            log::error!("Failed to render UI: {e:?}");
        }
    }
}

/// Mouse events are checked against ImGui's mouse capture and key events
/// against its keyboard capture. Button releases are never captured, so a
/// drag that started over the scene always ends there.
pub fn is_captured(event: &WindowEvent, want_mouse: bool, want_keyboard: bool) -> bool {
    match event {
        WindowEvent::MouseInput {
            state: ElementState::Released,
            ..
        } => false,
        WindowEvent::CursorMoved { .. }
        | WindowEvent::MouseInput { .. }
        | WindowEvent::MouseWheel { .. } => want_mouse,
        WindowEvent::KeyboardInput { .. } | WindowEvent::ModifiersChanged(_) => want_keyboard,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use winit::{
        dpi::PhysicalPosition,
        event::{DeviceId, MouseButton, MouseScrollDelta, TouchPhase},
    };

    use super::*;

    fn device() -> DeviceId {
        // SAFETY: only used to build synthetic events, never passed to winit.
        unsafe { DeviceId::dummy() }
    }

    fn button(state: ElementState) -> WindowEvent {
        WindowEvent::MouseInput {
            device_id: device(),
            state,
            button: MouseButton::Right,
        }
    }

    #[test]
    fn keyboard_focus_does_not_swallow_mouse() {
        let cursor = WindowEvent::CursorMoved {
            device_id: device(),
            position: PhysicalPosition::new(10.0, 20.0),
        };
        assert!(!is_captured(&cursor, false, true));
        assert!(!is_captured(&button(ElementState::Pressed), false, true));
        assert!(is_captured(&cursor, true, false));
        assert!(is_captured(&button(ElementState::Pressed), true, false));

        let wheel = WindowEvent::MouseWheel {
            device_id: device(),
            delta: MouseScrollDelta::LineDelta(0.0, 1.0),
            phase: TouchPhase::Moved,
        };
        assert!(!is_captured(&wheel, false, true));
        assert!(is_captured(&wheel, true, true));
    }

    #[test]
    fn button_release_always_reaches_the_scene() {
        assert!(!is_captured(&button(ElementState::Released), true, true));
    }

    #[test]
    fn window_events_are_never_captured() {
        assert!(!is_captured(&WindowEvent::Focused(true), true, true));
        assert!(!is_captured(
            &WindowEvent::Resized(winit::dpi::PhysicalSize::new(800, 600)),
            true,
            true
        ));
    }
}
