//! Viewer panels
//!
//! The menu bar, truck info, camera and performance panels. Panels only
//! read state and report what the user asked for through [`UiActions`];
//! the application applies those requests after the UI frame.

use cgmath::Deg;

use super::truck::{TruckSettings, TruckSize, TRUCK_PRESETS};
use crate::{
    gfx::camera::{Camera, ViewPreset},
    performance::PerformanceMonitor,
};

/// Requests raised by the UI during one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiActions {
    pub exit_requested: bool,
    pub camera_preset: Option<ViewPreset>,
}

/// Read-only view of the application state the panels display.
pub struct ViewerState<'a> {
    pub camera: &'a Camera,
    pub camera_control_enabled: bool,
    pub performance: &'a PerformanceMonitor,
}

/// Builds every viewer panel for this frame.
pub fn viewer_ui(ui: &imgui::Ui, truck: &mut TruckSettings, state: &ViewerState) -> UiActions {
    let mut actions = UiActions::default();

    main_menu_bar(ui, truck, &mut actions);
    truck_info_panel(ui, truck);
    camera_panel(ui, state.camera, state.camera_control_enabled, &mut actions);
    state.performance.render_ui(ui);

    actions
}

fn main_menu_bar(ui: &imgui::Ui, truck: &mut TruckSettings, actions: &mut UiActions) {
    let Some(_bar) = ui.begin_main_menu_bar() else {
        return;
    };

    if let Some(_menu) = ui.begin_menu("File") {
        if ui.menu_item_config("Exit").shortcut("Esc").build() {
            actions.exit_requested = true;
        }
    }

    if let Some(_menu) = ui.begin_menu("Truck") {
        ui.text("Trailer type:");
        ui.separator();
        for (i, preset) in TRUCK_PRESETS.iter().enumerate() {
            let selected = truck.preset_index() == i && !truck.uses_custom();
            if ui.menu_item_config(preset.name).selected(selected).build() {
                truck.select_preset(i);
            }
        }
        ui.separator();
        if ui
            .menu_item_config("Custom")
            .selected(truck.uses_custom())
            .build()
        {
            truck.select_custom();
        }
    }

    if let Some(_menu) = ui.begin_menu("Parameters") {
        dimension_inputs(ui, truck);
        ui.separator();
        ui.checkbox("Open tent", &mut truck.tent_open);
    }
}

fn dimension_inputs(ui: &imgui::Ui, truck: &mut TruckSettings) {
    ui.text("Trailer size (cm):");
    let _width = ui.push_item_width(100.0);

    if truck.uses_custom() {
        let mut size = truck.custom_size();
        let mut changed = false;
        changed |= ui.input_int("Width", &mut size.width).step(10).step_fast(100).build();
        changed |= ui.input_int("Height", &mut size.height).step(10).step_fast(100).build();
        changed |= ui.input_int("Depth", &mut size.depth).step(10).step_fast(100).build();
        if changed {
            truck.set_custom_size(size);
        }
    } else {
        let TruckSize {
            mut width,
            mut height,
            mut depth,
        } = truck.current_size();
        ui.input_int("Width", &mut width).read_only(true).build();
        ui.input_int("Height", &mut height).read_only(true).build();
        ui.input_int("Depth", &mut depth).read_only(true).build();
    }
}

fn truck_info_panel(ui: &imgui::Ui, truck: &TruckSettings) {
    ui.window("Truck info")
        .position([10.0, 40.0], imgui::Condition::FirstUseEver)
        .always_auto_resize(true)
        .build(|| {
            let size = truck.current_size();
            ui.text(format!("Type: {}", truck.current_name()));
            ui.text(format!(
                "Size: {} x {} x {} cm",
                size.width, size.height, size.depth
            ));
            ui.text(format!("Volume: {:.2} m3", size.volume_m3()));
            ui.text(format!(
                "Tent: {}",
                if truck.tent_open { "open" } else { "closed" }
            ));
        });
}

fn camera_panel(ui: &imgui::Ui, camera: &Camera, control_enabled: bool, actions: &mut UiActions) {
    ui.window("Camera")
        .position([10.0, 200.0], imgui::Condition::FirstUseEver)
        .always_auto_resize(true)
        .build(|| {
            let p = camera.position();
            ui.text(format!("Position: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
            if let Some(arc) = camera.as_arc_rotate() {
                let t = arc.target();
                ui.text(format!("Target: ({:.2}, {:.2}, {:.2})", t.x, t.y, t.z));
                ui.text(format!("Radius: {:.2}", arc.radius()));
                ui.text(format!(
                    "Alpha: {:.1} deg  Beta: {:.1} deg",
                    Deg::from(arc.alpha()).0,
                    Deg::from(arc.beta()).0
                ));
            }
            ui.text(format!(
                "Control: {} (F1)",
                if control_enabled { "on" } else { "off" }
            ));

            ui.separator();
            for (i, preset) in ViewPreset::ALL.iter().enumerate() {
                if i > 0 {
                    ui.same_line();
                }
                if ui.button(preset.label()) {
                    actions.camera_preset = Some(*preset);
                }
            }
        });
}
