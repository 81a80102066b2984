//! Trailer size selection shown in the menu bar and info panel.

/// Trailer body dimensions in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruckSize {
    pub width: i32,
    pub height: i32,
    pub depth: i32,
}

impl TruckSize {
    pub const fn new(width: i32, height: i32, depth: i32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Cargo volume in cubic metres.
    pub fn volume_m3(&self) -> f32 {
        self.width as f32 * self.height as f32 * self.depth as f32 / 1_000_000.0
    }

    /// Limits accepted for custom dimensions.
    pub fn clamped(self) -> Self {
        Self {
            width: self.width.clamp(300, 3000),
            height: self.height.clamp(100, 500),
            depth: self.depth.clamp(100, 300),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruckPreset {
    pub name: &'static str,
    pub size: TruckSize,
}

pub const TRUCK_PRESETS: [TruckPreset; 6] = [
    TruckPreset {
        name: "Small truck",
        size: TruckSize::new(1203, 239, 235),
    },
    TruckPreset {
        name: "Medium truck",
        size: TruckSize::new(1340, 239, 235),
    },
    TruckPreset {
        name: "Large truck",
        size: TruckSize::new(1360, 260, 245),
    },
    TruckPreset {
        name: "Extended truck",
        size: TruckSize::new(1360, 300, 245),
    },
    TruckPreset {
        name: "Maximum truck",
        size: TruckSize::new(1650, 260, 245),
    },
    TruckPreset {
        name: "Compact truck",
        size: TruckSize::new(590, 239, 235),
    },
];

const DEFAULT_PRESET: usize = 2;
const CUSTOM_NAME: &str = "Custom";

#[derive(Debug, Clone, PartialEq)]
pub struct TruckSettings {
    preset: usize,
    use_custom: bool,
    custom: TruckSize,
    pub tent_open: bool,
}

impl Default for TruckSettings {
    fn default() -> Self {
        Self {
            preset: DEFAULT_PRESET,
            use_custom: false,
            custom: TruckSize::new(1650, 260, 245),
            tent_open: false,
        }
    }
}

impl TruckSettings {
    pub fn preset_index(&self) -> usize {
        self.preset
    }

    pub fn uses_custom(&self) -> bool {
        self.use_custom
    }

    pub fn custom_size(&self) -> TruckSize {
        self.custom
    }

    /// Switches to a preset. Out-of-range indices are ignored.
    pub fn select_preset(&mut self, index: usize) {
        if index >= TRUCK_PRESETS.len() {
            log::warn!("No truck preset {index}");
            return;
        }
        self.preset = index;
        self.use_custom = false;
        self.log_size();
    }

    pub fn select_custom(&mut self) {
        self.use_custom = true;
        self.log_size();
    }

    /// Stores custom dimensions, clamped to the accepted ranges.
    pub fn set_custom_size(&mut self, size: TruckSize) {
        let clamped = size.clamped();
        if clamped == self.custom {
            return;
        }
        self.custom = clamped;
        if self.use_custom {
            self.log_size();
        }
    }

    pub fn current_name(&self) -> &'static str {
        if self.use_custom {
            CUSTOM_NAME
        } else {
            TRUCK_PRESETS[self.preset].name
        }
    }

    pub fn current_size(&self) -> TruckSize {
        if self.use_custom {
            self.custom
        } else {
            TRUCK_PRESETS[self.preset].size
        }
    }

    fn log_size(&self) {
        let size = self.current_size();
        log::info!(
            "Truck size updated: {}x{}x{} cm ({})",
            size.width,
            size.height,
            size.depth,
            self.current_name()
        );
    }
}
