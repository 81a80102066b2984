//! Dear ImGui overlay
//!
//! [`UiManager`] owns the ImGui integration; [`panel`] builds the viewer's
//! panels and [`truck`] holds the trailer size settings they edit.

pub mod manager;
pub mod panel;
pub mod truck;

pub use manager::UiManager;
pub use panel::{viewer_ui, UiActions, ViewerState};
pub use truck::{TruckPreset, TruckSettings, TruckSize};
