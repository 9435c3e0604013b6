use crate::core::geo::{LatLng, Point};
use serde::{Deserialize, Serialize};

/// Map surface events the controllers react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MapEvent {
    /// Single click, with both the geographic and the container position
    Click { lat_lng: LatLng, pixel: Point },
    /// Cursor moved over the map
    MouseMove { lat_lng: LatLng },
    /// A pan started
    MoveStart,
    /// A zoom started
    ZoomStart,
    /// A zoom finished at the given level
    ZoomEnd { zoom: f64 },
}

impl MapEvent {
    pub fn click(lat_lng: LatLng, pixel: Point) -> Self {
        MapEvent::Click { lat_lng, pixel }
    }

    /// Pan and zoom starts both dismiss the feature-info popup
    pub fn starts_view_change(&self) -> bool {
        matches!(self, MapEvent::MoveStart | MapEvent::ZoomStart)
    }
}

/// Keyboard key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    ArrowUp,
    ArrowDown,
    Enter,
    Escape,
    Backspace,
    Delete,
    Other(u32),
}

impl KeyCode {
    /// Both delete keys remove the last measurement point
    pub fn is_undo(&self) -> bool {
        matches!(self, KeyCode::Backspace | KeyCode::Delete)
    }
}
