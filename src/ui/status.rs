use num_format::{Locale, ToFormattedString};

use crate::constants::SCALE_AT_ZOOM_ONE;
use crate::core::geo::LatLng;

/// Approximate scale denominator shown for a zoom level
pub fn scale_denominator(zoom: f64) -> u64 {
    (SCALE_AT_ZOOM_ONE / 2f64.powf(zoom - 1.0)).round().max(0.0) as u64
}

/// Snapshot of the status bar
#[derive(Debug, Clone, PartialEq)]
pub struct MapStatus {
    /// Last cursor position over the map
    pub cursor: Option<LatLng>,
    pub zoom: f64,
    pub active_layers: usize,
}

impl MapStatus {
    pub fn coordinates_text(&self) -> String {
        match self.cursor {
            Some(pos) => format!("{:.6}, {:.6}", pos.lat, pos.lng),
            None => "-".to_string(),
        }
    }

    pub fn zoom_text(&self) -> String {
        format!("Zoom: {}", self.zoom.round() as i64)
    }

    pub fn scale_text(&self) -> String {
        format!(
            "Scale: 1:{}",
            scale_denominator(self.zoom).to_formatted_string(&Locale::en)
        )
    }

    pub fn layers_text(&self) -> String {
        format!("Active layers: {}", self.active_layers)
    }
}
