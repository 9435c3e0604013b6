use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolylineId(pub(crate) u64);

/// Stroke style of a polyline
#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub color: String,
    pub weight: f32,
    pub opacity: f32,
}

impl LineStyle {
    /// Red path drawn while measuring
    pub fn measurement() -> Self {
        Self {
            color: "#ff4444".to_string(),
            weight: 3.0,
            opacity: 0.8,
        }
    }
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: "#3388ff".to_string(),
            weight: 3.0,
            opacity: 1.0,
        }
    }
}

/// Line through an ordered list of coordinates, with an optional permanent tooltip
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    points: Vec<LatLng>,
    style: LineStyle,
    tooltip: Option<String>,
}

impl Polyline {
    pub fn new(points: Vec<LatLng>, style: LineStyle) -> Self {
        Self {
            points,
            style,
            tooltip: None,
        }
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn points(&self) -> &[LatLng] {
        &self.points
    }

    pub fn style(&self) -> &LineStyle {
        &self.style
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    pub fn to_line_string(&self) -> geo_types::LineString<f64> {
        self.points
            .iter()
            .map(|p| geo_types::Coord::from(*p))
            .collect::<Vec<_>>()
            .into()
    }
}
