use crate::core::geo::LatLng;
use crate::ui::popup::PopupContent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerId(pub(crate) u64);

/// How a point marker is drawn
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerIcon {
    /// Measurement vertex labelled with its 1-based position
    Numbered(usize),
    /// Geocoding result pin
    SearchPin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    position: LatLng,
    icon: MarkerIcon,
    popup: Option<PopupContent>,
}

impl Marker {
    pub fn new(position: LatLng, icon: MarkerIcon) -> Self {
        Self {
            position,
            icon,
            popup: None,
        }
    }

    pub fn numbered(position: LatLng, number: usize) -> Self {
        Self::new(position, MarkerIcon::Numbered(number))
    }

    /// Popup opened when the marker is clicked
    pub fn with_popup(mut self, content: PopupContent) -> Self {
        self.popup = Some(content);
        self
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn icon(&self) -> &MarkerIcon {
        &self.icon
    }

    pub fn popup(&self) -> Option<&PopupContent> {
        self.popup.as_ref()
    }

    /// Text drawn inside the icon
    pub fn label(&self) -> String {
        match &self.icon {
            MarkerIcon::Numbered(n) => n.to_string(),
            MarkerIcon::SearchPin => "📍".to_string(),
        }
    }
}
