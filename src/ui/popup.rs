use crate::core::geo::LatLng;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PopupId(pub(crate) u64);

/// One queried feature rendered as a titled attribute table
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBlock {
    /// Source layer, taken from the feature id before the first `.`
    pub title: String,
    /// Attribute rows with upper-cased keys, in server order
    pub rows: Vec<(String, String)>,
}

/// What a popup currently shows
#[derive(Debug, Clone, PartialEq)]
pub enum PopupContent {
    Loading,
    NoLayerSelected,
    NothingFound,
    QueryFailed,
    Features(Vec<FeatureBlock>),
    SearchResult { title: String, position: LatLng },
}

impl PopupContent {
    pub fn is_error(&self) -> bool {
        matches!(self, PopupContent::NoLayerSelected | PopupContent::QueryFailed)
    }
}

impl fmt::Display for PopupContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopupContent::Loading => write!(f, "Fetching information..."),
            PopupContent::NoLayerSelected => write!(f, "No layer selected for query."),
            PopupContent::NothingFound => write!(f, "No feature found at this location."),
            PopupContent::QueryFailed => {
                write!(f, "An error occurred while fetching the information.")
            }
            PopupContent::Features(blocks) => {
                for (i, block) in blocks.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    writeln!(f, "{}", block.title)?;
                    for (key, value) in &block.rows {
                        writeln!(f, "  {}: {}", key, value)?;
                    }
                }
                Ok(())
            }
            PopupContent::SearchResult { title, position } => write!(
                f,
                "{}\nCoordinates: {:.6}, {:.6}",
                title, position.lat, position.lng
            ),
        }
    }
}

/// A popup anchored to a map location
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub id: PopupId,
    pub position: LatLng,
    pub content: PopupContent,
}

impl Popup {
    pub fn new(id: PopupId, position: LatLng, content: PopupContent) -> Self {
        Self {
            id,
            position,
            content,
        }
    }
}
