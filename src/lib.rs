//! # wmsview
//!
//! The interaction core of a browser-style WMS map viewer.
//!
//! A base tile map is overlaid with a fixed catalog of WMS layers. This crate
//! owns everything between user input and the map surface: the ordered layer
//! registry and its legend, feature-info queries, point-to-point distance
//! measurement, geocoding search with autocomplete and the layer-list filter.
//! Rendering is left to whatever draws the [`Map`] state.

pub mod app;
pub mod controllers;
pub mod core;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod runtime;
pub mod services;
pub mod tiles;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use crate::app::AppContext;

pub use crate::core::{
    config::{CatalogLayer, ViewerConfig},
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::Map,
    viewport::Viewport,
};

pub use crate::layers::{registry::LayerRegistry, wms::WmsLayer};

pub use crate::controllers::{
    feature_info::FeatureInfoController, filter::FilterController, measure::MeasureController,
    search::SearchController,
};

pub use crate::services::{
    feature_info::{FeatureInfoService, WmsClient},
    geocoding::{GeocodingService, NominatimClient},
};

pub use crate::input::events::{KeyCode, MapEvent};

pub use crate::ui::{legend::Legend, notification::Notification, popup::Popup};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Error type alias for convenience
pub type Error = MapError;
