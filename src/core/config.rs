//! Viewer configuration
//!
//! The configuration is loaded once at startup, either from a JSON file on
//! disk or fetched from the web server hosting the viewer. Only the WMS
//! endpoint and the overlay catalog are required; everything else falls
//! back to the defaults in [`crate::constants`].

use crate::constants::{NOTIFICATION_MS, SEARCH_ZOOM, SUGGEST_DEBOUNCE_MS};
use crate::core::geo::LatLng;
use crate::prelude::HashSet;
use crate::services::http::HTTP_CLIENT;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_USER_AGENT: &str = "wmsview/0.1";

/// One overlay of the static layer catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogLayer {
    /// Display label, unique within the catalog
    pub name: String,
    /// Layer name on the GIS server (`workspace:layer`)
    pub layer_name: String,
}

impl CatalogLayer {
    pub fn new(name: impl Into<String>, layer_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layer_name: layer_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerConfig {
    /// WMS endpoint used for overlays, feature info and legend graphics
    pub geoserver_url: String,
    /// Overlays in their default list order
    pub wms_layers: Vec<CatalogLayer>,
    #[serde(default = "default_search_url")]
    pub search_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_initial_view")]
    pub initial_view: [f64; 2],
    #[serde(default = "default_initial_zoom")]
    pub initial_zoom: f64,
    #[serde(default = "default_extent_view")]
    pub extent_view: [f64; 2],
    #[serde(default = "default_extent_zoom")]
    pub extent_zoom: f64,
    #[serde(default = "default_search_zoom")]
    pub search_zoom: f64,
    #[serde(default = "default_debounce_ms")]
    pub suggest_debounce_ms: u64,
    #[serde(default = "default_notification_ms")]
    pub notification_ms: u64,
}

fn default_search_url() -> String {
    DEFAULT_SEARCH_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_initial_view() -> [f64; 2] {
    // Center of Brazil
    [-14.235, -51.925]
}

fn default_initial_zoom() -> f64 {
    5.0
}

fn default_extent_view() -> [f64; 2] {
    // Minas Gerais
    [-18.5122, -44.555]
}

fn default_extent_zoom() -> f64 {
    7.0
}

fn default_search_zoom() -> f64 {
    SEARCH_ZOOM
}

fn default_debounce_ms() -> u64 {
    SUGGEST_DEBOUNCE_MS
}

fn default_notification_ms() -> u64 {
    NOTIFICATION_MS
}

impl ViewerConfig {
    /// Builds a configuration with default view settings
    pub fn new(geoserver_url: impl Into<String>, wms_layers: Vec<CatalogLayer>) -> Self {
        Self {
            geoserver_url: geoserver_url.into(),
            wms_layers,
            search_url: default_search_url(),
            user_agent: default_user_agent(),
            initial_view: default_initial_view(),
            initial_zoom: default_initial_zoom(),
            extent_view: default_extent_view(),
            extent_zoom: default_extent_zoom(),
            search_zoom: default_search_zoom(),
            suggest_debounce_ms: default_debounce_ms(),
            notification_ms: default_notification_ms(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ViewerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("loading viewer configuration from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Downloads the configuration from the server hosting the viewer
    pub async fn fetch(url: &str) -> Result<Self> {
        log::debug!("fetching viewer configuration from {}", url);
        let response = HTTP_CLIENT.get(url).send().await?;
        if !response.status().is_success() {
            return Err(MapError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        let json = response.text().await?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.geoserver_url.trim().is_empty() {
            return Err(MapError::Config("geoserverUrl must not be empty".into()));
        }
        url::Url::parse(&self.geoserver_url)
            .map_err(|e| MapError::Config(format!("invalid geoserverUrl: {}", e)))?;
        url::Url::parse(&self.search_url)
            .map_err(|e| MapError::Config(format!("invalid searchUrl: {}", e)))?;

        let mut seen = HashSet::default();
        for layer in &self.wms_layers {
            if layer.name.trim().is_empty() || layer.layer_name.trim().is_empty() {
                return Err(MapError::Config(
                    "catalog entries need both a name and a layerName".into(),
                ));
            }
            if !seen.insert(layer.name.as_str()) {
                return Err(MapError::Config(format!(
                    "duplicate layer name in catalog: {}",
                    layer.name
                )));
            }
        }

        if !(LatLng::new(self.initial_view[0], self.initial_view[1]).is_valid()
            && LatLng::new(self.extent_view[0], self.extent_view[1]).is_valid())
        {
            return Err(MapError::Config("view coordinates out of range".into()));
        }
        Ok(())
    }

    pub fn initial_center(&self) -> LatLng {
        LatLng::new(self.initial_view[0], self.initial_view[1])
    }

    pub fn extent_center(&self) -> LatLng {
        LatLng::new(self.extent_view[0], self.extent_view[1])
    }

    pub fn suggest_debounce(&self) -> Duration {
        Duration::from_millis(self.suggest_debounce_ms)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }
}
