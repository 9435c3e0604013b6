//! WMS overlay layers
//!
//! A [`WmsLayer`] is the renderable handle behind one catalog entry. The map
//! surface owns it; the registry only keeps its [`LayerHandle`].

use crate::constants::{TILE_SIZE, WMS_FORMAT, WMS_TRANSPARENT, WMS_VERSION};
use crate::core::geo::TileCoord;
use crate::tiles::TileSource;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Non-owning reference to an overlay held by the map surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerHandle(pub(crate) u32);

#[derive(Debug, Clone, PartialEq)]
pub struct WmsLayer {
    base_url: String,
    layer_name: String,
    format: String,
    transparent: bool,
    version: String,
}

impl WmsLayer {
    pub fn new(base_url: impl Into<String>, layer_name: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            layer_name: layer_name.into(),
            format: WMS_FORMAT.to_string(),
            transparent: WMS_TRANSPARENT,
            version: WMS_VERSION.to_string(),
        }
    }

    /// Server-side layer name (`workspace:layer`)
    pub fn layer_name(&self) -> &str {
        &self.layer_name
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GetMap` request for one map tile, in EPSG:3857
    pub fn get_map_url(&self, coord: TileCoord) -> String {
        let [minx, miny, maxx, maxy] = coord.mercator_bbox();
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("service", "WMS")
            .append_pair("request", "GetMap")
            .append_pair("version", &self.version)
            .append_pair("layers", &self.layer_name)
            .append_pair("styles", "")
            .append_pair("format", &self.format)
            .append_pair("transparent", if self.transparent { "true" } else { "false" })
            .append_pair("srs", "EPSG:3857")
            .append_pair("bbox", &format!("{},{},{},{}", minx, miny, maxx, maxy))
            .append_pair("width", &TILE_SIZE.to_string())
            .append_pair("height", &TILE_SIZE.to_string())
            .finish();
        format!("{}?{}", self.base_url, query)
    }
}

impl TileSource for WmsLayer {
    fn url(&self, coord: TileCoord) -> String {
        self.get_map_url(coord)
    }
}
