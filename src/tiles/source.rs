use crate::core::geo::TileCoord;
use serde::{Deserialize, Serialize};

/// Produces the image URL of one base-map tile
pub trait TileSource: Send + Sync {
    fn url(&self, coord: TileCoord) -> String;

    /// Credit line shown while the source is on screen
    fn attribution(&self) -> &str {
        ""
    }
}

pub const OSM_ATTRIBUTION: &str = "© OpenStreetMap contributors";
pub const ESRI_ATTRIBUTION: &str = "Tiles © Esri — Source: Esri, i-cubed, USDA, USGS, AEX, GeoEye, \
     Getmapping, Aerogrid, IGN, IGP, UPR-EGP, and the GIS User Community";

const OSM_SUBDOMAINS: [char; 3] = ['a', 'b', 'c'];

/// Standard OpenStreetMap tiles, spread over the a/b/c hosts
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenStreetMapSource;

impl TileSource for OpenStreetMapSource {
    fn url(&self, coord: TileCoord) -> String {
        let host = OSM_SUBDOMAINS[((coord.x + coord.y) as usize) % OSM_SUBDOMAINS.len()];
        format!(
            "https://{host}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            z = coord.z,
            x = coord.x,
            y = coord.y
        )
    }

    fn attribution(&self) -> &str {
        OSM_ATTRIBUTION
    }
}

/// Esri World Imagery, offered as the satellite base map
#[derive(Default)]
pub struct EsriWorldImagerySource;

impl TileSource for EsriWorldImagerySource {
    fn url(&self, coord: TileCoord) -> String {
        // Esri orders the path as z/y/x
        format!(
            "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{}/{}/{}",
            coord.z, coord.y, coord.x
        )
    }

    fn attribution(&self) -> &str {
        ESRI_ATTRIBUTION
    }
}

/// Base maps the user can switch between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BaseLayer {
    #[default]
    OpenStreetMap,
    Satellite,
}

impl BaseLayer {
    pub const ALL: [BaseLayer; 2] = [BaseLayer::OpenStreetMap, BaseLayer::Satellite];

    pub fn label(&self) -> &'static str {
        match self {
            BaseLayer::OpenStreetMap => "OpenStreetMap",
            BaseLayer::Satellite => "Satellite",
        }
    }

    pub fn source(&self) -> Box<dyn TileSource> {
        match self {
            BaseLayer::OpenStreetMap => Box::new(OpenStreetMapSource),
            BaseLayer::Satellite => Box::new(EsriWorldImagerySource),
        }
    }
}
