//! WMS `GetFeatureInfo` queries

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map as JsonMap, Value};

use crate::constants::{FEATURE_INFO_COUNT, WMS_VERSION};
use crate::core::geo::LatLngBounds;
use crate::services::http::{get_json, HTTP_CLIENT};
use crate::Result;

/// Everything a single feature-info query needs
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureInfoRequest {
    /// Server-side layer names, used for both `layers` and `query_layers`
    pub layers: Vec<String>,
    /// Current viewport in EPSG:4326
    pub bbox: LatLngBounds,
    pub width: u32,
    pub height: u32,
    /// Clicked pixel, relative to the top-left corner of the map
    pub x: u32,
    pub y: u32,
}

impl FeatureInfoRequest {
    pub fn to_url(&self, wms_url: &str) -> String {
        let layers = self.layers.join(",");
        let params = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("service", "WMS")
            .append_pair("version", WMS_VERSION)
            .append_pair("request", "GetFeatureInfo")
            .append_pair("layers", &layers)
            .append_pair("query_layers", &layers)
            .append_pair("info_format", "application/json")
            .append_pair("feature_count", &FEATURE_INFO_COUNT.to_string())
            .append_pair("srs", "EPSG:4326")
            .append_pair("bbox", &self.bbox.to_bbox_string())
            .append_pair("height", &self.height.to_string())
            .append_pair("width", &self.width.to_string())
            .append_pair("x", &self.x.to_string())
            .append_pair("y", &self.y.to_string())
            .finish();
        format!("{}?{}", wms_url, params)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureInfoResponse {
    #[serde(default)]
    pub features: Option<Vec<Feature>>,
}

impl FeatureInfoResponse {
    pub fn features(&self) -> &[Feature] {
        self.features.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Feature {
    /// `<layer>.<fid>`
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub properties: Option<JsonMap<String, Value>>,
}

impl Feature {
    /// Source layer: the id up to the first `.`
    pub fn layer_title(&self) -> &str {
        self.id
            .as_deref()
            .and_then(|id| id.split('.').next())
            .unwrap_or("")
    }

    /// Attributes in server order, values rendered as plain text
    pub fn attributes(&self) -> Vec<(String, String)> {
        self.properties
            .iter()
            .flat_map(|props| props.iter())
            .map(|(key, value)| (key.clone(), value_text(value)))
            .collect()
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
pub trait FeatureInfoService: Send + Sync {
    async fn query(&self, request: &FeatureInfoRequest) -> Result<FeatureInfoResponse>;
}

/// Feature-info queries against the configured WMS endpoint
#[derive(Debug, Clone)]
pub struct WmsClient {
    wms_url: String,
}

impl WmsClient {
    pub fn new(wms_url: impl Into<String>) -> Self {
        Self {
            wms_url: wms_url.into(),
        }
    }
}

#[async_trait]
impl FeatureInfoService for WmsClient {
    async fn query(&self, request: &FeatureInfoRequest) -> Result<FeatureInfoResponse> {
        let url = request.to_url(&self.wms_url);
        log::debug!("GetFeatureInfo on [{}]", request.layers.join(","));
        get_json(HTTP_CLIENT.get(&url), &url).await
    }
}
