//! Clients for the external HTTP collaborators: the WMS server and the
//! geocoding service. Controllers only see the traits so tests can swap in
//! in-memory fakes.

pub mod feature_info;
pub mod geocoding;
pub mod http;

pub use feature_info::{FeatureInfoRequest, FeatureInfoResponse, FeatureInfoService, WmsClient};
pub use geocoding::{GeocodingService, Glyph, NominatimClient, SearchSuggestion};
