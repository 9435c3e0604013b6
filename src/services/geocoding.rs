//! Geocoding lookups against a Nominatim-compatible endpoint

use async_trait::async_trait;
use serde::Deserialize;

use crate::constants::GEOCODING_LIMIT;
use crate::core::geo::LatLng;
use crate::services::http::{get_json, HTTP_CLIENT};
use crate::{MapError, Result};

/// Display glyph chosen from a place category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    City,
    Village,
    House,
    Institution,
    Tree,
    Pin,
}

impl Glyph {
    pub fn from_category(category: &str) -> Self {
        match category {
            "city" | "town" => Glyph::City,
            "village" => Glyph::Village,
            "suburb" => Glyph::House,
            "administrative" => Glyph::Institution,
            "natural" => Glyph::Tree,
            _ => Glyph::Pin,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Glyph::City => "🏙️",
            Glyph::Village => "🏘️",
            Glyph::House => "🏠",
            Glyph::Institution => "🏛️",
            Glyph::Tree => "🌲",
            Glyph::Pin => "📍",
        }
    }
}

/// One place returned by the geocoder
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSuggestion {
    /// Full display name
    pub label: String,
    pub coordinates: LatLng,
    pub category: String,
}

impl SearchSuggestion {
    pub fn new(label: impl Into<String>, coordinates: LatLng, category: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            coordinates,
            category: category.into(),
        }
    }

    /// First component of the label
    pub fn primary_name(&self) -> &str {
        self.label.split(',').next().unwrap_or("").trim()
    }

    /// The two components following the primary name
    pub fn secondary_context(&self) -> String {
        self.label
            .split(',')
            .skip(1)
            .take(2)
            .map(str::trim)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn glyph(&self) -> Glyph {
        Glyph::from_category(&self.category)
    }

    pub fn coords_text(&self) -> String {
        format!("{:.4}, {:.4}", self.coordinates.lat, self.coordinates.lng)
    }
}

#[async_trait]
pub trait GeocodingService: Send + Sync {
    /// Looks up at most five places matching `query`
    async fn search(&self, query: &str) -> Result<Vec<SearchSuggestion>>;
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
    #[serde(rename = "type", default)]
    category: String,
}

impl TryFrom<NominatimPlace> for SearchSuggestion {
    type Error = MapError;

    fn try_from(place: NominatimPlace) -> Result<Self> {
        let parse = |value: &str| {
            value
                .parse::<f64>()
                .map_err(|e| MapError::ParseError(format!("bad coordinate '{}': {}", value, e)))
        };
        Ok(SearchSuggestion {
            coordinates: LatLng::new(parse(&place.lat)?, parse(&place.lon)?),
            label: place.display_name,
            category: place.category,
        })
    }
}

/// Geocoder backed by the Nominatim search API
#[derive(Debug, Clone)]
pub struct NominatimClient {
    endpoint: String,
    user_agent: String,
}

impl NominatimClient {
    pub fn new(endpoint: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            user_agent: user_agent.into(),
        }
    }

    pub fn search_url(&self, query: &str) -> String {
        let params = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("format", "json")
            .append_pair("q", query)
            .append_pair("limit", &GEOCODING_LIMIT.to_string())
            .append_pair("addressdetails", "1")
            .finish();
        format!("{}?{}", self.endpoint, params)
    }
}

#[async_trait]
impl GeocodingService for NominatimClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchSuggestion>> {
        let url = self.search_url(query);
        log::debug!("geocoding '{}'", query);

        let request = HTTP_CLIENT
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str());
        let places: Vec<NominatimPlace> = get_json(request, &url).await?;

        places
            .into_iter()
            .take(GEOCODING_LIMIT)
            .map(SearchSuggestion::try_from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url() {
        let client = NominatimClient::new("https://geo.example.org/search", "test");
        assert_eq!(
            client.search_url("Belo Horizonte"),
            "https://geo.example.org/search?format=json&q=Belo+Horizonte&limit=5&addressdetails=1"
        );
    }

    #[test]
    fn test_parse_places() {
        let json = r#"[
            {"lat": "-19.9191", "lon": "-43.9386", "display_name": "Belo Horizonte, Minas Gerais, Região Sudeste, Brasil", "type": "city", "importance": 0.7},
            {"lat": "-20.3855", "lon": "-43.5035", "display_name": "Ouro Preto", "type": "town"}
        ]"#;
        let places: Vec<NominatimPlace> = serde_json::from_str(json).unwrap();
        let suggestions = places
            .into_iter()
            .map(SearchSuggestion::try_from)
            .collect::<Result<Vec<_>>>()
            .unwrap();

        let bh = &suggestions[0];
        assert_eq!(bh.primary_name(), "Belo Horizonte");
        assert_eq!(bh.secondary_context(), "Minas Gerais, Região Sudeste");
        assert_eq!(bh.glyph(), Glyph::City);
        assert_eq!(bh.coords_text(), "-19.9191, -43.9386");
        assert_eq!(suggestions[1].secondary_context(), "");
    }

    #[test]
    fn test_bad_coordinates() {
        let place = NominatimPlace {
            lat: "north".into(),
            lon: "0".into(),
            display_name: "x".into(),
            category: String::new(),
        };
        assert!(matches!(
            SearchSuggestion::try_from(place),
            Err(MapError::ParseError(_))
        ));
    }

    #[test]
    fn test_glyphs() {
        assert_eq!(Glyph::from_category("town"), Glyph::City);
        assert_eq!(Glyph::from_category("village").as_str(), "🏘️");
        assert_eq!(Glyph::from_category("administrative"), Glyph::Institution);
        assert_eq!(Glyph::from_category("peak"), Glyph::Pin);
    }
}
