//! Legend panel content, derived from the layer registry

use crate::constants::LEGEND_ICON_SIZE;
use crate::layers::registry::LayerRegistry;

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub name: String,
    pub layer_name: String,
    /// `GetLegendGraphic` image for the layer
    pub icon_url: String,
}

/// Legend entries for the shown layers, in layer list order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Legend {
    entries: Vec<LegendEntry>,
}

impl Legend {
    /// Rebuilds the legend from the current registry state. Must be called after
    /// every visibility change and every reorder.
    pub fn build(registry: &LayerRegistry, wms_url: &str) -> Self {
        let mut visible = registry
            .visible()
            .filter_map(|entry| {
                registry
                    .list_position(entry.name())
                    .map(|position| (position, entry))
            })
            .collect::<Vec<_>>();
        visible.sort_by_key(|(position, _)| *position);

        let entries = visible
            .into_iter()
            .map(|(_, entry)| LegendEntry {
                name: entry.name().to_string(),
                layer_name: entry.layer_name().to_string(),
                icon_url: legend_graphic_url(wms_url, entry.layer_name()),
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[LegendEntry] {
        &self.entries
    }

    /// The whole panel is hidden while no layer is shown
    pub fn is_visible(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }
}

pub fn legend_graphic_url(wms_url: &str, layer_name: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("REQUEST", "GetLegendGraphic")
        .append_pair("VERSION", "1.0.0")
        .append_pair("FORMAT", "image/png")
        .append_pair("WIDTH", &LEGEND_ICON_SIZE.to_string())
        .append_pair("HEIGHT", &LEGEND_ICON_SIZE.to_string())
        .append_pair("LAYER", layer_name)
        .finish();
    format!("{}?{}", wms_url, query)
}
