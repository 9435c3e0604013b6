//! Category filter over the layer list
//!
//! Filtering only hides rows of the list; it never touches layer visibility on
//! the map or the registry.

use crate::layers::registry::LayerRegistry;
use crate::ui::notification::Notifier;

const PROTECTED_AREA_TERMS: &[&str] = &["uc", "unidade"];
const BOUNDARY_TERMS: &[&str] = &["limite", "mg"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayerFilter {
    #[default]
    All,
    /// Conservation units (`uc`)
    ProtectedAreas,
    /// Administrative boundaries (`limite`)
    Boundaries,
    /// Everything else (`outros`)
    Others,
}

impl LayerFilter {
    pub const ALL: [LayerFilter; 4] = [
        LayerFilter::All,
        LayerFilter::ProtectedAreas,
        LayerFilter::Boundaries,
        LayerFilter::Others,
    ];

    /// Unknown keys fall back to showing everything
    pub fn from_key(key: &str) -> Self {
        match key {
            "uc" => LayerFilter::ProtectedAreas,
            "limite" => LayerFilter::Boundaries,
            "outros" => LayerFilter::Others,
            _ => LayerFilter::All,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            LayerFilter::All => "todos",
            LayerFilter::ProtectedAreas => "uc",
            LayerFilter::Boundaries => "limite",
            LayerFilter::Others => "outros",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LayerFilter::All => "All",
            LayerFilter::ProtectedAreas => "Protected areas",
            LayerFilter::Boundaries => "Boundaries",
            LayerFilter::Others => "Others",
        }
    }

    /// Case-insensitive substring test against a row label
    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        let contains_any = |terms: &[&str]| terms.iter().any(|t| name.contains(t));
        match self {
            LayerFilter::All => true,
            LayerFilter::ProtectedAreas => contains_any(PROTECTED_AREA_TERMS),
            LayerFilter::Boundaries => contains_any(BOUNDARY_TERMS),
            LayerFilter::Others => {
                !contains_any(PROTECTED_AREA_TERMS) && !contains_any(BOUNDARY_TERMS)
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct FilterController {
    active: LayerFilter,
}

impl FilterController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> LayerFilter {
        self.active
    }

    /// Activates `filter`, replacing the previous one
    pub fn apply(&mut self, filter: LayerFilter, notifier: &Notifier) {
        self.active = filter;
        log::debug!("layer list filter set to '{}'", filter.key());
        notifier.info(
            "Filter applied",
            &format!("Showing layers: {}", filter.label()),
        );
    }

    pub fn row_visible(&self, name: &str) -> bool {
        self.active.matches(name)
    }

    /// Row visibility for the whole list, in list order
    pub fn rows<'a>(&self, registry: &'a LayerRegistry) -> Vec<(&'a str, bool)> {
        registry
            .list()
            .map(|entry| (entry.name(), self.row_visible(entry.name())))
            .collect()
    }
}
