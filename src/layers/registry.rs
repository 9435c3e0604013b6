//! Layer registry
//!
//! The single source of truth for the overlay catalog: which layers exist,
//! which are shown, their opacity and the order of the layer list. Every
//! mutation is mirrored onto the map surface so the overlay stack always
//! agrees with the registry.

use crate::{
    core::{config::CatalogLayer, map::Map},
    layers::wms::{LayerHandle, WmsLayer},
    prelude::HashMap,
    MapError, Result,
};

/// One overlay available for display
#[derive(Debug, Clone, PartialEq)]
pub struct LayerEntry {
    name: String,
    layer_name: String,
    handle: LayerHandle,
    visible: bool,
    opacity: f32,
}

impl LayerEntry {
    /// Display label, unique within the registry
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Layer name on the GIS server
    pub fn layer_name(&self) -> &str {
        &self.layer_name
    }

    pub fn handle(&self) -> LayerHandle {
        self.handle
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// The opacity control is only enabled while the layer is shown
    pub fn opacity_enabled(&self) -> bool {
        self.visible
    }
}

pub struct LayerRegistry {
    /// Entries in catalog order
    entries: Vec<LayerEntry>,
    by_name: HashMap<String, usize>,
    /// The layer list as displayed, top to bottom, as indices into `entries`
    list_order: Vec<usize>,
}

impl LayerRegistry {
    /// Registers every catalog layer on the map, all hidden. Fails without
    /// touching the map if the catalog repeats a name.
    pub fn from_catalog(map: &mut Map, wms_url: &str, catalog: &[CatalogLayer]) -> Result<Self> {
        let mut by_name = HashMap::default();
        for (idx, item) in catalog.iter().enumerate() {
            if by_name.insert(item.name.clone(), idx).is_some() {
                return Err(MapError::Layer(format!("duplicate layer name: {}", item.name)));
            }
        }

        let entries = catalog
            .iter()
            .map(|item| LayerEntry {
                name: item.name.clone(),
                layer_name: item.layer_name.clone(),
                handle: map.register_overlay(WmsLayer::new(wms_url, item.layer_name.clone())),
                visible: false,
                opacity: 1.0,
            })
            .collect::<Vec<_>>();

        log::info!("registered {} overlay layers", entries.len());

        Ok(Self {
            list_order: (0..entries.len()).collect(),
            entries,
            by_name,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, name: &str) -> Option<&LayerEntry> {
        self.by_name.get(name).map(|&idx| &self.entries[idx])
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| MapError::Layer(format!("unknown layer: {}", name)))
    }

    /// Entries in catalog order
    pub fn entries(&self) -> &[LayerEntry] {
        &self.entries
    }

    /// Entries as the layer list shows them, top to bottom
    pub fn list(&self) -> impl Iterator<Item = &LayerEntry> + '_ {
        self.list_order.iter().map(move |&idx| &self.entries[idx])
    }

    /// Display names in layer list order
    pub fn list_order(&self) -> Vec<&str> {
        self.list().map(|e| e.name()).collect()
    }

    /// Position of `name` in the layer list
    pub fn list_position(&self, name: &str) -> Option<usize> {
        let idx = *self.by_name.get(name)?;
        self.list_order.iter().position(|&i| i == idx)
    }

    /// Shown entries in catalog order
    pub fn visible(&self) -> impl Iterator<Item = &LayerEntry> + '_ {
        self.entries.iter().filter(|e| e.visible)
    }

    pub fn visible_count(&self) -> usize {
        self.visible().count()
    }

    /// Server-side names of the shown layers, in catalog order
    pub fn active_layer_names(&self) -> Vec<String> {
        self.visible().map(|e| e.layer_name.clone()).collect()
    }

    /// Shows or hides a layer. Showing puts it on top of the map stack and
    /// applies its opacity; hiding takes it off the map.
    pub fn set_visible(&mut self, map: &mut Map, name: &str, visible: bool) -> Result<()> {
        let idx = self.index_of(name)?;
        let entry = &mut self.entries[idx];
        if entry.visible == visible {
            return Ok(());
        }

        if visible {
            map.add_overlay(entry.handle)?;
            map.set_overlay_opacity(entry.handle, entry.opacity);
            map.bring_to_front(entry.handle);
        } else {
            map.remove_overlay(entry.handle);
        }
        entry.visible = visible;

        log::debug!("layer '{}' visible={}", name, visible);
        Ok(())
    }

    /// Sets the opacity of a shown layer. Hidden layers are left untouched and
    /// `Ok(false)` is returned.
    pub fn set_opacity(&mut self, map: &mut Map, name: &str, opacity: f32) -> Result<bool> {
        let idx = self.index_of(name)?;
        if !opacity.is_finite() {
            return Err(MapError::InvalidInput(format!("opacity {} is not a number", opacity)));
        }

        let entry = &mut self.entries[idx];
        if !entry.visible {
            return Ok(false);
        }
        entry.opacity = opacity.clamp(0.0, 1.0);
        map.set_overlay_opacity(entry.handle, entry.opacity);
        Ok(true)
    }

    /// Applies a new layer list order, given as every display name top to
    /// bottom. Shown layers are re-stacked so the first list item ends up
    /// topmost: the list is walked bottom-up, bringing each shown layer to
    /// the front in turn.
    pub fn reorder<S: AsRef<str>>(&mut self, map: &mut Map, names: &[S]) -> Result<()> {
        if names.len() != self.entries.len() {
            return Err(MapError::Layer(format!(
                "reorder needs all {} layers, got {}",
                self.entries.len(),
                names.len()
            )));
        }

        let mut order = Vec::with_capacity(names.len());
        let mut seen = vec![false; self.entries.len()];
        for name in names {
            let idx = self.index_of(name.as_ref())?;
            if std::mem::replace(&mut seen[idx], true) {
                return Err(MapError::Layer(format!(
                    "layer listed twice in reorder: {}",
                    name.as_ref()
                )));
            }
            order.push(idx);
        }
        self.list_order = order;

        for &idx in self.list_order.iter().rev() {
            let entry = &self.entries[idx];
            if entry.visible {
                map.bring_to_front(entry.handle);
            }
        }
        Ok(())
    }

    /// Display names of the shown layers as stacked on the map, front to back
    pub fn stacking(&self, map: &Map) -> Vec<&str> {
        map.overlay_stack()
            .into_iter()
            .filter_map(|handle| self.entries.iter().find(|e| e.handle == handle))
            .map(|e| e.name())
            .collect()
    }
}
