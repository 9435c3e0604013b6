//! The shared map surface
//!
//! `Map` is the headless state of everything drawn on screen: the view, the
//! base layer, the overlay stack, markers, polylines and the single open
//! popup. Controllers mutate it through these operations; a renderer only
//! reads it.

use crate::{
    core::{
        geo::{LatLng, Point},
        viewport::Viewport,
    },
    layers::{
        marker::{Marker, MarkerId},
        vector::{Polyline, PolylineId},
        wms::{LayerHandle, WmsLayer},
    },
    prelude::HashMap,
    tiles::BaseLayer,
    ui::popup::{Popup, PopupContent, PopupId},
    MapError, Result,
};

/// Mouse cursor shown over the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Crosshair,
}

#[derive(Debug, Clone)]
struct Overlay {
    layer: WmsLayer,
    opacity: f32,
}

pub struct Map {
    viewport: Viewport,
    base_layer: BaseLayer,
    overlays: HashMap<LayerHandle, Overlay>,
    /// Overlays currently on the map, bottom to top
    stack: Vec<LayerHandle>,
    markers: HashMap<MarkerId, Marker>,
    polylines: HashMap<PolylineId, Polyline>,
    popup: Option<Popup>,
    cursor: Cursor,
    next_id: u64,
}

impl Map {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            viewport: Viewport::new(center, zoom, size),
            base_layer: BaseLayer::default(),
            overlays: HashMap::default(),
            stack: Vec::new(),
            markers: HashMap::default(),
            polylines: HashMap::default(),
            popup: None,
            cursor: Cursor::Default,
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        log::debug!("set view to ({:.5}, {:.5}) @ {}", center.lat, center.lng, zoom);
        self.viewport.set_center(center);
        self.viewport.set_zoom(zoom);
    }

    pub fn set_size(&mut self, size: Point) {
        self.viewport.set_size(size);
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom
    }

    pub fn base_layer(&self) -> BaseLayer {
        self.base_layer
    }

    pub fn set_base_layer(&mut self, base_layer: BaseLayer) {
        self.base_layer = base_layer;
    }

    // Overlays

    /// Takes ownership of an overlay without showing it
    pub fn register_overlay(&mut self, layer: WmsLayer) -> LayerHandle {
        let handle = LayerHandle(self.next_id() as u32);
        self.overlays.insert(handle, Overlay { layer, opacity: 1.0 });
        handle
    }

    pub fn overlay(&self, handle: LayerHandle) -> Option<&WmsLayer> {
        self.overlays.get(&handle).map(|o| &o.layer)
    }

    /// Shows an overlay on top of the stack; already shown overlays keep their place
    pub fn add_overlay(&mut self, handle: LayerHandle) -> Result<()> {
        if !self.overlays.contains_key(&handle) {
            return Err(MapError::Layer(format!("unknown overlay {:?}", handle)));
        }
        if !self.stack.contains(&handle) {
            self.stack.push(handle);
        }
        Ok(())
    }

    pub fn remove_overlay(&mut self, handle: LayerHandle) -> bool {
        let before = self.stack.len();
        self.stack.retain(|h| *h != handle);
        before != self.stack.len()
    }

    pub fn has_overlay(&self, handle: LayerHandle) -> bool {
        self.stack.contains(&handle)
    }

    /// Moves a shown overlay to the top of the stack
    pub fn bring_to_front(&mut self, handle: LayerHandle) -> bool {
        match self.stack.iter().position(|h| *h == handle) {
            Some(pos) => {
                let handle = self.stack.remove(pos);
                self.stack.push(handle);
                true
            }
            None => false,
        }
    }

    pub fn set_overlay_opacity(&mut self, handle: LayerHandle, opacity: f32) {
        if let Some(overlay) = self.overlays.get_mut(&handle) {
            overlay.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    pub fn overlay_opacity(&self, handle: LayerHandle) -> Option<f32> {
        self.overlays.get(&handle).map(|o| o.opacity)
    }

    /// Shown overlays, front (topmost) to back
    pub fn overlay_stack(&self) -> Vec<LayerHandle> {
        self.stack.iter().rev().copied().collect()
    }

    // Markers and paths

    pub fn add_marker(&mut self, marker: Marker) -> MarkerId {
        let id = MarkerId(self.next_id());
        self.markers.insert(id, marker);
        id
    }

    pub fn remove_marker(&mut self, id: MarkerId) -> Option<Marker> {
        self.markers.remove(&id)
    }

    pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.get(&id)
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn markers(&self) -> impl Iterator<Item = (&MarkerId, &Marker)> {
        self.markers.iter()
    }

    pub fn add_polyline(&mut self, polyline: Polyline) -> PolylineId {
        let id = PolylineId(self.next_id());
        self.polylines.insert(id, polyline);
        id
    }

    pub fn remove_polyline(&mut self, id: PolylineId) -> Option<Polyline> {
        self.polylines.remove(&id)
    }

    pub fn polyline(&self, id: PolylineId) -> Option<&Polyline> {
        self.polylines.get(&id)
    }

    pub fn polyline_count(&self) -> usize {
        self.polylines.len()
    }

    // Popup

    /// Opens a popup, replacing any popup already open
    pub fn open_popup(&mut self, position: LatLng, content: PopupContent) -> PopupId {
        let id = PopupId(self.next_id());
        self.popup = Some(Popup::new(id, position, content));
        id
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    pub fn close_popup(&mut self) -> bool {
        self.popup.take().is_some()
    }

    /// Replaces the content of popup `id` if it is still the open one
    pub fn set_popup_content(&mut self, id: PopupId, content: PopupContent) -> bool {
        match self.popup.as_mut() {
            Some(popup) if popup.id == id => {
                popup.content = content;
                true
            }
            _ => false,
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }
}
