//! Feature-info popups on map click
//!
//! A click is split in two halves so the network round-trip never holds the
//! map: [`FeatureInfoController::on_click`] opens the loading popup and hands
//! back a ticket describing the query, and [`FeatureInfoController::complete`]
//! applies the answer if that ticket is still the latest one and its popup is
//! still open.

use crate::{
    core::{geo::LatLng, geo::Point, map::Map},
    layers::registry::LayerRegistry,
    runtime::RequestSequence,
    services::feature_info::{Feature, FeatureInfoRequest, FeatureInfoResponse, FeatureInfoService},
    ui::popup::{FeatureBlock, PopupContent, PopupId},
    Result,
};

/// A feature-info query waiting for its response
#[derive(Debug, Clone)]
pub struct FeatureInfoTicket {
    seq: u64,
    popup: PopupId,
    request: FeatureInfoRequest,
}

impl FeatureInfoTicket {
    pub fn request(&self) -> &FeatureInfoRequest {
        &self.request
    }
}

#[derive(Debug, Clone)]
pub enum ClickOutcome {
    /// Measurement owns the click
    Ignored,
    /// No layer is shown; the popup already says so
    NoLayers,
    /// A query must be issued
    Query(FeatureInfoTicket),
}

#[derive(Debug, Default)]
pub struct FeatureInfoController {
    measuring: bool,
    sequence: RequestSequence,
}

impl FeatureInfoController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        !self.measuring
    }

    /// Disables click queries while a measurement runs. Entering measurement
    /// also closes the open popup and drops any query in flight.
    pub fn set_measuring(&mut self, map: &mut Map, measuring: bool) {
        self.measuring = measuring;
        if measuring {
            map.close_popup();
            self.sequence.invalidate();
        }
    }

    pub fn on_click(
        &mut self,
        map: &mut Map,
        registry: &LayerRegistry,
        lat_lng: LatLng,
        pixel: Point,
    ) -> ClickOutcome {
        if self.measuring {
            return ClickOutcome::Ignored;
        }

        map.close_popup();
        let popup = map.open_popup(lat_lng, PopupContent::Loading);

        let layers = registry.active_layer_names();
        if layers.is_empty() {
            self.sequence.invalidate();
            map.set_popup_content(popup, PopupContent::NoLayerSelected);
            return ClickOutcome::NoLayers;
        }

        let (width, height) = map.viewport().pixel_size();
        let request = FeatureInfoRequest {
            layers,
            bbox: map.viewport().bounds(),
            width,
            height,
            x: pixel.x.round().max(0.0) as u32,
            y: pixel.y.round().max(0.0) as u32,
        };

        ClickOutcome::Query(FeatureInfoTicket {
            seq: self.sequence.next(),
            popup,
            request,
        })
    }

    /// Shows the query result in the popup. Returns false when the response
    /// was superseded or its popup is gone.
    pub fn complete(
        &mut self,
        map: &mut Map,
        ticket: FeatureInfoTicket,
        result: Result<FeatureInfoResponse>,
    ) -> bool {
        if !self.sequence.is_current(ticket.seq) {
            log::debug!("dropping stale feature-info response #{}", ticket.seq);
            return false;
        }

        let content = match result {
            Ok(response) if response.features().is_empty() => PopupContent::NothingFound,
            Ok(response) => PopupContent::Features(format_features(response.features())),
            Err(e) => {
                log::warn!("feature-info query failed: {}", e);
                PopupContent::QueryFailed
            }
        };
        map.set_popup_content(ticket.popup, content)
    }

    /// Runs a whole click, awaiting the query inline. Returns whether a
    /// request was sent.
    pub async fn handle_click(
        &mut self,
        map: &mut Map,
        registry: &LayerRegistry,
        service: &dyn FeatureInfoService,
        lat_lng: LatLng,
        pixel: Point,
    ) -> bool {
        match self.on_click(map, registry, lat_lng, pixel) {
            ClickOutcome::Query(ticket) => {
                let result = service.query(ticket.request()).await;
                self.complete(map, ticket, result);
                true
            }
            ClickOutcome::Ignored | ClickOutcome::NoLayers => false,
        }
    }

    /// Pan and zoom close the popup, except while measuring
    pub fn on_view_change(&mut self, map: &mut Map) {
        if self.measuring {
            return;
        }
        if map.close_popup() {
            self.sequence.invalidate();
        }
    }
}

/// One block per feature, keys upper-cased
pub fn format_features(features: &[Feature]) -> Vec<FeatureBlock> {
    features
        .iter()
        .map(|feature| FeatureBlock {
            title: feature.layer_title().to_string(),
            rows: feature
                .attributes()
                .into_iter()
                .map(|(key, value)| (key.to_uppercase(), value))
                .collect(),
        })
        .collect()
}
