//! Application context
//!
//! `AppContext` is built once at startup and owns the map surface, the layer
//! registry and every controller. Front ends feed it explicit commands and
//! map events and render whatever state it exposes.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    constants::HELP_NOTIFICATION_MS,
    controllers::{
        feature_info::{ClickOutcome, FeatureInfoController, FeatureInfoTicket},
        filter::{FilterController, LayerFilter},
        measure::MeasureController,
        search::{SearchController, SearchKeyOutcome, SearchTicket, SubmitOutcome, SuggestTicket},
    },
    core::{config::ViewerConfig, geo::LatLng, geo::Point, map::Map},
    input::events::{KeyCode, MapEvent},
    layers::registry::LayerRegistry,
    services::{
        feature_info::{FeatureInfoResponse, FeatureInfoService, WmsClient},
        geocoding::{GeocodingService, NominatimClient, SearchSuggestion},
    },
    tiles::BaseLayer,
    ui::{
        legend::Legend,
        notification::{Notification, NotificationKind, Notifier},
        status::MapStatus,
    },
    MapError, Result,
};

const DEFAULT_MAP_SIZE: Point = Point { x: 800.0, y: 600.0 };

pub struct AppContext {
    config: ViewerConfig,
    map: Map,
    registry: LayerRegistry,
    legend: Legend,
    feature_info: FeatureInfoController,
    measure: MeasureController,
    search: SearchController,
    filter: FilterController,
    notifier: Notifier,
    cursor_position: Option<LatLng>,
    geocoder: Arc<dyn GeocodingService>,
    feature_service: Arc<dyn FeatureInfoService>,
}

impl AppContext {
    /// Builds the viewer against the real WMS server and geocoder
    pub fn startup(config: ViewerConfig) -> Result<Self> {
        let geocoder = Arc::new(NominatimClient::new(&config.search_url, &config.user_agent));
        let feature_service = Arc::new(WmsClient::new(&config.geoserver_url));
        Self::with_services(config, geocoder, feature_service)
    }

    pub fn with_services(
        config: ViewerConfig,
        geocoder: Arc<dyn GeocodingService>,
        feature_service: Arc<dyn FeatureInfoService>,
    ) -> Result<Self> {
        config.validate()?;

        let mut map = Map::new(config.initial_center(), config.initial_zoom, DEFAULT_MAP_SIZE);
        let registry = LayerRegistry::from_catalog(&mut map, &config.geoserver_url, &config.wms_layers)?;
        let legend = Legend::build(&registry, &config.geoserver_url);

        log::info!(
            "viewer ready: {} layers from {}",
            registry.len(),
            config.geoserver_url
        );

        Ok(Self {
            search: SearchController::new(config.suggest_debounce(), config.search_zoom),
            notifier: Notifier::new(config.notification_duration()),
            config,
            map,
            registry,
            legend,
            feature_info: FeatureInfoController::new(),
            measure: MeasureController::new(),
            filter: FilterController::new(),
            cursor_position: None,
            geocoder,
            feature_service,
        })
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn feature_info(&self) -> &FeatureInfoController {
        &self.feature_info
    }

    pub fn measure(&self) -> &MeasureController {
        &self.measure
    }

    pub fn search(&self) -> &SearchController {
        &self.search
    }

    pub fn filter(&self) -> &FilterController {
        &self.filter
    }

    // Layers

    fn refresh_legend(&mut self) {
        self.legend = Legend::build(&self.registry, &self.config.geoserver_url);
    }

    pub fn set_layer_visible(&mut self, name: &str, visible: bool) -> Result<()> {
        self.registry.set_visible(&mut self.map, name, visible)?;
        self.refresh_legend();
        Ok(())
    }

    pub fn set_layer_opacity(&mut self, name: &str, opacity: f32) -> Result<bool> {
        self.registry.set_opacity(&mut self.map, name, opacity)
    }

    pub fn reorder_layers<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        self.registry.reorder(&mut self.map, names)?;
        self.refresh_legend();
        Ok(())
    }

    /// Moves one row of the layer list up (negative) or down (positive)
    pub fn move_layer(&mut self, name: &str, offset: isize) -> Result<()> {
        let mut order = self
            .registry
            .list_order()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let from = self
            .registry
            .list_position(name)
            .ok_or_else(|| MapError::Layer(format!("unknown layer: {}", name)))?;
        let to = from
            .saturating_add_signed(offset)
            .min(order.len().saturating_sub(1));
        if from == to {
            return Ok(());
        }
        let row = order.remove(from);
        order.insert(to, row);
        self.reorder_layers(&order)
    }

    pub fn close_popup(&mut self) {
        self.map.close_popup();
    }

    pub fn set_base_layer(&mut self, base_layer: BaseLayer) {
        self.map.set_base_layer(base_layer);
    }

    // Map events
    //
    // Network-bound interactions are split: a synchronous call returns a
    // ticket, `*_lookup` gives a future that borrows nothing from the
    // context, and `complete_*`/`apply_*` drops answers that arrive after
    // the ticket was superseded. The `async` helpers chain the three.

    /// Applies a map event. A click that needs a feature-info query returns
    /// its ticket.
    pub fn map_event(&mut self, event: MapEvent) -> Option<FeatureInfoTicket> {
        match event {
            MapEvent::Click { lat_lng, pixel } => {
                if self.measure.is_measuring() {
                    self.measure.on_click(&mut self.map, &self.notifier, lat_lng);
                    return None;
                }
                match self
                    .feature_info
                    .on_click(&mut self.map, &self.registry, lat_lng, pixel)
                {
                    ClickOutcome::Query(ticket) => Some(ticket),
                    ClickOutcome::Ignored | ClickOutcome::NoLayers => None,
                }
            }
            MapEvent::MouseMove { lat_lng } => {
                self.cursor_position = Some(lat_lng);
                None
            }
            MapEvent::MoveStart | MapEvent::ZoomStart => {
                self.feature_info.on_view_change(&mut self.map);
                None
            }
            MapEvent::ZoomEnd { zoom } => {
                log::trace!("zoom ended at {}", zoom);
                None
            }
        }
    }

    /// The query for `ticket`, detached from `self`
    pub fn feature_info_lookup(
        &self,
        ticket: &FeatureInfoTicket,
    ) -> impl Future<Output = Result<FeatureInfoResponse>> + Send + 'static {
        let service = Arc::clone(&self.feature_service);
        let request = ticket.request().clone();
        async move { service.query(&request).await }
    }

    /// Returns false when the answer was superseded and dropped
    pub fn complete_feature_info(
        &mut self,
        ticket: FeatureInfoTicket,
        result: Result<FeatureInfoResponse>,
    ) -> bool {
        self.feature_info.complete(&mut self.map, ticket, result)
    }

    /// Applies `event` and waits for any feature-info query it starts
    pub async fn handle_map_event(&mut self, event: MapEvent) {
        if let Some(ticket) = self.map_event(event) {
            let result = self.feature_info_lookup(&ticket).await;
            self.complete_feature_info(ticket, result);
        }
    }

    /// Keys pressed over the map. Returns whether measurement consumed the key.
    pub fn handle_map_key(&mut self, key: KeyCode) -> bool {
        self.measure
            .on_key(&mut self.map, &mut self.feature_info, &self.notifier, key)
    }

    pub fn toggle_measure(&mut self) -> bool {
        self.measure
            .toggle(&mut self.map, &mut self.feature_info, &self.notifier)
    }

    pub fn undo_measure_point(&mut self) {
        self.measure.undo(&mut self.map, &self.notifier);
    }

    // Search

    /// Input text changed. Supersedes any pending suggestion lookup and
    /// returns a ticket when the text is worth looking up.
    pub fn search_input(&mut self, text: &str) -> Option<SuggestTicket> {
        self.search.on_input(text)
    }

    /// Waits out the debounce delay, then answers from the cache or the
    /// geocoder. Resolves to `None` when a later keystroke superseded the
    /// ticket before the delay ran out.
    pub fn suggestion_lookup(
        &mut self,
        ticket: &SuggestTicket,
    ) -> impl Future<Output = Option<Result<Vec<SearchSuggestion>>>> + Send + 'static {
        let settle = self.search.debounce(ticket);
        let cached = self.search.cached(ticket);
        let geocoder = Arc::clone(&self.geocoder);
        let query = ticket.query().to_string();
        async move {
            if !settle.await {
                return None;
            }
            Some(match cached {
                Some(hit) => Ok(hit),
                None => geocoder.search(&query).await,
            })
        }
    }

    /// Returns false when the ticket was superseded and the answer dropped
    pub fn apply_suggestions(
        &mut self,
        ticket: &SuggestTicket,
        result: Result<Vec<SearchSuggestion>>,
    ) -> bool {
        self.search.apply_suggestions(ticket, result)
    }

    /// One keystroke, waited out to the end. Returns whether suggestions
    /// were updated.
    pub async fn suggest(&mut self, text: &str) -> bool {
        let Some(ticket) = self.search_input(text) else {
            return false;
        };
        match self.suggestion_lookup(&ticket).await {
            Some(result) => self.apply_suggestions(&ticket, result),
            None => false,
        }
    }

    /// Keys pressed in the search box. `Select` is applied here; on `Submit`
    /// the caller starts the search with [`AppContext::begin_search`] or
    /// [`AppContext::submit_search`].
    pub fn search_key(&mut self, key: KeyCode) -> SearchKeyOutcome {
        let outcome = self.search.on_key(key);
        if let SearchKeyOutcome::Select(index) = outcome {
            self.search.select(&mut self.map, &self.notifier, index);
        }
        outcome
    }

    pub fn select_suggestion(&mut self, index: usize) -> bool {
        self.search.select(&mut self.map, &self.notifier, index)
    }

    pub fn hover_suggestion(&mut self, index: usize) {
        self.search.hover(index);
    }

    pub fn search_blur(&mut self) {
        self.search.on_blur();
    }

    /// Starts a full search for the current input
    pub fn begin_search(&mut self) -> SubmitOutcome {
        self.search.begin_search(&mut self.map, &self.notifier)
    }

    pub fn search_lookup(
        &self,
        ticket: &SearchTicket,
    ) -> impl Future<Output = Result<Vec<SearchSuggestion>>> + Send + 'static {
        let geocoder = Arc::clone(&self.geocoder);
        let query = ticket.query().to_string();
        async move { geocoder.search(&query).await }
    }

    /// Returns false when the search was superseded and the answer dropped
    pub fn complete_search(
        &mut self,
        ticket: SearchTicket,
        result: Result<Vec<SearchSuggestion>>,
    ) -> bool {
        self.search
            .complete_search(&mut self.map, &self.notifier, ticket, result)
    }

    pub async fn submit_search(&mut self) {
        if let SubmitOutcome::Lookup(ticket) = self.begin_search() {
            let result = self.search_lookup(&ticket).await;
            self.complete_search(ticket, result);
        }
    }

    pub fn zoom_to_result(&mut self, index: usize) -> bool {
        self.search.zoom_to_result(&mut self.map, &self.notifier, index)
    }

    // Filter and toolbar

    pub fn apply_filter(&mut self, filter: LayerFilter) {
        self.filter.apply(filter, &self.notifier);
    }

    pub fn zoom_to_extent(&mut self) {
        self.map
            .set_view(self.config.extent_center(), self.config.extent_zoom);
        self.notifier
            .success("Zoom applied", "View centered on the area of interest");
    }

    pub fn show_help(&self) {
        self.notifier.notify(
            Notification::new(
                "Help",
                "Tick layers to show them. Use the slider to adjust opacity. Click the map to see feature information.",
                NotificationKind::Info,
            )
            .with_duration(Duration::from_millis(HELP_NOTIFICATION_MS)),
        );
    }

    pub fn status(&self) -> MapStatus {
        MapStatus {
            cursor: self.cursor_position,
            zoom: self.map.zoom(),
            active_layers: self.registry.visible_count(),
        }
    }

    /// Last-resort trap for errors escaping an event handler
    pub fn report_unexpected(&self, err: &dyn Display) {
        report_unexpected(&self.notifier, err);
    }
}

/// Logs `err` and queues the single generic error notification. Usable
/// before an [`AppContext`] exists, e.g. when startup itself fails.
pub fn report_unexpected(notifier: &Notifier, err: &dyn Display) {
    log::error!("unexpected error: {}", err);
    notifier.error(
        "Unexpected error",
        "An unexpected error occurred. Please reload the viewer.",
    );
}
