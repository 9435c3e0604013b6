//! Place search with autocomplete
//!
//! Typing schedules a debounced suggestion lookup; every keystroke
//! supersedes the previous one, and a lookup that resolves after its query was
//! superseded is dropped. An explicit submit runs a full search that drops a
//! marker per result. Both paths come in a split form (ticket, then
//! `apply_*`/`complete_*`) for callers that drive their own event loop, and an
//! `async` convenience form.

use std::num::NonZeroUsize;
use std::time::Duration;

use lru::LruCache;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    constants::{MIN_SUGGEST_CHARS, SEARCH_ZOOM, SUGGESTION_CACHE_SIZE, SUGGEST_DEBOUNCE_MS},
    core::{geo::LatLng, map::Map},
    input::events::KeyCode,
    layers::marker::{Marker, MarkerIcon, MarkerId},
    runtime::{Debouncer, RequestSequence},
    services::geocoding::{GeocodingService, SearchSuggestion},
    ui::{notification::Notifier, popup::PopupContent},
    Result,
};

static COORDINATE_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-?\d+\.?\d*)[,\s]+(-?\d+\.?\d*)$").expect("coordinate pattern is valid")
});

/// Recognizes `"lat, lng"` or `"lat lng"` input within the valid ranges
pub fn parse_coordinates(query: &str) -> Option<LatLng> {
    let caps = COORDINATE_LITERAL.captures(query.trim())?;
    let lat = caps[1].parse::<f64>().ok()?;
    let lng = caps[2].parse::<f64>().ok()?;
    let point = LatLng::new(lat, lng);
    point.is_valid().then_some(point)
}

fn coordinate_result(point: LatLng) -> SearchSuggestion {
    SearchSuggestion::new(
        format!("Coordinates: {:.6}, {:.6}", point.lat, point.lng),
        point,
        "coordinates",
    )
}

/// A scheduled suggestion lookup
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestTicket {
    generation: u64,
    query: String,
}

impl SuggestTicket {
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// A full search waiting for the geocoder
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTicket {
    seq: u64,
    query: String,
}

impl SearchTicket {
    pub fn query(&self) -> &str {
        &self.query
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Empty query, rejected with a warning
    Rejected,
    /// Resolved without a network call
    Resolved,
    /// The geocoder must be asked
    Lookup(SearchTicket),
}

/// What a key press in the search box asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKeyOutcome {
    Ignored,
    /// Highlight moved (or stayed at its bound)
    Handled,
    /// Select the suggestion at this index
    Select(usize),
    /// Run a full search
    Submit,
    /// Suggestions hidden and focus dropped
    Dismissed,
}

pub struct SearchController {
    query: String,
    focused: bool,
    suggestions: Vec<SearchSuggestion>,
    highlighted: Option<usize>,
    /// Results currently marked on the map, index-aligned with `markers`
    results: Vec<SearchSuggestion>,
    markers: Vec<MarkerId>,
    debouncer: Debouncer,
    searches: RequestSequence,
    cache: LruCache<String, Vec<SearchSuggestion>>,
    search_zoom: f64,
}

impl Default for SearchController {
    fn default() -> Self {
        Self::new(Duration::from_millis(SUGGEST_DEBOUNCE_MS), SEARCH_ZOOM)
    }
}

impl SearchController {
    pub fn new(debounce: Duration, search_zoom: f64) -> Self {
        let capacity = NonZeroUsize::new(SUGGESTION_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN);
        Self {
            query: String::new(),
            focused: false,
            suggestions: Vec::new(),
            highlighted: None,
            results: Vec::new(),
            markers: Vec::new(),
            debouncer: Debouncer::new(debounce),
            searches: RequestSequence::new(),
            cache: LruCache::new(capacity),
            search_zoom,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn suggestions(&self) -> &[SearchSuggestion] {
        &self.suggestions
    }

    pub fn suggestions_visible(&self) -> bool {
        !self.suggestions.is_empty()
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn results(&self) -> &[SearchSuggestion] {
        &self.results
    }

    pub fn markers(&self) -> &[MarkerId] {
        &self.markers
    }

    /// Screen-reader text for the suggestion list
    pub fn announcement(&self) -> String {
        if self.suggestions.is_empty() {
            String::new()
        } else {
            format!("{} suggestions found.", self.suggestions.len())
        }
    }

    fn hide_suggestions(&mut self) {
        self.suggestions.clear();
        self.highlighted = None;
    }

    // Autocomplete

    /// Records new input text and supersedes any pending lookup. Returns a
    /// ticket when the trimmed text is long enough to look up.
    pub fn on_input(&mut self, text: &str) -> Option<SuggestTicket> {
        self.query = text.to_string();
        self.focused = true;
        let generation = self.debouncer.bump();

        let query = text.trim();
        if query.chars().count() < MIN_SUGGEST_CHARS {
            self.hide_suggestions();
            return None;
        }
        Some(SuggestTicket {
            generation,
            query: query.to_string(),
        })
    }

    /// Resolves after the debounce delay to whether the ticket is still live
    pub fn debounce(&self, ticket: &SuggestTicket) -> impl std::future::Future<Output = bool> + Send + 'static {
        self.debouncer.wait(ticket.generation)
    }

    pub fn is_live(&self, ticket: &SuggestTicket) -> bool {
        self.debouncer.is_current(ticket.generation)
    }

    pub fn cached(&mut self, ticket: &SuggestTicket) -> Option<Vec<SearchSuggestion>> {
        self.cache.get(&ticket.query.to_lowercase()).cloned()
    }

    /// Shows looked-up suggestions. Failures and empty answers just clear the
    /// list. Returns false when the ticket was superseded.
    pub fn apply_suggestions(
        &mut self,
        ticket: &SuggestTicket,
        result: Result<Vec<SearchSuggestion>>,
    ) -> bool {
        if !self.is_live(ticket) {
            log::debug!("dropping stale suggestions for '{}'", ticket.query);
            return false;
        }

        self.highlighted = None;
        match result {
            Ok(suggestions) => {
                self.cache.put(ticket.query.to_lowercase(), suggestions.clone());
                self.suggestions = suggestions;
            }
            Err(e) => {
                log::warn!("suggestion lookup for '{}' failed: {}", ticket.query, e);
                self.suggestions.clear();
            }
        }
        true
    }

    /// Full autocomplete cycle for one keystroke. Returns whether suggestions
    /// were updated.
    pub async fn suggest(&mut self, text: &str, geocoder: &dyn GeocodingService) -> bool {
        let Some(ticket) = self.on_input(text) else {
            return false;
        };
        if !self.debounce(&ticket).await {
            return false;
        }

        let result = match self.cached(&ticket) {
            Some(hit) => Ok(hit),
            None => geocoder.search(ticket.query()).await,
        };
        self.apply_suggestions(&ticket, result)
    }

    /// Moves the highlight to a hovered suggestion
    pub fn hover(&mut self, index: usize) {
        if index < self.suggestions.len() {
            self.highlighted = Some(index);
        }
    }

    pub fn on_blur(&mut self) {
        self.focused = false;
        self.debouncer.cancel();
        self.hide_suggestions();
    }

    pub fn on_key(&mut self, key: KeyCode) -> SearchKeyOutcome {
        let count = self.suggestions.len();
        match key {
            KeyCode::Enter => match self.highlighted {
                Some(index) if index < count => SearchKeyOutcome::Select(index),
                _ => SearchKeyOutcome::Submit,
            },
            KeyCode::ArrowDown => {
                let next = self.highlighted.map_or(0, |i| i + 1);
                if next < count {
                    self.highlighted = Some(next);
                }
                SearchKeyOutcome::Handled
            }
            KeyCode::ArrowUp => {
                if let Some(i) = self.highlighted.filter(|&i| i > 0) {
                    self.highlighted = Some(i - 1);
                }
                SearchKeyOutcome::Handled
            }
            KeyCode::Escape => {
                self.on_blur();
                SearchKeyOutcome::Dismissed
            }
            _ => SearchKeyOutcome::Ignored,
        }
    }

    // Results

    fn clear_markers(&mut self, map: &mut Map) {
        for marker in self.markers.drain(..) {
            map.remove_marker(marker);
        }
        self.results.clear();
    }

    fn mark(&mut self, map: &mut Map, result: SearchSuggestion) {
        let popup = PopupContent::SearchResult {
            title: result.label.clone(),
            position: result.coordinates,
        };
        let marker = Marker::new(result.coordinates, MarkerIcon::SearchPin).with_popup(popup);
        self.markers.push(map.add_marker(marker));
        self.results.push(result);
    }

    /// Picks a suggestion: fills the input, marks it and centers on it
    pub fn select(&mut self, map: &mut Map, notifier: &Notifier, index: usize) -> bool {
        let Some(suggestion) = self.suggestions.get(index).cloned() else {
            return false;
        };
        self.query = suggestion.label.clone();
        self.debouncer.cancel();
        self.searches.invalidate();
        self.hide_suggestions();

        self.clear_markers(map);
        map.set_view(suggestion.coordinates, self.search_zoom);
        notifier.success(
            "Location found",
            &format!("Navigating to: {}", suggestion.primary_name()),
        );
        self.mark(map, suggestion);
        true
    }

    /// Starts a full search for the current input
    pub fn begin_search(&mut self, map: &mut Map, notifier: &Notifier) -> SubmitOutcome {
        let query = self.query.trim().to_string();
        if query.is_empty() {
            notifier.warning("Empty field", "Type a city, place or coordinates");
            return SubmitOutcome::Rejected;
        }

        self.clear_markers(map);
        self.debouncer.cancel();
        self.hide_suggestions();
        notifier.info("Searching...", "Looking for the location on the map");

        if let Some(point) = parse_coordinates(&query) {
            self.searches.invalidate();
            self.show_results(map, notifier, vec![coordinate_result(point)]);
            return SubmitOutcome::Resolved;
        }

        SubmitOutcome::Lookup(SearchTicket {
            seq: self.searches.next(),
            query,
        })
    }

    /// Applies the geocoder's answer to a full search. Returns false when the
    /// search was superseded.
    pub fn complete_search(
        &mut self,
        map: &mut Map,
        notifier: &Notifier,
        ticket: SearchTicket,
        result: Result<Vec<SearchSuggestion>>,
    ) -> bool {
        if !self.searches.is_current(ticket.seq) {
            log::debug!("dropping stale search results for '{}'", ticket.query);
            return false;
        }
        match result {
            Ok(results) => self.show_results(map, notifier, results),
            Err(e) => {
                log::warn!("search for '{}' failed: {}", ticket.query, e);
                notifier.error("Search failed", "Could not look up the location");
            }
        }
        true
    }

    /// Full search for whatever is in the input box
    pub async fn submit(&mut self, map: &mut Map, notifier: &Notifier, geocoder: &dyn GeocodingService) {
        if let SubmitOutcome::Lookup(ticket) = self.begin_search(map, notifier) {
            let result = geocoder.search(ticket.query()).await;
            self.complete_search(map, notifier, ticket, result);
        }
    }

    fn show_results(&mut self, map: &mut Map, notifier: &Notifier, results: Vec<SearchSuggestion>) {
        let Some(first) = results.first().cloned() else {
            notifier.warning("Nothing found", "Try another search term");
            return;
        };

        let count = results.len();
        for result in results {
            self.mark(map, result);
        }
        map.set_view(first.coordinates, self.search_zoom);
        notifier.success(
            "Location found",
            &format!("{} result(s) found. First: {}", count, first.primary_name()),
        );
    }

    /// The zoom action bound to a result marker's popup
    pub fn zoom_to_result(&self, map: &mut Map, notifier: &Notifier, index: usize) -> bool {
        let Some(result) = self.results.get(index) else {
            return false;
        };
        map.set_view(result.coordinates, self.search_zoom);
        notifier.success("Zoom applied", "Location centered on the map");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::Point;
    use crate::ui::notification::NotificationKind;
    use crate::MapError;

    fn setup() -> (Map, Notifier, SearchController) {
        (
            Map::new(LatLng::new(-14.235, -51.925), 5.0, Point::new(800.0, 600.0)),
            Notifier::default(),
            SearchController::default(),
        )
    }

    fn places() -> Vec<SearchSuggestion> {
        vec![
            SearchSuggestion::new("Belo Horizonte, Minas Gerais, Brasil", LatLng::new(-19.92, -43.94), "city"),
            SearchSuggestion::new("Belo Vale, Minas Gerais, Brasil", LatLng::new(-20.41, -44.02), "town"),
        ]
    }

    #[test]
    fn test_coordinate_literals() {
        assert_eq!(parse_coordinates("19.9, -43.9"), Some(LatLng::new(19.9, -43.9)));
        assert_eq!(parse_coordinates(" -19.9 -43.9 "), Some(LatLng::new(-19.9, -43.9)));
        assert_eq!(parse_coordinates("Belo Horizonte"), None);
        assert_eq!(parse_coordinates("91, 10"), None);
        assert_eq!(parse_coordinates("10, 181"), None);
    }

    #[test]
    fn test_short_input_clears() {
        let (_, _, mut search) = setup();
        let ticket = search.on_input("Belo").unwrap();
        assert!(search.apply_suggestions(&ticket, Ok(places())));
        assert_eq!(search.announcement(), "2 suggestions found.");

        assert!(search.on_input(" B ").is_none());
        assert!(!search.suggestions_visible());
        assert_eq!(search.announcement(), "");
    }

    #[test]
    fn test_stale_suggestions_ignored() {
        let (_, _, mut search) = setup();
        let ticket = search.on_input("Belo").unwrap();
        search.on_input("");
        assert!(!search.apply_suggestions(&ticket, Ok(places())));
        assert!(search.suggestions().is_empty());
    }

    #[test]
    fn test_failed_lookup_clears_silently() {
        let (_, notifier, mut search) = setup();
        let ticket = search.on_input("Belo").unwrap();
        search.apply_suggestions(&ticket, Ok(places()));
        let ticket = search.on_input("Belo H").unwrap();
        let err = MapError::HttpStatus { status: 503, url: "https://geo".into() };
        assert!(search.apply_suggestions(&ticket, Err(err)));
        assert!(search.suggestions().is_empty());
        assert_eq!(notifier.pending(), 0);
    }

    #[test]
    fn test_keyboard_highlight_bounds() {
        let (_, _, mut search) = setup();
        assert_eq!(search.on_key(KeyCode::Enter), SearchKeyOutcome::Submit);

        let ticket = search.on_input("Belo").unwrap();
        search.apply_suggestions(&ticket, Ok(places()));
        assert_eq!(search.highlighted(), None);

        search.on_key(KeyCode::ArrowUp);
        assert_eq!(search.highlighted(), None);
        search.on_key(KeyCode::ArrowDown);
        search.on_key(KeyCode::ArrowDown);
        search.on_key(KeyCode::ArrowDown);
        assert_eq!(search.highlighted(), Some(1));
        search.on_key(KeyCode::ArrowUp);
        search.on_key(KeyCode::ArrowUp);
        assert_eq!(search.highlighted(), Some(0));
        assert_eq!(search.on_key(KeyCode::Enter), SearchKeyOutcome::Select(0));

        search.hover(1);
        assert_eq!(search.highlighted(), Some(1));

        assert_eq!(search.on_key(KeyCode::Escape), SearchKeyOutcome::Dismissed);
        assert!(!search.is_focused());
        assert!(!search.suggestions_visible());
    }

    #[test]
    fn test_select_marks_and_centers() {
        let (mut map, notifier, mut search) = setup();
        let ticket = search.on_input("Belo").unwrap();
        search.apply_suggestions(&ticket, Ok(places()));

        assert!(search.select(&mut map, &notifier, 1));
        assert_eq!(search.query(), "Belo Vale, Minas Gerais, Brasil");
        assert!(!search.suggestions_visible());
        assert_eq!(map.marker_count(), 1);
        assert_eq!(map.zoom(), 12.0);
        assert_eq!(map.viewport().center, LatLng::new(-20.41, -44.02));

        let messages = notifier.drain();
        assert_eq!(messages[0].message, "Navigating to: Belo Vale");
    }

    #[test]
    fn test_empty_submit_warns() {
        let (mut map, notifier, mut search) = setup();
        search.on_input("   ");
        assert_eq!(search.begin_search(&mut map, &notifier), SubmitOutcome::Rejected);
        let n = notifier.drain();
        assert_eq!(n.len(), 1);
        assert_eq!(n[0].kind, NotificationKind::Warning);
    }

    #[test]
    fn test_coordinate_submit_skips_lookup() {
        let (mut map, notifier, mut search) = setup();
        search.on_input("19.9, -43.9");
        assert_eq!(search.begin_search(&mut map, &notifier), SubmitOutcome::Resolved);
        assert_eq!(search.results()[0].label, "Coordinates: 19.900000, -43.900000");
        assert_eq!(map.marker_count(), 1);

        let marker = map.marker(search.markers()[0]).unwrap();
        assert_eq!(
            marker.popup().unwrap().to_string(),
            "Coordinates: 19.900000, -43.900000\nCoordinates: 19.900000, -43.900000"
        );
    }

    #[test]
    fn test_lookup_results_replace_markers() {
        let (mut map, notifier, mut search) = setup();
        search.on_input("Belo");
        let SubmitOutcome::Lookup(ticket) = search.begin_search(&mut map, &notifier) else {
            panic!("expected a lookup");
        };
        assert_eq!(ticket.query(), "Belo");
        assert!(search.complete_search(&mut map, &notifier, ticket, Ok(places())));
        assert_eq!(map.marker_count(), 2);
        assert!(search.zoom_to_result(&mut map, &notifier, 1));

        let last = notifier.drain().into_iter().map(|n| n.message).collect::<Vec<_>>();
        assert!(last.contains(&"2 result(s) found. First: Belo Horizonte".to_string()));

        let SubmitOutcome::Lookup(ticket) = search.begin_search(&mut map, &notifier) else {
            panic!("expected a lookup");
        };
        assert_eq!(map.marker_count(), 0);
        search.complete_search(&mut map, &notifier, ticket, Ok(vec![]));
        assert_eq!(map.marker_count(), 0);
        assert_eq!(notifier.drain().last().unwrap().title, "Nothing found");
    }
}
