//! Point-to-point distance measurement
//!
//! Measurement is a mode: while it is on, map clicks add numbered vertices
//! instead of querying features, and the delete keys undo the last vertex.
//! All drawn state lives in a [`MeasurementSession`] that is created when the
//! mode is entered and dropped, along with everything it drew, when it ends.

use geo::HaversineLength;
use num_format::{Locale, ToFormattedString};

use crate::{
    constants::KILOMETER_THRESHOLD,
    controllers::feature_info::FeatureInfoController,
    core::{
        geo::LatLng,
        map::{Cursor, Map},
    },
    input::events::KeyCode,
    layers::{
        marker::{Marker, MarkerId},
        vector::{LineStyle, Polyline, PolylineId},
    },
    ui::notification::Notifier,
};

/// `"<n> m"` below a kilometer, `"<x.xx> km"` from there on
pub fn format_distance(meters: f64) -> String {
    if meters >= KILOMETER_THRESHOLD {
        format!("{:.2} km", meters / 1000.0)
    } else {
        format!("{} m", meters.round() as i64)
    }
}

/// Path label: kilometers also carry the rounded meter count, e.g.
/// `"Distance: 1.23 km (1,234 m)"`
pub fn path_tooltip(meters: f64) -> String {
    if meters >= KILOMETER_THRESHOLD {
        let whole = (meters.round() as u64).to_formatted_string(&Locale::en);
        format!("Distance: {} ({} m)", format_distance(meters), whole)
    } else {
        format!("Distance: {}", format_distance(meters))
    }
}

/// Points of one measurement and the map objects drawn for them.
/// `markers` is index-aligned with `points`; `path` exists iff there are at
/// least two points.
#[derive(Debug, Default)]
pub struct MeasurementSession {
    points: Vec<LatLng>,
    markers: Vec<MarkerId>,
    path: Option<PolylineId>,
}

impl MeasurementSession {
    pub fn points(&self) -> &[LatLng] {
        &self.points
    }

    pub fn markers(&self) -> &[MarkerId] {
        &self.markers
    }

    pub fn path(&self) -> Option<PolylineId> {
        self.path
    }

    /// Sum of the great-circle distances between consecutive points, in meters
    pub fn total_distance(&self) -> f64 {
        let line: geo_types::LineString<f64> = self
            .points
            .iter()
            .map(|p| geo_types::Coord::from(*p))
            .collect();
        line.haversine_length()
    }

    fn push(&mut self, map: &mut Map, point: LatLng) {
        self.points.push(point);
        let marker = map.add_marker(Marker::numbered(point, self.points.len()));
        self.markers.push(marker);
        self.redraw_path(map);
    }

    fn pop(&mut self, map: &mut Map) -> Option<LatLng> {
        let point = self.points.pop()?;
        if let Some(marker) = self.markers.pop() {
            map.remove_marker(marker);
        }
        self.redraw_path(map);
        Some(point)
    }

    fn redraw_path(&mut self, map: &mut Map) {
        if let Some(path) = self.path.take() {
            map.remove_polyline(path);
        }
        if self.points.len() >= 2 {
            let tooltip = path_tooltip(self.total_distance());
            let line = Polyline::new(self.points.clone(), LineStyle::measurement()).with_tooltip(tooltip);
            self.path = Some(map.add_polyline(line));
        }
    }

    fn clear(self, map: &mut Map) {
        for marker in self.markers {
            map.remove_marker(marker);
        }
        if let Some(path) = self.path {
            map.remove_polyline(path);
        }
    }
}

#[derive(Debug, Default)]
pub enum MeasureState {
    #[default]
    Idle,
    Measuring(MeasurementSession),
}

#[derive(Debug, Default)]
pub struct MeasureController {
    state: MeasureState,
}

impl MeasureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &MeasureState {
        &self.state
    }

    pub fn is_measuring(&self) -> bool {
        matches!(self.state, MeasureState::Measuring(_))
    }

    pub fn session(&self) -> Option<&MeasurementSession> {
        match &self.state {
            MeasureState::Measuring(session) => Some(session),
            MeasureState::Idle => None,
        }
    }

    /// Running total, if a measurement is active
    pub fn total_distance(&self) -> Option<f64> {
        self.session().map(MeasurementSession::total_distance)
    }

    /// The toolbar button: enters measurement when idle, ends it otherwise.
    /// Returns whether measurement is now active.
    pub fn toggle(
        &mut self,
        map: &mut Map,
        feature_info: &mut FeatureInfoController,
        notifier: &Notifier,
    ) -> bool {
        match std::mem::take(&mut self.state) {
            MeasureState::Idle => {
                feature_info.set_measuring(map, true);
                map.set_cursor(Cursor::Crosshair);
                self.state = MeasureState::Measuring(MeasurementSession::default());
                log::info!("measurement started");
                notifier.info(
                    "Measurement mode on",
                    "Click the map to add points. Press Backspace to undo. Click \"Cancel\" to exit.",
                );
                true
            }
            MeasureState::Measuring(session) => {
                session.clear(map);
                map.set_cursor(Cursor::Default);
                feature_info.set_measuring(map, false);
                log::info!("measurement ended");
                false
            }
        }
    }

    /// Adds a vertex. Returns false when measurement is off.
    pub fn on_click(&mut self, map: &mut Map, notifier: &Notifier, lat_lng: LatLng) -> bool {
        let MeasureState::Measuring(session) = &mut self.state else {
            return false;
        };
        session.push(map, lat_lng);

        if session.points.len() == 1 {
            notifier.info(
                "First point added",
                "Click another spot to add the second point. Press Backspace to undo.",
            );
        } else {
            notifier.success(
                "Point added",
                &format!(
                    "Current distance: {}. Click to add more points or \"Cancel\" to finish.",
                    format_distance(session.total_distance())
                ),
            );
        }
        true
    }

    /// Undo keys remove the last vertex; Escape ends the measurement.
    /// Returns whether the key was consumed.
    pub fn on_key(
        &mut self,
        map: &mut Map,
        feature_info: &mut FeatureInfoController,
        notifier: &Notifier,
        key: KeyCode,
    ) -> bool {
        if !self.is_measuring() {
            return false;
        }
        match key {
            k if k.is_undo() => {
                self.undo(map, notifier);
                true
            }
            KeyCode::Escape => {
                self.toggle(map, feature_info, notifier);
                true
            }
            _ => false,
        }
    }

    /// Removes the last vertex, if any
    pub fn undo(&mut self, map: &mut Map, notifier: &Notifier) {
        let MeasureState::Measuring(session) = &mut self.state else {
            return;
        };
        if session.pop(map).is_none() {
            return;
        }

        match session.points.len() {
            0 => notifier.info("Measurement cancelled", "All points were removed"),
            1 => notifier.info("Point removed", "Click another spot to add the second point"),
            _ => notifier.info("Point removed", "Click another spot to add more points"),
        }
    }
}
