use crate::constants::{MAX_ZOOM, MIN_ZOOM, TILE_SIZE};
use crate::core::geo::{LatLng, LatLngBounds, Point, EARTH_RADIUS};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const HALF_WORLD: f64 = PI * EARTH_RADIUS;

/// What the map widget currently shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: f64,
    /// Widget size in pixels
    pub size: Point,
}

impl Viewport {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        let mut viewport = Self {
            center: LatLng::default(),
            zoom: MIN_ZOOM,
            size,
        };
        viewport.set_center(center);
        viewport.set_zoom(zoom);
        viewport
    }

    /// Latitude is kept inside the Mercator limit
    pub fn set_center(&mut self, center: LatLng) {
        self.center = LatLng::new(LatLng::clamp_lat(center.lat), center.lng.clamp(-180.0, 180.0));
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    /// Side of the whole world in pixels at the current zoom
    fn world_pixels(&self) -> f64 {
        f64::from(TILE_SIZE) * 2_f64.powf(self.zoom)
    }

    /// Absolute pixel position of `lat_lng`, origin at the north-west corner of the world
    fn to_world(&self, lat_lng: &LatLng) -> Point {
        let meters = lat_lng.to_mercator();
        let k = self.world_pixels() / (2.0 * HALF_WORLD);
        Point::new((meters.x + HALF_WORLD) * k, (HALF_WORLD - meters.y) * k)
    }

    fn from_world(&self, pixel: &Point) -> LatLng {
        let k = (2.0 * HALF_WORLD) / self.world_pixels();
        LatLng::from_mercator(Point::new(pixel.x * k - HALF_WORLD, HALF_WORLD - pixel.y * k))
    }

    /// Widget pixel for a geographic position
    pub fn lat_lng_to_pixel(&self, lat_lng: &LatLng) -> Point {
        let half = Point::new(self.size.x / 2.0, self.size.y / 2.0);
        self.to_world(lat_lng)
            .subtract(&self.to_world(&self.center))
            .add(&half)
    }

    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        let half = Point::new(self.size.x / 2.0, self.size.y / 2.0);
        let world = self.to_world(&self.center).add(&pixel.subtract(&half));
        self.from_world(&world)
    }

    /// Geographic extent of the widget, the BBOX of feature-info queries
    pub fn bounds(&self) -> LatLngBounds {
        let nw = self.pixel_to_lat_lng(&Point::new(0.0, 0.0));
        let se = self.pixel_to_lat_lng(&self.size);
        LatLngBounds::from_coords(se.lat, nw.lng, nw.lat, se.lng)
    }

    /// `(WIDTH, HEIGHT)` as sent to the WMS server
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.size.x.round().max(0.0) as u32, self.size.y.round().max(0.0) as u32)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::default(), MIN_ZOOM, Point::new(800.0, 600.0))
    }
}
