use ::geo::HaversineDistance;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// WGS84 semi-major axis, used by the spherical Mercator math below
pub(crate) const EARTH_RADIUS: f64 = 6378137.0;
/// Latitude where spherical Mercator becomes a square world
const MERCATOR_LAT_LIMIT: f64 = 85.0511287798;

/// Geographic position in decimal degrees (EPSG:4326)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Latitude in [-90, 90] and longitude in [-180, 180]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    /// Haversine distance in meters
    pub fn distance_to(&self, other: &LatLng) -> f64 {
        geo_types::Point::from(*self).haversine_distance(&geo_types::Point::from(*other))
    }

    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MERCATOR_LAT_LIMIT, MERCATOR_LAT_LIMIT)
    }

    /// Projects onto EPSG:3857 meters
    pub fn to_mercator(&self) -> Point {
        let phi = Self::clamp_lat(self.lat).to_radians();
        Point::new(
            EARTH_RADIUS * self.lng.to_radians(),
            EARTH_RADIUS * (PI / 4.0 + phi / 2.0).tan().ln(),
        )
    }

    pub fn from_mercator(meters: Point) -> Self {
        let lat = 2.0 * (meters.y / EARTH_RADIUS).exp().atan() - PI / 2.0;
        Self::new(lat.to_degrees(), (meters.x / EARTH_RADIUS).to_degrees())
    }
}

// geo-types is x/y, so longitude goes first.
impl From<LatLng> for geo_types::Point<f64> {
    fn from(p: LatLng) -> Self {
        geo_types::Point::new(p.lng, p.lat)
    }
}

impl From<LatLng> for geo_types::Coord<f64> {
    fn from(p: LatLng) -> Self {
        geo_types::coord! { x: p.lng, y: p.lat }
    }
}

/// Screen pixels or projected meters, depending on context
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, rhs: &Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }

    pub fn subtract(&self, rhs: &Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned geographic rectangle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    pub fn from_coords(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(LatLng::new(south, west), LatLng::new(north, east))
    }

    pub fn contains(&self, p: &LatLng) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&p.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&p.lng)
    }

    /// `west,south,east,north`, the order WMS 1.1 expects for EPSG:4326
    pub fn to_bbox_string(&self) -> String {
        format!(
            "{},{},{},{}",
            self.south_west.lng, self.south_west.lat, self.north_east.lng, self.north_east.lat
        )
    }
}

/// Slippy-map tile address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    fn tiles_per_side(z: u8) -> f64 {
        f64::from(1u32 << z.min(31))
    }

    /// Tile holding `p` at zoom `z`
    pub fn containing(p: &LatLng, z: u8) -> Self {
        let n = Self::tiles_per_side(z);
        let phi = LatLng::clamp_lat(p.lat).to_radians();
        let x = (p.lng + 180.0) / 360.0 * n;
        let y = (1.0 - phi.tan().asinh() / PI) / 2.0 * n;
        Self::new(x.floor() as u32, y.floor() as u32, z)
    }

    /// North-west corner
    pub fn origin(&self) -> LatLng {
        let n = Self::tiles_per_side(self.z);
        let phi = (PI * (1.0 - 2.0 * f64::from(self.y) / n)).sinh().atan();
        LatLng::new(phi.to_degrees(), f64::from(self.x) / n * 360.0 - 180.0)
    }

    pub fn bounds(&self) -> LatLngBounds {
        let nw = self.origin();
        let se = TileCoord::new(self.x + 1, self.y + 1, self.z).origin();
        LatLngBounds::from_coords(se.lat, nw.lng, nw.lat, se.lng)
    }

    /// Extent in EPSG:3857 as `[minx, miny, maxx, maxy]`
    pub fn mercator_bbox(&self) -> [f64; 4] {
        let LatLngBounds {
            south_west,
            north_east,
        } = self.bounds();
        let (sw, ne) = (south_west.to_mercator(), north_east.to_mercator());
        [sw.x, sw.y, ne.x, ne.y]
    }

    pub fn is_valid(&self) -> bool {
        let n = Self::tiles_per_side(self.z);
        f64::from(self.x) < n && f64::from(self.y) < n
    }
}
