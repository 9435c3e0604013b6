//! WMS request defaults and interaction tuning values.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 18.0;

/// Parameters every WMS overlay `GetMap` request carries.
pub const WMS_FORMAT: &str = "image/png";
pub const WMS_TRANSPARENT: bool = true;
pub const WMS_VERSION: &str = "1.1.0";

/// Upper bound on features returned by one `GetFeatureInfo` query.
pub const FEATURE_INFO_COUNT: u32 = 10;

/// Legend graphics are requested at this square size.
pub const LEGEND_ICON_SIZE: u32 = 20;

/// Maximum number of geocoding results per lookup.
pub const GEOCODING_LIMIT: usize = 5;

/// Minimum trimmed query length before suggestions are fetched.
pub const MIN_SUGGEST_CHARS: usize = 2;

/// Zoom applied when centering on a search result.
pub const SEARCH_ZOOM: f64 = 12.0;

/// Autocomplete debounce delay in milliseconds.
pub const SUGGEST_DEBOUNCE_MS: u64 = 300;

/// Scale denominator at zoom 1 used by the status bar (`1:N`).
pub const SCALE_AT_ZOOM_ONE: f64 = 591_657_550.5;

/// Measurement totals switch from meters to kilometers at this distance.
pub const KILOMETER_THRESHOLD: f64 = 1000.0;

/// Default lifetime of a transient notification.
pub const NOTIFICATION_MS: u64 = 5000;

/// Notifications kept while nobody drains the queue; the oldest go first.
pub const NOTIFICATION_BACKLOG: usize = 64;

/// Lifetime of the help notification.
pub const HELP_NOTIFICATION_MS: u64 = 8000;

/// Number of cached autocomplete responses.
pub const SUGGESTION_CACHE_SIZE: usize = 32;
