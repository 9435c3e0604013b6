//! Prelude module for common wmsview types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use wmsview::prelude::*;`

pub use crate::app::AppContext;

pub use crate::core::{
    config::{CatalogLayer, ViewerConfig},
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::{Cursor, Map},
    viewport::Viewport,
};

pub use crate::layers::{
    marker::{Marker, MarkerIcon},
    registry::{LayerEntry, LayerRegistry},
    vector::Polyline,
    wms::WmsLayer,
};

pub use crate::controllers::{
    feature_info::{FeatureInfoController, FeatureInfoTicket},
    filter::{FilterController, LayerFilter},
    measure::{MeasureController, MeasureState},
    search::{SearchController, SearchKeyOutcome, SearchTicket, SubmitOutcome, SuggestTicket},
};

pub use crate::services::{
    feature_info::{FeatureInfoRequest, FeatureInfoResponse, FeatureInfoService, WmsClient},
    geocoding::{GeocodingService, NominatimClient, SearchSuggestion},
};

pub use crate::input::events::{KeyCode, MapEvent};

pub use crate::tiles::{BaseLayer, TileSource};

pub use crate::ui::{
    legend::Legend,
    notification::{Notification, NotificationKind, Notifier},
    popup::{Popup, PopupContent},
    status::MapStatus,
};

#[cfg(feature = "egui")]
pub use crate::ui::panels::PanelAction;

pub use crate::{Error as MapError, Result};

pub use std::{sync::Arc, time::Duration};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
