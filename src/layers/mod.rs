pub mod marker;
pub mod registry;
pub mod vector;
pub mod wms;

pub use marker::{Marker, MarkerIcon, MarkerId};
pub use registry::{LayerEntry, LayerRegistry};
pub use vector::{LineStyle, Polyline, PolylineId};
pub use wms::{LayerHandle, WmsLayer};
