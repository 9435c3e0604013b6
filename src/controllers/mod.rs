//! Interaction state machines over the shared map surface

pub mod feature_info;
pub mod filter;
pub mod measure;
pub mod search;

pub use feature_info::{ClickOutcome, FeatureInfoController, FeatureInfoTicket};
pub use filter::{FilterController, LayerFilter};
pub use measure::{format_distance, path_tooltip, MeasureController, MeasureState, MeasurementSession};
pub use search::{
    parse_coordinates, SearchController, SearchKeyOutcome, SearchTicket, SubmitOutcome,
    SuggestTicket,
};
