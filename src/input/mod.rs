pub mod events;

pub use events::{KeyCode, MapEvent};
