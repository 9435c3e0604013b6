pub mod source;

pub use source::{BaseLayer, EsriWorldImagerySource, OpenStreetMapSource, TileSource};
