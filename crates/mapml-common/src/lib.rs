//! Common types shared across the MapML crates.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod layer;
pub mod tcrs;
pub mod zoom;

pub use bbox::BoundingBox;
pub use crs::{AxisOrder, CrsCode};
pub use error::{MapmlError, MapmlResult};
pub use layer::{LayerKind, LayerStyle, PublishedLayer, ScaleRange, ShardConfig};
pub use tcrs::{TcrsId, TcrsRegistry, TileMatrix, TiledCrs};
pub use zoom::{clamp_zoom, resolve_zoom, ZoomRange};
