//! MapML protocol implementation.
//!
//! Turns a WMS GetMap request against a tiled CRS into a MapML document
//! (or an HTML page previewing it): layer lookup, zoom resolution, extent
//! composition, link templates, alternate projections and XML encoding.

pub mod builder;
pub mod catalog;
pub mod config;
pub mod document;
pub mod encoder;
pub mod exceptions;
pub mod extent;
pub mod html;
pub mod request;
pub mod templates;

pub use builder::{alternate_bounds, mapml_url, MapMlDocumentBuilder};
pub use catalog::{InMemoryCatalog, LayerCatalog};
pub use config::MapMlServiceConfig;
pub use document::{
    Axis, Body, Datalist, Extent, ExtentNode, Head, Input, InputType, Link, LinkRel,
    MapMlDocument, Meta, Position, Units,
};
pub use encoder::encode_mapml;
pub use exceptions::{service_exception_report, EXCEPTION_MIME_TYPE};
pub use extent::{compose_extents, effective_multi_extent, ExtentContext, RequestedLayer};
pub use html::render_html_preview;
pub use request::{
    parse_query_string, GetMapParams, MapMlRequest, OutputFormat, MAPML_HTML_MIME_TYPE,
    MAPML_MIME_TYPE,
};
pub use templates::TileMode;
