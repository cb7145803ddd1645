//! MapML rendering front end.
//!
//! Exposes the catalog loader and the request-to-output pipeline used by
//! the `mapml-render` binary.

pub mod catalog_config;
pub mod render;

pub use catalog_config::CatalogConfig;
pub use render::{render_exception, render_query, OutputKind, Rendered};
