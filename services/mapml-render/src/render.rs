//! GetMap query to MapML, HTML or JSON output.

use clap::ValueEnum;
use tracing::info;

use mapml_common::{MapmlError, MapmlResult, TcrsRegistry};
use mapml_protocol::{
    encode_mapml, service_exception_report, GetMapParams, MapMlDocumentBuilder, OutputFormat,
    EXCEPTION_MIME_TYPE, MAPML_HTML_MIME_TYPE, MAPML_MIME_TYPE,
};

use crate::catalog_config::CatalogConfig;

/// Output encoding selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputKind {
    /// MapML XML
    Mapml,
    /// HTML page embedding a mapml-viewer
    Html,
    /// The document model as JSON
    Json,
}

impl From<OutputFormat> for OutputKind {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::MapMl => OutputKind::Mapml,
            OutputFormat::Html => OutputKind::Html,
        }
    }
}

/// A rendered response body with its content type.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub content_type: &'static str,
    pub body: String,
}

/// Parse a GetMap query string and render it against the catalog.
///
/// `output` overrides the encoding selected by the request FORMAT.
pub fn render_query(
    config: &CatalogConfig,
    query: &str,
    workspace: Option<&str>,
    output: Option<OutputKind>,
) -> MapmlResult<Rendered> {
    let mut request = GetMapParams::from_query(query)?.into_request(TcrsRegistry::global())?;
    if let Some(ws) = workspace {
        request = request.with_workspace(ws);
    }

    let builder = MapMlDocumentBuilder::new(&config.catalog, &config.service);
    let kind = output.unwrap_or_else(|| request.output.into());

    info!(
        layers = ?request.layers,
        tcrs = %request.tcrs,
        output = ?kind,
        "Rendering GetMap request"
    );

    let rendered = match kind {
        OutputKind::Mapml => Rendered {
            content_type: MAPML_MIME_TYPE,
            body: encode_mapml(&builder.build(&request)?)?,
        },
        OutputKind::Html => Rendered {
            content_type: MAPML_HTML_MIME_TYPE,
            body: builder.build_html(&request)?,
        },
        OutputKind::Json => Rendered {
            content_type: "application/json",
            body: serde_json::to_string_pretty(&builder.build(&request)?)?,
        },
    };
    Ok(rendered)
}

/// The service exception report for a failed request.
pub fn render_exception(err: &MapmlError) -> Rendered {
    Rendered {
        content_type: EXCEPTION_MIME_TYPE,
        body: service_exception_report(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapml_protocol::InMemoryCatalog;
    use mapml_protocol::MapMlServiceConfig;
    use test_utils::fixtures;

    fn config() -> CatalogConfig {
        CatalogConfig {
            service: MapMlServiceConfig::default(),
            catalog: InMemoryCatalog::from_layers(fixtures::demo_layers()),
        }
    }

    const QUERY: &str = "SERVICE=WMS&VERSION=1.3.0&REQUEST=GetMap&LAYERS=Lakes&STYLES=\
                         &CRS=MapML:OSMTILE&WIDTH=150&HEIGHT=150";

    #[test]
    fn test_format_selects_output() {
        let out = render_query(&config(), QUERY, None, None).unwrap();
        assert_eq!(out.content_type, "text/mapml");
        assert!(out.body.contains("<mapml-"));

        let html_query = format!("{}&FORMAT=text/html", QUERY);
        let out = render_query(&config(), &html_query, None, None).unwrap();
        assert_eq!(out.content_type, "text/html; subtype=mapml");
        assert!(out.body.contains("<mapml-viewer"));
    }

    #[test]
    fn test_output_override_and_workspace() {
        let out = render_query(&config(), QUERY, Some("cite"), Some(OutputKind::Json)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out.body).unwrap();
        assert_eq!(json["head"]["base"], "http://localhost:8080/geoserver/cite/wms");
        assert_eq!(json["body"]["extents"][0]["units"], "OSMTILE");
    }

    #[test]
    fn test_unknown_layer_error() {
        let query = QUERY.replace("LAYERS=Lakes", "LAYERS=Rivers");
        let err = render_query(&config(), &query, None, None).unwrap_err();
        assert_eq!(err.exception_code(), "LayerNotDefined");

        let report = render_exception(&err);
        assert_eq!(report.content_type, "application/vnd.ogc.se_xml");
        assert!(report.body.contains(r#"code="LayerNotDefined" locator="layers""#));
    }
}
