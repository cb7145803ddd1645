//! WMS service exception reports for failed MapML requests.

use quick_xml::escape::escape;

use mapml_common::MapmlError;

/// Content type of exception reports.
pub const EXCEPTION_MIME_TYPE: &str = "application/vnd.ogc.se_xml";

/// Render a `ServiceExceptionReport` carrying the error's code and locator.
pub fn service_exception_report(err: &MapmlError) -> String {
    let locator = err
        .locator()
        .map(|l| format!(r#" locator="{}""#, escape(&l)))
        .unwrap_or_default();

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<ServiceExceptionReport version="1.3.0" xmlns="http://www.opengis.net/ogc">"#,
            r#"<ServiceException code="{}"{}>{}</ServiceException>"#,
            "</ServiceExceptionReport>"
        ),
        err.exception_code(),
        locator,
        escape(&err.to_string())
    )
}
