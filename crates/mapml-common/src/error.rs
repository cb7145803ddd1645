//! Error types for MapML document generation.

use thiserror::Error;

/// Result type alias using MapmlError.
pub type MapmlResult<T> = Result<T, MapmlError>;

/// Primary error type for MapML operations.
#[derive(Debug, Error)]
pub enum MapmlError {
    // === Request Errors ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Could not find layer {0}")]
    LayerNotDefined(String),

    #[error("Style {style} is not available on layer {layer}")]
    StyleNotDefined { layer: String, style: String },

    #[error("This projection is not supported by MapML: {0}")]
    UnsupportedCrs(String),

    #[error("Invalid BBOX: {0}")]
    InvalidBbox(String),

    // === Processing Errors ===
    #[error("Encoding failed: {0}")]
    EncodingError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MapmlError {
    /// Get the OGC WMS exception code for this error.
    pub fn exception_code(&self) -> &'static str {
        match self {
            MapmlError::MissingParameter(_) => "MissingParameterValue",
            MapmlError::InvalidParameter { .. }
            | MapmlError::UnsupportedCrs(_)
            | MapmlError::InvalidBbox(_) => "InvalidParameterValue",
            MapmlError::LayerNotDefined(_) => "LayerNotDefined",
            MapmlError::StyleNotDefined { .. } => "StyleNotDefined",
            _ => "NoApplicableCode",
        }
    }

    /// The request parameter the error refers to, if any.
    pub fn locator(&self) -> Option<String> {
        match self {
            MapmlError::MissingParameter(param) => Some(param.to_lowercase()),
            MapmlError::InvalidParameter { param, .. } => Some(param.to_lowercase()),
            MapmlError::LayerNotDefined(_) => Some("layers".to_string()),
            MapmlError::StyleNotDefined { .. } => Some("styles".to_string()),
            MapmlError::UnsupportedCrs(_) => Some("crs".to_string()),
            MapmlError::InvalidBbox(_) => Some("bbox".to_string()),
            _ => None,
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            MapmlError::MissingParameter(_)
            | MapmlError::InvalidParameter { .. }
            | MapmlError::UnsupportedCrs(_)
            | MapmlError::InvalidBbox(_) => 400,

            MapmlError::LayerNotDefined(_) | MapmlError::StyleNotDefined { .. } => 404,

            _ => 500,
        }
    }
}

impl From<crate::bbox::BboxParseError> for MapmlError {
    fn from(err: crate::bbox::BboxParseError) -> Self {
        MapmlError::InvalidBbox(err.to_string())
    }
}

impl From<crate::crs::CrsParseError> for MapmlError {
    fn from(err: crate::crs::CrsParseError) -> Self {
        match err {
            crate::crs::CrsParseError::UnsupportedCrs(code) => MapmlError::UnsupportedCrs(code),
        }
    }
}

impl From<serde_json::Error> for MapmlError {
    fn from(err: serde_json::Error) -> Self {
        MapmlError::EncodingError(format!("JSON error: {}", err))
    }
}
