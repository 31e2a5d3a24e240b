//! Error handling

/// Errors raised while talking to the catalog, the image host, the model or the disk.
#[derive(Debug)]
pub enum MemeError {
    /// The HTTP request itself failed (connect, timeout, body read)
    Http(reqwest::Error),
    /// The server answered with a non-2xx status
    HttpStatus {
        /// URL that was requested
        url: String,
        /// Status code returned
        status: u16,
    },
    /// Filesystem failures
    Io(std::io::Error),
    /// A JSON payload could not be parsed
    Json(serde_json::Error),
    /// An image could not be decoded or encoded
    Image(image::ImageError),
    /// The catalog answered but flagged the request as failed
    Catalog(String),
    /// The language model call failed or its stream was malformed
    Model(String),
    /// A configured URL is not valid
    InvalidUrl(url::ParseError),
}

impl std::fmt::Display for MemeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(err) => write!(f, "HTTP request failed: {err}"),
            Self::HttpStatus { url, status } => write!(f, "HTTP {status} from {url}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Json(err) => write!(f, "Failed to parse JSON: {err}"),
            Self::Image(err) => write!(f, "Image error: {err}"),
            Self::Catalog(message) => write!(f, "Catalog request failed: {message}"),
            Self::Model(message) => write!(f, "Model request failed: {message}"),
            Self::InvalidUrl(err) => write!(f, "Invalid URL: {err}"),
        }
    }
}

impl std::error::Error for MemeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Image(err) => Some(err),
            Self::InvalidUrl(err) => Some(err),
            Self::HttpStatus { .. } | Self::Catalog(_) | Self::Model(_) => None,
        }
    }
}

impl From<reqwest::Error> for MemeError {
    fn from(err: reqwest::Error) -> Self {
        MemeError::Http(err)
    }
}

impl From<std::io::Error> for MemeError {
    fn from(err: std::io::Error) -> Self {
        MemeError::Io(err)
    }
}

impl From<serde_json::Error> for MemeError {
    fn from(err: serde_json::Error) -> Self {
        MemeError::Json(err)
    }
}

impl From<image::ImageError> for MemeError {
    fn from(err: image::ImageError) -> Self {
        MemeError::Image(err)
    }
}

impl From<url::ParseError> for MemeError {
    fn from(err: url::ParseError) -> Self {
        MemeError::InvalidUrl(err)
    }
}
