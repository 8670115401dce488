//! Error types shared by every pipeline stage

/// Result type for storyboard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for storyboard operations
///
/// Only `RenderRecoverable` is ever handled locally (a single cast thumbnail
/// is dropped and the entry is rendered as text). Everything else aborts the
/// run and is reported to the operator.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{service} error: {message}")]
    ExternalService {
        service: &'static str,
        message: String,
    },

    #[error("Video processing failed: {0}")]
    Media(String),

    #[error("Thumbnail unavailable: {0}")]
    RenderRecoverable(String),

    #[error("Subtitle parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Render error: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Build an `ExternalService` error for one of the scraped sites
    pub fn external(service: &'static str, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service,
            message: message.into(),
        }
    }

    /// Scraper failures are treated as "nothing found" for control flow
    pub fn into_not_found(self) -> Self {
        match self {
            Self::ExternalService { service, message } => {
                Self::NotFound(format!("{} lookup failed: {}", service, message))
            }
            Self::Http(e) => Self::NotFound(format!("request failed: {}", e)),
            other => other,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::RenderRecoverable(_))
    }
}
