use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Expected element not found: {context}")]
    MissingElement { context: String },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid date '{value}': expected a YYYY-MM-DD calendar date")]
    InvalidDate { value: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid CSS selector: {0}")]
    Selector(String),

    #[error("Rendering {url} failed: {message}")]
    Render { url: String, message: String },

    #[error("Timed out waiting for '{selector}' on {url}")]
    RenderTimeout { url: String, selector: String },
}

impl ScraperError {
    pub fn missing(context: impl Into<String>) -> Self {
        ScraperError::MissingElement {
            context: context.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScraperError>;
