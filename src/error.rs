use thiserror::Error;

/// Errors that can occur while exporting the page to a PDF file
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Please add content to your document first!")]
    EmptyDocument,

    #[error("An export is already running")]
    InFlight,

    #[error("Failed to rasterize page: {0}")]
    Raster(String),

    #[error("Export crashed: {0}")]
    Crashed(String),

    #[error("Failed to load font: {0}")]
    Font(&'static str),

    #[error("Failed to assemble PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Failed to write PDF: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while importing text from a PDF
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("No file provided")]
    NoFile,

    #[error("No text found in PDF. Please ensure the PDF contains readable text.")]
    NoText,

    #[error("Failed to read PDF: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while resolving an image source
#[derive(Debug, Error)]
pub enum ImageSourceError {
    #[error("Image source is empty")]
    Empty,

    #[error("Failed to fetch image: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Image server answered {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Malformed data URI")]
    MalformedDataUri,

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Failed to read image file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Errors that can occur while loading the editor configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
