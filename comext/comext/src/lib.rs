mod config;
mod error;
mod extractor;
mod transport;

pub use comext_arrow as arrow;
pub use comext_core as core;
pub use config::{ClientConfig, DEFAULT_PRIMARY_BASE_URL, DEFAULT_SECONDARY_BASE_URL};
pub use error::{AttemptError, BODY_EXCERPT_CHARS, ExtractError, Stage, TransportError};
pub use extractor::{DatasetDimensions, Extractor, ExtractorBuilder};
pub use transport::{HttpRequest, HttpResponse, ResponseFormat, Transport};
