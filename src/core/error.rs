// Copyright @yucwang 2026

use thiserror::Error;

/// Host-side failures while loading images or scene descriptions. The
/// sampling routines never fail this way; they report zero densities.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
    #[error("exr error: {0}")]
    Exr(#[from] exr::error::Error),
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("missing field: {0}")]
    MissingField(&'static str),
}
