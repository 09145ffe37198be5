use actix_web::{HttpResponse, ResponseError};
use askama::Template;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Io(std::io::Error),
    Csv(csv::Error),
    Template(askama::Error),
    Pptx(PptxError),
    NotFound(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Io(e) => write!(f, "I/O error: {e}"),
            AppError::Csv(e) => write!(f, "CSV error: {e}"),
            AppError::Template(e) => write!(f, "Template error: {e}"),
            AppError::Pptx(e) => write!(f, "Presentation error: {e}"),
            AppError::NotFound(what) => write!(f, "{what}"),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound(what) => HttpResponse::NotFound().body(what.clone()),
            _ => {
                log::error!("{self}");
                HttpResponse::InternalServerError().body("Internal Server Error")
            }
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io(e)
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        AppError::Csv(e)
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Template(e)
    }
}

impl From<PptxError> for AppError {
    fn from(e: PptxError) -> Self {
        AppError::Pptx(e)
    }
}

/// Render an Askama template into a 200 HTML response.
pub fn render<T: Template>(tmpl: T) -> Result<HttpResponse, AppError> {
    let body = tmpl.render()?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

/// Errors from reading or rewriting a .pptx package.
#[derive(Debug)]
pub enum PptxError {
    Zip(zip::result::ZipError),
    Xml(quick_xml::Error),
    Io(std::io::Error),
    Malformed(String),
}

impl fmt::Display for PptxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PptxError::Zip(e) => write!(f, "package error: {e}"),
            PptxError::Xml(e) => write!(f, "XML error: {e}"),
            PptxError::Io(e) => write!(f, "I/O error: {e}"),
            PptxError::Malformed(msg) => write!(f, "malformed part: {msg}"),
        }
    }
}

impl std::error::Error for PptxError {}

impl From<zip::result::ZipError> for PptxError {
    fn from(e: zip::result::ZipError) -> Self {
        PptxError::Zip(e)
    }
}

impl From<quick_xml::Error> for PptxError {
    fn from(e: quick_xml::Error) -> Self {
        PptxError::Xml(e)
    }
}

impl From<std::io::Error> for PptxError {
    fn from(e: std::io::Error) -> Self {
        PptxError::Io(e)
    }
}

/// Errors from QR synthesis or the remote image fetch. The handlers decide
/// whether to propagate these or degrade to a deck without the picture.
#[derive(Debug)]
pub enum AssetError {
    Qr(qrcode::types::QrError),
    Http(reqwest::Error),
    Status(reqwest::StatusCode),
    Image(image::ImageError),
    UnknownFormat,
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Qr(e) => write!(f, "QR encoding error: {e:?}"),
            AssetError::Http(e) => write!(f, "HTTP error: {e}"),
            AssetError::Status(s) => write!(f, "unexpected HTTP status: {s}"),
            AssetError::Image(e) => write!(f, "image error: {e}"),
            AssetError::UnknownFormat => write!(f, "unrecognized image format"),
        }
    }
}

impl std::error::Error for AssetError {}

impl From<qrcode::types::QrError> for AssetError {
    fn from(e: qrcode::types::QrError) -> Self {
        AssetError::Qr(e)
    }
}

impl From<reqwest::Error> for AssetError {
    fn from(e: reqwest::Error) -> Self {
        AssetError::Http(e)
    }
}

impl From<image::ImageError> for AssetError {
    fn from(e: image::ImageError) -> Self {
        AssetError::Image(e)
    }
}
