//! Picture asset acquisition: QR synthesis (pure, no network) and the
//! remote image download. Both return explicit errors; callers decide
//! whether a failed asset aborts the request or just leaves the
//! placeholder shape in the deck.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};
use qrcode::QrCode;

use crate::errors::AssetError;

/// Image bytes ready to be embedded as a picture part.
#[derive(Debug, Clone)]
pub struct PictureAsset {
    pub bytes: Vec<u8>,
    pub extension: &'static str,
    pub content_type: &'static str,
}

impl PictureAsset {
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            extension: "png",
            content_type: "image/png",
        }
    }
}

/// Synthesize a QR code encoding `url` and return it as PNG bytes.
/// Deterministic for a given input.
pub fn qr_png(url: &str) -> Result<PictureAsset, AssetError> {
    let code = QrCode::new(url.as_bytes())?;
    let img = code.render::<image::Luma<u8>>().build();
    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(img).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(PictureAsset::png(bytes))
}

/// Fetch a remote image. Non-success statuses and payloads the sniffer
/// does not recognize as an embeddable image are errors. No retries;
/// timeouts are whatever the client defaults to.
pub async fn fetch_image(url: &str) -> Result<PictureAsset, AssetError> {
    let response = reqwest::get(url).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AssetError::Status(status));
    }
    let bytes = response.bytes().await?.to_vec();
    let (extension, content_type) = match image::guess_format(&bytes) {
        Ok(ImageFormat::Png) => ("png", "image/png"),
        Ok(ImageFormat::Jpeg) => ("jpeg", "image/jpeg"),
        Ok(ImageFormat::Gif) => ("gif", "image/gif"),
        _ => return Err(AssetError::UnknownFormat),
    };
    Ok(PictureAsset {
        bytes,
        extension,
        content_type,
    })
}
