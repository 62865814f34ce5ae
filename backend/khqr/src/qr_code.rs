//! Renders KHQR payloads into scannable PNG images.

use base64::Engine;
use error_stack::ResultExt;
use image::{DynamicImage, ImageBuffer, ImageFormat, Luma, Rgba};
use url::Url;

use common_utils::errors::CustomResult;

// The base64 PNG is appended to this prefix to form the data URL
pub(crate) const QR_IMAGE_DATA_SOURCE_STRING: &str = "data:image/png;base64";
pub const BASE64_ENGINE: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

/// Errors for QR rendering
#[derive(Debug, thiserror::Error)]
pub enum QrCodeError {
    /// Payload does not fit in any QR version
    #[error("Failed to create QR code")]
    FailedToCreateQrCode,
    #[error("Failed to encode QR code as PNG")]
    FailedToEncodeImage,
    #[error("Invalid hex color code supplied")]
    InvalidHexColor,
}

/// An encoded PNG of a KHQR payload
#[derive(Debug, Clone)]
pub struct QrImage {
    png: Vec<u8>,
}

impl QrImage {
    pub fn new_from_data(data: &str) -> CustomResult<Self, QrCodeError> {
        let qr_code = qrcode::QrCode::new(data.as_bytes())
            .change_context(QrCodeError::FailedToCreateQrCode)?;
        let buffer = qr_code.render::<Luma<u8>>().build();
        Self::encode(DynamicImage::ImageLuma8(buffer))
    }

    /// Same as [`QrImage::new_from_data`] with dark modules painted in `hex_color`
    pub fn new_colored_from_data(data: &str, hex_color: &str) -> CustomResult<Self, QrCodeError> {
        let (r, g, b) = parse_hex_color(hex_color)?;
        let qr_code = qrcode::QrCode::new(data.as_bytes())
            .change_context(QrCodeError::FailedToCreateQrCode)?;
        let buffer = qr_code.render::<Luma<u8>>().build();

        let (width, height) = buffer.dimensions();
        let mut colored = ImageBuffer::new(width, height);
        for (x, y, pixel) in buffer.enumerate_pixels() {
            let color = if pixel.0[0] == 0 {
                Rgba([r, g, b, 255])
            } else {
                Rgba([255, 255, 255, 255])
            };
            colored.put_pixel(x, y, color);
        }
        Self::encode(DynamicImage::ImageRgba8(colored))
    }

    fn encode(image: DynamicImage) -> CustomResult<Self, QrCodeError> {
        let mut png = std::io::Cursor::new(Vec::new());
        image
            .write_to(&mut png, ImageFormat::Png)
            .change_context(QrCodeError::FailedToEncodeImage)?;
        Ok(Self {
            png: png.into_inner(),
        })
    }

    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    /// `data:image/png;base64,...` form, suitable for an `<img>` source
    pub fn data_url(&self) -> String {
        format!(
            "{},{}",
            QR_IMAGE_DATA_SOURCE_STRING,
            BASE64_ENGINE.encode(&self.png)
        )
    }

    pub fn to_url(&self) -> CustomResult<Url, QrCodeError> {
        Url::parse(&self.data_url()).change_context(QrCodeError::FailedToEncodeImage)
    }
}

pub fn parse_hex_color(hex: &str) -> CustomResult<(u8, u8, u8), QrCodeError> {
    let hex = hex.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|digits| u8::from_str_radix(digits, 16).ok())
    };
    match (hex.len(), channel(0..2), channel(2..4), channel(4..6)) {
        (6, Some(r), Some(g), Some(b)) => Ok((r, g, b)),
        _ => Err(QrCodeError::InvalidHexColor)
            .attach_printable_lazy(|| format!("{hex:?} is not an RGB hex color")),
    }
}
