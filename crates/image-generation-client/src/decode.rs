//! Local step of the pipeline: base64 → image → file.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;
use tracing::info;

use crate::error::{ImageClientError, Result};
use crate::types::EncodedImage;

/// Decodes `encoded` and writes it to `destination` in the image's own format
/// (the file extension is not consulted). Nothing is written when decoding or re-encoding fails.
pub fn decode_and_store(encoded: &EncodedImage, destination: &Path) -> Result<()> {
    let bytes = STANDARD
        .decode(encoded.payload())
        .map_err(|e| ImageClientError::Decode(format!("invalid base64: {}", e)))?;

    let format = image::guess_format(&bytes)
        .map_err(|e| ImageClientError::Decode(format!("unrecognized image data: {}", e)))?;
    let image = image::load_from_memory_with_format(&bytes, format)
        .map_err(|e| ImageClientError::Decode(e.to_string()))?;

    store(&image, format, destination)?;

    info!(
        path = %destination.display(),
        format = ?format,
        width = image.width(),
        height = image.height(),
        "step: generated image stored"
    );
    Ok(())
}

/// Encodes in memory first; the file is only created once encoding succeeded.
fn store(image: &DynamicImage, format: ImageFormat, destination: &Path) -> Result<()> {
    let mut encoded = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut encoded), format)
        .map_err(|e| ImageClientError::Decode(format!("cannot encode {:?}: {}", format, e)))?;
    std::fs::write(destination, encoded)?;
    Ok(())
}
