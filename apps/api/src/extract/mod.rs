//! Text extraction: turns an uploaded PDF or image into plain reference text.
//!
//! PDFs go through `pdf-extract`; PNG/JPEG uploads are decoded with `image` and
//! handed to an `OcrEngine`. Both libraries are synchronous and run on the
//! blocking pool.

use bytes::Bytes;
use image::DynamicImage;
use thiserror::Error;
use tracing::debug;

pub mod ocr;

pub use ocr::{OcrEngine, TesseractOcr};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("PDF processing error: {0}")]
    Pdf(String),

    #[error("Image processing error: {0}")]
    Image(String),
}

/// An uploaded file held fully in memory.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Image,
}

impl FileKind {
    /// Classifies by the lower-cased text after the last '.'. A name without
    /// a '.' has no extension and is unsupported.
    pub fn from_filename(filename: &str) -> Result<Self, ExtractError> {
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(FileKind::Pdf),
            "png" | "jpg" | "jpeg" => Ok(FileKind::Image),
            _ => Err(ExtractError::UnsupportedFormat(filename.to_string())),
        }
    }
}

/// Extracts plain text from an upload. The format is checked before any bytes
/// are decoded.
pub async fn extract_text(upload: &Upload, ocr: &dyn OcrEngine) -> Result<String, ExtractError> {
    let kind = FileKind::from_filename(&upload.filename)?;
    debug!(
        filename = %upload.filename,
        size = upload.bytes.len(),
        ?kind,
        "Extracting reference text"
    );

    match kind {
        FileKind::Pdf => extract_pdf_text(upload.bytes.clone()).await,
        FileKind::Image => {
            let image = decode_image(upload.bytes.clone()).await?;
            ocr.recognize(image).await
        }
    }
}

/// Concatenates the text of every page in page order.
async fn extract_pdf_text(bytes: Bytes) -> Result<String, ExtractError> {
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| ExtractError::Pdf(format!("PDF reader aborted: {e}")))?
        .map_err(|e| ExtractError::Pdf(e.to_string()))
}

async fn decode_image(bytes: Bytes) -> Result<DynamicImage, ExtractError> {
    tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(|e| ExtractError::Image(format!("image decoder aborted: {e}")))?
        .map_err(|e| ExtractError::Image(e.to_string()))
}
