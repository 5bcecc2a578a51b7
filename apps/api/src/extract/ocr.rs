use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use tempfile::NamedTempFile;
use tokio::process::Command;

use super::ExtractError;
use crate::config::Config;

/// Recognizes text in a decoded image.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: DynamicImage) -> Result<String, ExtractError>;
}

/// Runs the Tesseract command-line engine (`<cmd> <image> stdout -l <lang>`).
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    command: String,
    lang: String,
}

impl TesseractOcr {
    pub fn new(command: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            lang: lang.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.tesseract_cmd.clone(), config.ocr_lang.clone())
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(&self, image: DynamicImage) -> Result<String, ExtractError> {
        // The temp file lives until the command has finished reading it.
        let file = tokio::task::spawn_blocking(move || write_png(&image))
            .await
            .map_err(|e| ExtractError::Image(format!("image encoder aborted: {e}")))??;

        let output = Command::new(&self.command)
            .arg(file.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .output()
            .await
            .map_err(|e| ExtractError::Image(format!("failed to run '{}': {e}", self.command)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::Image(format!(
                "'{}' exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn write_png(image: &DynamicImage) -> Result<NamedTempFile, ExtractError> {
    let file = tempfile::Builder::new()
        .prefix("ocr-")
        .suffix(".png")
        .tempfile()
        .map_err(|e| ExtractError::Image(format!("failed to create temp file: {e}")))?;
    image
        .save_with_format(file.path(), ImageFormat::Png)
        .map_err(|e| ExtractError::Image(e.to_string()))?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use image::RgbImage;

    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_extraction_error() {
        let ocr = TesseractOcr::new("/nonexistent/tesseract-binary", "eng");
        let image = DynamicImage::ImageRgb8(RgbImage::new(2, 2));

        match ocr.recognize(image).await {
            Err(ExtractError::Image(message)) => {
                assert!(message.contains("/nonexistent/tesseract-binary"), "{message}")
            }
            other => panic!("expected image error, got {other:?}"),
        }
    }

    #[test]
    fn test_write_png_produces_decodable_file() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(3, 5));
        let file = write_png(&image).unwrap();
        let decoded = image::open(file.path()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 5));
    }
}
