//! Multipart form reading shared by the upload-accepting endpoints.

use std::collections::HashMap;

use axum::extract::Multipart;
use tracing::info;

use crate::errors::AppError;
use crate::extract::{extract_text, OcrEngine, Upload};

/// Name of the optional file field on every upload form.
const FILE_FIELD: &str = "file";

/// A fully-read multipart form: text fields by name plus the optional upload.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    pub file: Option<Upload>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = field.name().unwrap_or_default().to_string();

            if name == FILE_FIELD {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(malformed)?;
                // Browsers submit an empty part when no file was chosen.
                if filename.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.file = Some(Upload { filename, bytes });
            } else {
                let value = field.text().await.map_err(malformed)?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Value of a text field, or "" when absent.
    pub fn text(&self, name: &str) -> &str {
        self.get(name).unwrap_or_default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Extracts reference text from the uploaded file, if one was sent.
    pub async fn reference_text(&self, ocr: &dyn OcrEngine) -> Result<Option<String>, AppError> {
        let Some(upload) = &self.file else {
            return Ok(None);
        };

        let text = extract_text(upload, ocr).await?;
        info!(
            "Extracted {} chars of reference text from {}",
            text.chars().count(),
            upload.filename
        );
        Ok(Some(text))
    }
}

fn malformed(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Malformed multipart body: {e}"))
}

#[cfg(test)]
impl UploadForm {
    pub fn from_fields(fields: &[(&str, &str)]) -> Self {
        UploadForm {
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            file: None,
        }
    }
}
