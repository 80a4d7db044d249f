//! Multipart form reading shared by the extract and modify handlers

use axum::extract::multipart::{Multipart, MultipartError};
use metaed_common::api::{FILE_FIELD, METADATA_FIELD};

use crate::error::ApiError;

/// Uploaded file part
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Fields of an extract/modify form
#[derive(Default)]
pub struct UploadForm {
    /// Present only when a file with a non-empty name was sent
    pub file: Option<UploadedFile>,
    /// Raw `metadata` text, if sent
    pub metadata: Option<String>,
}

impl UploadForm {
    /// Drain the multipart body, ignoring unknown fields
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let field_name = field.name().map(str::to_string);
            match field_name.as_deref() {
                Some(FILE_FIELD) => {
                    let name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await?;
                    if !name.is_empty() {
                        form.file = Some(UploadedFile {
                            name,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                Some(METADATA_FIELD) => form.metadata = Some(field.text().await?),
                _ => {}
            }
        }

        Ok(form)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Multipart {
            status: err.status(),
            message: err.body_text(),
        }
    }
}
