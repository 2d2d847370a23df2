//! Multipart form reading

use std::collections::HashMap;

use axum::extract::Multipart;

use crate::error::AppError;
use crate::storage::Upload;

/// Text fields and files of a multipart body, keyed by field name
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, Upload>,
}

impl MultipartForm {
    /// Read every part of the body
    ///
    /// Parts carrying a file name are files; everything else is text.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to parse multipart: {}", e)))?
        {
            let name = field.name().unwrap_or("").to_string();
            if field.file_name().is_some() {
                let content_type = field.content_type().map(|s| s.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file: {}", e)))?;
                form.files.insert(
                    name,
                    Upload {
                        bytes: bytes.to_vec(),
                        content_type,
                    },
                );
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read field: {}", e)))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    pub fn text(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }

    pub fn file(&mut self, name: &str) -> Option<Upload> {
        self.files.remove(name)
    }
}
