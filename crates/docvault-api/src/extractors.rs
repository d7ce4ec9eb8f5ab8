//! # Custom Extractors & Validation
//!
//! The [`Validate`] trait for JSON request DTOs, helpers that map
//! extractor rejections onto [`AppError`], and the multipart reader for
//! document uploads.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;

use crate::error::AppError;

/// Business-rule validation beyond what serde checks.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and validate it.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

/// Fields of a `multipart/form-data` document upload.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub doc_id: Option<String>,
    pub doc_name: Option<String>,
    /// Client-asserted owner. Advisory only.
    pub user_id: Option<String>,
}

/// The `file` part of an upload.
#[derive(Debug)]
pub struct UploadedFile {
    pub bytes: Bytes,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl UploadForm {
    /// Read every part of the form. Unknown parts are skipped.
    pub async fn read(
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<Self, AppError> {
        let mut multipart =
            multipart.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let file_name = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    form.file = Some(UploadedFile {
                        bytes,
                        file_name,
                        content_type,
                    });
                }
                "docid" => form.doc_id = Some(field.text().await.map_err(multipart_error)?),
                "docname" => form.doc_name = Some(field.text().await.map_err(multipart_error)?),
                "userid" => form.user_id = Some(field.text().await.map_err(multipart_error)?),
                other => tracing::debug!(field = %other, "ignoring unknown upload field"),
            }
        }

        Ok(form)
    }
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        value: String,
    }

    impl Validate for Sample {
        fn validate(&self) -> Result<(), String> {
            if self.value.is_empty() {
                return Err("value must not be empty".into());
            }
            Ok(())
        }
    }

    #[test]
    fn validation_failure_maps_to_validation_error() {
        let result = extract_validated_json(Ok(Json(Sample {
            value: String::new(),
        })));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn valid_body_passes_through() {
        let body = extract_validated_json(Ok(Json(Sample {
            value: "x".into(),
        })))
        .unwrap();
        assert_eq!(body.value, "x");
    }
}
