//! Validated upload input.
//!
//! Everything that reaches the blob store has passed through
//! [`UploadRequest::new`]. Malformed input fails here, before any I/O.

use bytes::Bytes;
use docvault_core::{DocId, OwnerId};

use crate::error::CustodyError;

/// Content type recorded when the client declares none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const MAX_NAME_LEN: usize = 1024;
const MAX_CONTENT_TYPE_LEN: usize = 255;

/// A checked upload, ready for [`DocumentCustodyService::upload`](crate::DocumentCustodyService::upload).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    owner_id: OwnerId,
    doc_id: DocId,
    blob: Bytes,
    name: String,
    content_type: String,
}

impl UploadRequest {
    /// Validate raw upload input.
    ///
    /// `owner_id` must come from the identity gate. `claimed_owner` is
    /// whatever the client put in the request; when present it must agree
    /// with `owner_id`.
    pub fn new(
        owner_id: OwnerId,
        doc_id: &str,
        blob: Bytes,
        declared_name: Option<&str>,
        declared_content_type: Option<&str>,
        claimed_owner: Option<&str>,
    ) -> Result<Self, CustodyError> {
        if blob.is_empty() {
            return Err(CustodyError::Validation("no file content uploaded".into()));
        }
        let doc_id = DocId::new(doc_id)?;

        if let Some(claimed) = claimed_owner.map(str::trim).filter(|c| !c.is_empty()) {
            if claimed != owner_id.as_str() {
                return Err(CustodyError::Unauthorized(format!(
                    "request names owner {claimed:?} but token belongs to {owner_id}"
                )));
            }
        }

        let name = match declared_name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => checked_text("name", name, MAX_NAME_LEN)?,
            None => doc_id.to_string(),
        };
        let content_type = match declared_content_type.map(str::trim).filter(|c| !c.is_empty()) {
            Some(ct) => checked_text("content type", ct, MAX_CONTENT_TYPE_LEN)?,
            None => DEFAULT_CONTENT_TYPE.to_string(),
        };

        Ok(Self {
            owner_id,
            doc_id,
            blob,
            name,
            content_type,
        })
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    pub fn doc_id(&self) -> &DocId {
        &self.doc_id
    }

    pub fn blob(&self) -> &Bytes {
        &self.blob
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

fn checked_text(field: &str, value: &str, max: usize) -> Result<String, CustodyError> {
    if value.len() > max {
        return Err(CustodyError::Validation(format!(
            "{field} exceeds {max} bytes"
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(CustodyError::Validation(format!(
            "{field} contains control characters"
        )));
    }
    Ok(value.to_string())
}
