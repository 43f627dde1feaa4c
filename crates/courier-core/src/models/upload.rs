use serde::Serialize;

use crate::constants::{STATUS_CLASS_FAILURE, STATUS_CLASS_SUCCESS, UPLOAD_SUCCESS_MESSAGE};
use crate::error::UploadError;

/// Where a submitted file lands in the bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub bucket: String,
    pub prefix: String,
    pub filename: String,
}

impl UploadTarget {
    pub fn new(
        bucket: impl Into<String>,
        prefix: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
            filename: filename.into(),
        }
    }

    /// Object key, `{prefix}/{filename}`. The prefix is used verbatim.
    pub fn key(&self) -> String {
        format!("{}/{}", self.prefix, self.filename)
    }
}

/// Outcome of one submission, rendered as the status line under the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadStatus {
    pub class_name: String,
    pub message: String,
}

impl UploadStatus {
    pub fn success() -> Self {
        Self {
            class_name: STATUS_CLASS_SUCCESS.to_string(),
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
        }
    }

    pub fn failure(err: &UploadError) -> Self {
        Self {
            class_name: STATUS_CLASS_FAILURE.to_string(),
            message: format!("Error!! ({})", err.message()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.class_name == STATUS_CLASS_SUCCESS
    }
}
