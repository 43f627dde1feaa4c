use crate::traits::{PutObjectOutput, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use courier_core::models::{TemporaryCredentials, UploadTarget};
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};

/// S3 storage implementation
///
/// The object store client is built per put from the federated credentials, so
/// every write runs with the role granted to the signed-in identity.
#[derive(Clone, Debug)]
pub struct S3Storage {
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `region` - AWS region of the bucket
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn new(region: String, endpoint_url: Option<String>) -> Self {
        S3Storage {
            region,
            endpoint_url,
        }
    }

    fn store_for(
        &self,
        credentials: &TemporaryCredentials,
        bucket: &str,
    ) -> StorageResult<AmazonS3> {
        let mut builder = AmazonS3Builder::new()
            .with_region(self.region.clone())
            .with_bucket_name(bucket)
            .with_access_key_id(credentials.access_key_id.clone())
            .with_secret_access_key(credentials.secret_access_key.clone())
            .with_token(credentials.session_token.clone());

        if let Some(ref endpoint) = self.endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))
    }
}

/// Text of `<tag>...</tag>` in an S3 error document, if present and non-empty.
fn xml_element<'a>(document: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = document.find(&open)? + open.len();
    let len = document[start..].find(&close)?;
    Some(document[start..start + len].trim()).filter(|text| !text.is_empty())
}

/// Message the service put in its error response (`<Message>`, else `<Code>`).
/// Errors that carry no response body keep their own description.
fn service_message(err: &object_store::Error) -> String {
    match err {
        object_store::Error::PermissionDenied { .. }
        | object_store::Error::Unauthenticated { .. }
        | object_store::Error::Generic { .. } => {
            let mut chain = err.to_string();
            let mut source = std::error::Error::source(err);
            while let Some(cause) = source {
                chain.push_str(": ");
                chain.push_str(&cause.to_string());
                source = cause.source();
            }

            xml_element(&chain, "Message")
                .or_else(|| xml_element(&chain, "Code"))
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string())
        }
        _ => err.to_string(),
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn put_object(
        &self,
        credentials: &TemporaryCredentials,
        target: &UploadTarget,
        data: Bytes,
        content_type: Option<&str>,
    ) -> StorageResult<PutObjectOutput> {
        if target.bucket.is_empty() {
            return Err(StorageError::ConfigError(
                "S3 bucket not configured".to_string(),
            ));
        }

        let store = self.store_for(credentials, &target.bucket)?;
        let key = target.key();
        let size = data.len() as u64;
        let location = Path::from(key.as_str());

        let mut attributes = Attributes::new();
        if let Some(content_type) = content_type {
            attributes.insert(Attribute::ContentType, content_type.to_string().into());
        }
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        let start = std::time::Instant::now();

        let result = store
            .put_opts(&location, PutPayload::from(data), options)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %target.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                StorageError::UploadFailed(service_message(&e))
            })?;

        tracing::info!(
            bucket = %target.bucket,
            key = %key,
            size_bytes = size,
            e_tag = result.e_tag.as_deref().unwrap_or(""),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(PutObjectOutput {
            key,
            e_tag: result.e_tag,
            size_bytes: size,
        })
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
