//! S3 storage service for inspection photos and test videos.
//!
//! Supports both AWS S3 and MinIO for development.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::config::StorageSettings;
use crate::error::{AppError, AppResult};
use crate::services::wizard::FileStore;

/// S3 storage client wrapper.
#[derive(Clone)]
pub struct Storage {
    client: Client,
    bucket: String,
    /// Base of public object URLs, without trailing slash
    public_base: String,
}

impl Storage {
    /// Create a new S3 storage client from configuration.
    pub async fn new(config: &StorageSettings) -> AppResult<Self> {
        let credentials =
            Credentials::new(&config.access_key, &config.secret_key, None, None, "psv");

        let region = Region::new(config.region.clone());

        let mut s3_config_builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(region)
            .credentials_provider(credentials)
            .force_path_style(true); // Required for MinIO

        // Use custom endpoint for MinIO in development
        if let Some(ref endpoint) = config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        let s3_config = s3_config_builder.build();
        let client = Client::from_conf(s3_config);

        let storage = Self {
            client,
            bucket: config.bucket.clone(),
            public_base: Self::public_base(config),
        };

        // Verify bucket exists or create it
        storage.ensure_bucket_exists().await?;

        info!("S3 storage initialized: bucket={}", config.bucket);

        Ok(storage)
    }

    /// Base URL for public links: `S3_PUBLIC_URL`, else the endpoint, else AWS.
    fn public_base(config: &StorageSettings) -> String {
        match config.public_url.as_deref().or(config.endpoint.as_deref()) {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), config.bucket),
            None => format!(
                "https://{}.s3.{}.amazonaws.com",
                config.bucket, config.region
            ),
        }
    }

    /// Ensure the bucket exists, creating it if necessary.
    async fn ensure_bucket_exists(&self) -> AppResult<()> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                info!("S3 bucket '{}' exists", self.bucket);
                Ok(())
            }
            Err(e) => {
                // Check if it's a "not found" error
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    info!("Creating S3 bucket '{}'", self.bucket);
                    self.client
                        .create_bucket()
                        .bucket(&self.bucket)
                        .send()
                        .await
                        .map_err(|e| {
                            AppError::Storage(format!("Failed to create bucket: {}", e))
                        })?;
                    info!("S3 bucket '{}' created", self.bucket);
                    Ok(())
                } else {
                    Err(AppError::Storage(format!(
                        "Failed to access bucket '{}': {}",
                        self.bucket, service_error
                    )))
                }
            }
        }
    }

    /// Get the content type for a file based on its extension.
    pub fn content_type_for_extension(ext: &str) -> &'static str {
        match ext.to_lowercase().as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "bmp" => "image/bmp",
            "heic" => "image/heic",
            "heif" => "image/heif",
            "mp4" | "m4v" => "video/mp4",
            "mov" => "video/quicktime",
            "webm" => "video/webm",
            "avi" => "video/x-msvideo",
            "mkv" => "video/x-matroska",
            "3gp" => "video/3gpp",
            _ => "application/octet-stream",
        }
    }

    /// Upload a file to S3.
    pub async fn put(&self, key: &str, data: Vec<u8>, content_type: Option<&str>) -> AppResult<()> {
        let body = aws_sdk_s3::primitives::ByteStream::from(data);
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body);

        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        request
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload file to S3: {}", e)))?;

        Ok(())
    }

    /// Delete an object. Deleting a missing key succeeds.
    pub async fn delete(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete file from S3: {}", e)))?;

        Ok(())
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }

    /// Build the key of an inspection photo.
    ///
    /// # Returns
    /// S3 key in format: {inspection_id}/{step}/{unix_millis}-{random}.{ext}
    pub fn photo_key(
        inspection_id: Uuid,
        step: &str,
        unix_millis: i64,
        random: &str,
        ext: &str,
    ) -> String {
        format!("{}/{}/{}-{}.{}", inspection_id, step, unix_millis, random, ext)
    }

    /// Build the key of a test confirmation video.
    ///
    /// # Returns
    /// S3 key in format: {inspection_id}/videos/{component}/{unix_millis}.{ext}
    pub fn video_key(inspection_id: Uuid, component: &str, unix_millis: i64, ext: &str) -> String {
        format!("{}/videos/{}/{}.{}", inspection_id, component, unix_millis, ext)
    }
}

#[async_trait]
impl FileStore for Storage {
    async fn upload_file(
        &self,
        ctx: &AuthContext,
        path_hint: &str,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> AppResult<String> {
        debug!(key = %path_hint, bytes = data.len(), profile = %ctx.profile_id, "Uploading object");
        self.put(path_hint, data, content_type).await?;
        Ok(self.public_url(path_hint))
    }

    async fn delete_file(&self, ctx: &AuthContext, path_hint: &str) -> AppResult<()> {
        debug!(key = %path_hint, profile = %ctx.profile_id, "Deleting object");
        self.delete(path_hint).await
    }
}
