//! Per-file upload pipeline for photos and test videos.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::WizardError;
use super::cancel::CancelSignal;
use super::store::{FileStore, InspectionStore};
use super::test_flow::TestVideo;
use crate::auth::AuthContext;
use crate::error::AppResult;
use crate::models::{NewPhotoRecord, Photo, PhotoStep, TestComponent};
use crate::services::storage::Storage;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "heic", "heif", "bmp"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm", "avi", "mkv", "m4v", "3gp"];

/// A file received from the client, fully buffered.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl IncomingFile {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            data,
        }
    }
}

/// Media accepted by an upload target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    ImageOrVideo,
}

impl MediaKind {
    fn accepts(&self, ext: &str) -> bool {
        match self {
            Self::Image => IMAGE_EXTENSIONS.contains(&ext),
            Self::ImageOrVideo => IMAGE_EXTENSIONS.contains(&ext) || VIDEO_EXTENSIONS.contains(&ext),
        }
    }
}

/// Lowercased extension, if the name has one.
fn extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Validate name and size; returns the extension.
pub(super) fn check_file(
    file: &IncomingFile,
    kind: MediaKind,
    max_size: usize,
) -> Result<String, WizardError> {
    let reject = |reason: String| WizardError::Upload {
        filename: file.filename.clone(),
        reason,
    };

    if file.data.is_empty() {
        return Err(reject("file is empty".to_string()));
    }
    if file.data.len() > max_size {
        return Err(reject(format!(
            "file is {} bytes, limit is {} bytes",
            file.data.len(),
            max_size
        )));
    }

    let ext = extension(&file.filename).ok_or_else(|| reject("file has no extension".to_string()))?;
    if !kind.accepts(&ext) {
        return Err(reject(format!("extension '{}' is not allowed", ext)));
    }

    Ok(ext)
}

/// Shared handles for one upload batch.
#[derive(Clone)]
pub(super) struct Uploader {
    pub ctx: AuthContext,
    pub store: Arc<dyn InspectionStore>,
    pub files: Arc<dyn FileStore>,
    pub cancel: CancelSignal,
    pub max_size: usize,
}

impl Uploader {
    async fn cancellable<T>(
        &self,
        fut: impl Future<Output = AppResult<T>>,
    ) -> Result<AppResult<T>, WizardError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(WizardError::Cancelled),
            result = fut => Ok(result),
        }
    }

    /// Store an object unless the session is cancelled first. A cancelled
    /// upload may still have reached storage, so its key is discarded.
    async fn store_object(
        &self,
        inspection_id: Uuid,
        key: &str,
        filename: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, WizardError> {
        let upload = self
            .files
            .upload_file(&self.ctx, key, data, Some(content_type));

        match self.cancellable(upload).await {
            Err(cancelled) => {
                self.discard(key).await;
                Err(cancelled)
            }
            Ok(Err(e)) => {
                error!(
                    inspection_id = %inspection_id,
                    key = %key,
                    error = %e,
                    "Failed to store uploaded file"
                );
                Err(WizardError::Upload {
                    filename: filename.to_string(),
                    reason: "the file could not be stored".to_string(),
                })
            }
            Ok(Ok(_)) if self.cancel.is_cancelled() => {
                self.discard(key).await;
                Err(WizardError::Cancelled)
            }
            Ok(Ok(url)) => Ok(url),
        }
    }

    /// Remove an object nobody will reference. Failures are only logged.
    async fn discard(&self, key: &str) {
        if let Err(e) = self.files.delete_file(&self.ctx, key).await {
            warn!(key = %key, error = %e, "Failed to delete orphaned object");
        }
    }

    /// Store the object and then its photo record.
    ///
    /// If the record cannot be written the object is deleted again, so a
    /// failed file leaves nothing behind.
    pub async fn upload_photo(
        &self,
        inspection_id: Uuid,
        step: PhotoStep,
        order: i32,
        file: IncomingFile,
    ) -> Result<Photo, WizardError> {
        let ext = check_file(&file, MediaKind::Image, self.max_size)?;
        let key = Storage::photo_key(
            inspection_id,
            step.as_str(),
            Utc::now().timestamp_millis(),
            &random_suffix(),
            &ext,
        );
        let content_type = file
            .content_type
            .clone()
            .unwrap_or_else(|| Storage::content_type_for_extension(&ext).to_string());

        let url = self
            .store_object(inspection_id, &key, &file.filename, file.data, &content_type)
            .await?;

        let record = NewPhotoRecord {
            inspection_id,
            step,
            order,
            filename: file.filename.clone(),
            url: url.clone(),
            caption: String::new(),
        };

        match self.store.insert_photo_record(&self.ctx, &record).await {
            Ok(id) => {
                info!(
                    inspection_id = %inspection_id,
                    step = %step.as_str(),
                    photo_id = %id,
                    "Photo stored"
                );
                Ok(Photo {
                    id,
                    inspection_id: Some(inspection_id),
                    step: step.as_str().to_string(),
                    filename: file.filename,
                    url,
                    caption: None,
                    order: Some(order),
                    storage_key: Some(key),
                    created_at: Some(Utc::now()),
                })
            }
            Err(e) => {
                error!(
                    inspection_id = %inspection_id,
                    step = %step.as_str(),
                    error = %e,
                    "Failed to save photo record"
                );
                self.discard(&key).await;
                Err(WizardError::Upload {
                    filename: file.filename,
                    reason: "the photo record could not be saved".to_string(),
                })
            }
        }
    }

    pub async fn upload_video(
        &self,
        inspection_id: Uuid,
        component: TestComponent,
        file: IncomingFile,
    ) -> Result<TestVideo, WizardError> {
        let ext = check_file(&file, MediaKind::ImageOrVideo, self.max_size)?;
        let key = Storage::video_key(
            inspection_id,
            component.as_str(),
            Utc::now().timestamp_millis(),
            &ext,
        );
        let content_type = file
            .content_type
            .clone()
            .unwrap_or_else(|| Storage::content_type_for_extension(&ext).to_string());

        let url = self
            .store_object(inspection_id, &key, &file.filename, file.data, &content_type)
            .await?;

        Ok(TestVideo {
            component,
            filename: file.filename,
            storage_key: key,
            url,
        })
    }
}

fn random_suffix() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}
