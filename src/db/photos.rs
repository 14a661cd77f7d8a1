//! Database queries for inspection photos.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::inspection_photo::{self, ActiveModel, Entity as PhotoEntity};
use crate::error::{AppError, AppResult};
use crate::models::{NewPhotoRecord, Photo};

use super::DbPool;

impl DbPool {
    /// Insert a photo record. `ordem` comes from the record, since files of
    /// one batch are inserted concurrently.
    pub async fn insert_photo(&self, record: &NewPhotoRecord) -> AppResult<Uuid> {
        let step = record.step.as_str();
        let id = Uuid::now_v7();
        let caption = record.caption.trim();
        let model = ActiveModel {
            id: Set(id),
            inspecao_id: Set(Some(record.inspection_id)),
            etapa: Set(step.to_string()),
            nome_arquivo: Set(record.filename.clone()),
            url_foto: Set(record.url.clone()),
            descricao: Set((!caption.is_empty()).then(|| caption.to_string())),
            ordem: Set(Some(record.order)),
            created_at: Set(Utc::now()),
        };

        model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert photo: {}", e)))?;

        Ok(id)
    }

    pub async fn set_photo_caption(&self, photo_id: Uuid, caption: &str) -> AppResult<()> {
        let photo = PhotoEntity::find_by_id(photo_id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get photo: {}", e)))?
            .ok_or_else(|| AppError::NotFound(format!("Photo {}", photo_id)))?;

        let caption = caption.trim();
        let mut active: ActiveModel = photo.into();
        active.descricao = Set((!caption.is_empty()).then(|| caption.to_string()));

        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update photo caption: {}", e)))?;

        Ok(())
    }

    pub async fn delete_photo(&self, photo_id: Uuid) -> AppResult<()> {
        let result = PhotoEntity::delete_by_id(photo_id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete photo: {}", e)))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Photo {}", photo_id)));
        }
        Ok(())
    }

    /// Photos of an inspection in upload order.
    pub async fn list_inspection_photos(&self, inspection_id: Uuid) -> AppResult<Vec<Photo>> {
        let rows = PhotoEntity::find()
            .filter(inspection_photo::Column::InspecaoId.eq(inspection_id))
            .order_by_asc(inspection_photo::Column::CreatedAt)
            .order_by_asc(inspection_photo::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list photos: {}", e)))?;

        Ok(rows.into_iter().map(Photo::from_entity).collect())
    }
}
