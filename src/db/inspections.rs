//! Database queries for inspections and the wizard's persistence port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::debug;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::entity::inspection::{ActiveModel, Entity as InspectionEntity};
use crate::entity::inspection_component::{self, Entity as ComponentEntity};
use crate::entity::required_action::{self, Entity as ActionEntity};
use crate::entity::valve::Entity as ValveEntity;
use crate::error::{AppError, AppResult};
use crate::models::{
    ComponentRecord, Inspection, InspectionComponent, NewInspection, NewPhotoRecord,
    RequiredAction, RequiredActionRow, Valve, ValveRef,
};
use crate::services::wizard::InspectionStore;

use super::DbPool;

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl DbPool {
    /// Get an inspection together with its valve, if the caller may see the valve.
    pub async fn get_inspection(
        &self,
        ctx: &AuthContext,
        id: Uuid,
    ) -> AppResult<Option<(Inspection, Valve)>> {
        let row = InspectionEntity::find_by_id(id)
            .find_also_related(ValveEntity)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get inspection: {}", e)))?;

        Ok(match row {
            Some((inspection, Some(valve))) if ctx.can_see_company(valve.empresa_id) => {
                Some((Inspection::from_entity(inspection), Valve::from_entity(valve)))
            }
            _ => None,
        })
    }

    pub async fn list_inspection_components(
        &self,
        inspection_id: Uuid,
    ) -> AppResult<Vec<InspectionComponent>> {
        let rows = ComponentEntity::find()
            .filter(inspection_component::Column::InspecaoId.eq(inspection_id))
            .order_by_asc(inspection_component::Column::CreatedAt)
            .order_by_asc(inspection_component::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list components: {}", e)))?;

        Ok(rows.into_iter().map(InspectionComponent::from_entity).collect())
    }

    pub async fn list_inspection_actions(
        &self,
        inspection_id: Uuid,
    ) -> AppResult<Vec<RequiredActionRow>> {
        let rows = ActionEntity::find()
            .filter(required_action::Column::InspecaoId.eq(inspection_id))
            .order_by_asc(required_action::Column::CreatedAt)
            .order_by_asc(required_action::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list required actions: {}", e)))?;

        Ok(rows.into_iter().map(RequiredActionRow::from_entity).collect())
    }
}

#[async_trait]
impl InspectionStore for DbPool {
    async fn find_valve(&self, ctx: &AuthContext, valve_id: Uuid) -> AppResult<Option<ValveRef>> {
        Ok(self.get_valve(ctx, valve_id).await?.map(|v| v.to_ref()))
    }

    async fn create_inspection(&self, ctx: &AuthContext, new: &NewInspection) -> AppResult<Uuid> {
        ctx.require_inspector()?;
        let fields = &new.fields;
        let now = Utc::now();
        let id = Uuid::now_v7();

        let model = ActiveModel {
            id: Set(id),
            valvula_id: Set(Some(new.valve_id)),
            tecnico_id: Set(Some(new.inspector_id)),
            ordem_servico_id: Set(None),
            tipo_inspecao: Set(fields.kind.as_str().to_string()),
            instrumentos_utilizados: Set(non_blank(&fields.instruments_used)),
            observacoes: Set(non_blank(&fields.observations)),
            pressao_abertura_frio_cdtp: Set(fields.cdtp),
            fluido_teste: Set(Some(fields.test_fluid.as_str().to_string())),
            codigo_lacre: Set(non_blank(&fields.seal_code)),
            teste_integridade_juntas: Set(fields.joint_integrity_test),
            teste_estanqueidade: Set(fields.leak_test),
            estanqueidade_bpm: Set(fields
                .leak_test
                .then_some(fields.leak_bubbles_per_minute)
                .flatten()),
            selo_vr: Set(fields.vr_seal),
            data_inicio: Set(Some(new.started_at)),
            data_conclusao: Set(None),
            resultado_aprovado: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert inspection: {}", e)))?;

        debug!(inspection_id = %id, valve_id = %new.valve_id, "Inspection created");
        Ok(id)
    }

    async fn bulk_insert_components(
        &self,
        ctx: &AuthContext,
        inspection_id: Uuid,
        components: &[ComponentRecord],
    ) -> AppResult<()> {
        ctx.require_inspector()?;
        if components.is_empty() {
            return Ok(());
        }
        let now = Utc::now();

        let models = components.iter().map(|c| inspection_component::ActiveModel {
            id: Set(Uuid::now_v7()),
            inspecao_id: Set(Some(inspection_id)),
            componente: Set(c.component.label().to_string()),
            condicao: Set(c.condition.map(|cond| cond.as_str().to_string())),
            codigo_condicao: Set(non_blank(&c.condition_code)),
            observacao: Set(non_blank(&c.note)),
            novo_codigo_material: Set(c.replacement_material_code.as_deref().and_then(non_blank)),
            nova_corrida: Set(c.replacement_heat_number.as_deref().and_then(non_blank)),
            age: Set(c.age.as_deref().and_then(non_blank)),
            created_at: Set(now),
        });

        ComponentEntity::insert_many(models)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert components: {}", e)))?;

        Ok(())
    }

    async fn bulk_insert_actions(
        &self,
        ctx: &AuthContext,
        inspection_id: Uuid,
        actions: &[RequiredAction],
    ) -> AppResult<()> {
        ctx.require_inspector()?;
        if actions.is_empty() {
            return Ok(());
        }
        let now = Utc::now();

        let models = actions.iter().map(|a| required_action::ActiveModel {
            id: Set(Uuid::now_v7()),
            inspecao_id: Set(Some(inspection_id)),
            acao: Set(a.label().to_string()),
            executada: Set(false),
            observacao: Set(None),
            created_at: Set(now),
        });

        ActionEntity::insert_many(models)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert required actions: {}", e)))?;

        Ok(())
    }

    async fn update_inspection_completion(
        &self,
        ctx: &AuthContext,
        inspection_id: Uuid,
        completed_at: DateTime<Utc>,
        approved: bool,
    ) -> AppResult<()> {
        ctx.require_inspector()?;
        let existing = InspectionEntity::find_by_id(inspection_id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get inspection: {}", e)))?
            .ok_or_else(|| AppError::NotFound(format!("Inspection {}", inspection_id)))?;

        let mut active: ActiveModel = existing.into();
        active.data_conclusao = Set(Some(completed_at));
        active.resultado_aprovado = Set(Some(approved));
        active.updated_at = Set(Utc::now());

        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to complete inspection: {}", e)))?;

        Ok(())
    }

    async fn delete_inspection(&self, ctx: &AuthContext, inspection_id: Uuid) -> AppResult<()> {
        ctx.require_inspector()?;
        let result = InspectionEntity::delete_by_id(inspection_id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete inspection: {}", e)))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Inspection {}", inspection_id)));
        }
        Ok(())
    }

    async fn insert_photo_record(
        &self,
        ctx: &AuthContext,
        record: &NewPhotoRecord,
    ) -> AppResult<Uuid> {
        ctx.require_inspector()?;
        self.insert_photo(record).await
    }

    async fn update_photo_caption(
        &self,
        ctx: &AuthContext,
        photo_id: Uuid,
        caption: &str,
    ) -> AppResult<()> {
        ctx.require_inspector()?;
        self.set_photo_caption(photo_id, caption).await
    }

    async fn delete_photo_record(&self, ctx: &AuthContext, photo_id: Uuid) -> AppResult<()> {
        ctx.require_inspector()?;
        self.delete_photo(photo_id).await
    }
}
