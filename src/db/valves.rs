//! Database queries for valves.

use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::entity::inspection::{self, Entity as InspectionEntity};
use crate::entity::valve::{self, ActiveModel, Entity as ValveEntity};
use crate::error::{AppError, AppResult};
use crate::models::{
    DEFAULT_MANUFACTURER, DEFAULT_PERIODICITY_MONTHS, Inspection, Valve, ValveRequest,
};

use super::DbPool;

impl DbPool {
    /// List valves visible to the caller, ordered by TAG.
    pub async fn list_valves(&self, ctx: &AuthContext, search: Option<&str>) -> AppResult<Vec<Valve>> {
        let mut query = ValveEntity::find();

        match ctx.company_filter() {
            Some(Some(empresa_id)) => query = query.filter(valve::Column::EmpresaId.eq(empresa_id)),
            Some(None) => return Ok(Vec::new()),
            None => {}
        }

        if let Some(term) = search.map(str::trim).filter(|s| !s.is_empty()) {
            // ILIKE for case-insensitive substring match (PostgreSQL)
            let pattern = format!("%{}%", term);
            query = query.filter(
                Condition::any()
                    .add(Expr::col((valve::Entity, valve::Column::Tag)).ilike(&pattern))
                    .add(Expr::col((valve::Entity, valve::Column::Fabricante)).ilike(&pattern))
                    .add(Expr::col((valve::Entity, valve::Column::Modelo)).ilike(&pattern))
                    .add(Expr::col((valve::Entity, valve::Column::NumeroSerie)).ilike(&pattern)),
            );
        }

        let rows = query
            .order_by_asc(valve::Column::Tag)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list valves: {}", e)))?;

        Ok(rows.into_iter().map(Valve::from_entity).collect())
    }

    /// Get a valve by ID. Rows outside the caller's company read as missing.
    pub async fn get_valve(&self, ctx: &AuthContext, id: Uuid) -> AppResult<Option<Valve>> {
        let row = ValveEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get valve: {}", e)))?;

        Ok(row
            .filter(|v| ctx.can_see_company(v.empresa_id))
            .map(Valve::from_entity))
    }

    async fn require_valve(&self, ctx: &AuthContext, id: Uuid) -> AppResult<valve::Model> {
        ValveEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get valve: {}", e)))?
            .filter(|v| ctx.can_see_company(v.empresa_id))
            .ok_or_else(|| AppError::NotFound(format!("Valve {}", id)))
    }

    /// Create a valve. TAG is required; manufacturer, status and periodicity
    /// fall back to their defaults.
    pub async fn create_valve(&self, ctx: &AuthContext, request: ValveRequest) -> AppResult<Valve> {
        ctx.require_record_manager()?;
        let request = request.normalized();
        let tag = request
            .require_tag()
            .map_err(AppError::Validation)?
            .to_string();
        let now = Utc::now();

        let model = ActiveModel {
            id: Set(Uuid::now_v7()),
            tag: Set(tag),
            empresa_id: Set(request.empresa_id),
            planta_id: Set(request.planta_id),
            fabricante: Set(Some(
                request
                    .manufacturer
                    .unwrap_or_else(|| DEFAULT_MANUFACTURER.to_string()),
            )),
            modelo: Set(request.model),
            numero_serie: Set(request.serial_number),
            localizacao: Set(request.location),
            tipo_valvula: Set(request.valve_type),
            diametro: Set(request.diameter),
            fluido: Set(request.fluid),
            material_corpo: Set(request.body_material),
            material_internos: Set(request.internals_material),
            cdtp: Set(request.cdtp),
            pressao_abertura: Set(request.set_pressure),
            contra_pressao: Set(request.back_pressure),
            temperatura_operacao: Set(request.operating_temperature),
            status: Set(request.status.unwrap_or_default().as_str().to_string()),
            periodicidade_meses: Set(request
                .periodicity_months
                .unwrap_or(DEFAULT_PERIODICITY_MONTHS)),
            proxima_inspecao: Set(request.next_inspection),
            observacoes: Set(request.notes),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert valve: {}", e)))?;

        Ok(Valve::from_entity(result))
    }

    /// Update a valve. Absent fields keep their stored values.
    pub async fn update_valve(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        request: ValveRequest,
    ) -> AppResult<Valve> {
        ctx.require_record_manager()?;
        let request = request.normalized();
        let existing = self.require_valve(ctx, id).await?;

        let mut active: ActiveModel = existing.into();
        if let Some(tag) = request.tag {
            active.tag = Set(tag);
        }
        if request.empresa_id.is_some() {
            active.empresa_id = Set(request.empresa_id);
        }
        if request.planta_id.is_some() {
            active.planta_id = Set(request.planta_id);
        }
        if request.manufacturer.is_some() {
            active.fabricante = Set(request.manufacturer);
        }
        if request.model.is_some() {
            active.modelo = Set(request.model);
        }
        if request.serial_number.is_some() {
            active.numero_serie = Set(request.serial_number);
        }
        if request.location.is_some() {
            active.localizacao = Set(request.location);
        }
        if request.valve_type.is_some() {
            active.tipo_valvula = Set(request.valve_type);
        }
        if request.diameter.is_some() {
            active.diametro = Set(request.diameter);
        }
        if request.fluid.is_some() {
            active.fluido = Set(request.fluid);
        }
        if request.body_material.is_some() {
            active.material_corpo = Set(request.body_material);
        }
        if request.internals_material.is_some() {
            active.material_internos = Set(request.internals_material);
        }
        if request.cdtp.is_some() {
            active.cdtp = Set(request.cdtp);
        }
        if request.set_pressure.is_some() {
            active.pressao_abertura = Set(request.set_pressure);
        }
        if request.back_pressure.is_some() {
            active.contra_pressao = Set(request.back_pressure);
        }
        if request.operating_temperature.is_some() {
            active.temperatura_operacao = Set(request.operating_temperature);
        }
        if let Some(status) = request.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(months) = request.periodicity_months {
            active.periodicidade_meses = Set(months);
        }
        if request.next_inspection.is_some() {
            active.proxima_inspecao = Set(request.next_inspection);
        }
        if request.notes.is_some() {
            active.observacoes = Set(request.notes);
        }
        active.updated_at = Set(Utc::now());

        let result = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update valve: {}", e)))?;

        Ok(Valve::from_entity(result))
    }

    /// Delete a valve. Its inspections cascade.
    pub async fn delete_valve(&self, ctx: &AuthContext, id: Uuid) -> AppResult<()> {
        ctx.require_record_manager()?;
        self.require_valve(ctx, id).await?;

        ValveEntity::delete_by_id(id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete valve: {}", e)))?;

        Ok(())
    }

    /// Inspection history of a valve, newest first.
    pub async fn list_valve_inspections(
        &self,
        ctx: &AuthContext,
        valve_id: Uuid,
    ) -> AppResult<Vec<Inspection>> {
        self.require_valve(ctx, valve_id).await?;

        let rows = InspectionEntity::find()
            .filter(inspection::Column::ValvulaId.eq(valve_id))
            .order_by_desc(inspection::Column::DataInicio)
            .order_by_desc(inspection::Column::Id) // UUIDv7 is time-ordered
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list inspections: {}", e)))?;

        Ok(rows.into_iter().map(Inspection::from_entity).collect())
    }
}

