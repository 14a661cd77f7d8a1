//! Database queries for companies and plants.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::entity::company::{self, Entity as CompanyEntity};
use crate::entity::plant::{self, Entity as PlantEntity};
use crate::error::{AppError, AppResult};
use crate::models::{Company, CreateCompanyRequest, CreatePlantRequest, Plant};

use super::DbPool;

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    Ok(name.to_string())
}

impl DbPool {
    /// List companies visible to the caller, ordered by name.
    pub async fn list_companies(&self, ctx: &AuthContext) -> AppResult<Vec<Company>> {
        let mut query = CompanyEntity::find();
        match ctx.company_filter() {
            Some(Some(empresa_id)) => query = query.filter(company::Column::Id.eq(empresa_id)),
            Some(None) => return Ok(Vec::new()),
            None => {}
        }

        let rows = query
            .order_by_asc(company::Column::Nome)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list companies: {}", e)))?;

        Ok(rows.into_iter().map(Company::from_entity).collect())
    }

    pub async fn create_company(
        &self,
        ctx: &AuthContext,
        request: CreateCompanyRequest,
    ) -> AppResult<Company> {
        ctx.require_record_manager()?;
        let now = Utc::now();

        let model = company::ActiveModel {
            id: Set(Uuid::now_v7()),
            nome: Set(require_name(&request.name)?),
            cnpj: Set(non_blank(request.cnpj)),
            email: Set(non_blank(request.email)),
            telefone: Set(non_blank(request.phone)),
            endereco: Set(non_blank(request.address)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert company: {}", e)))?;

        Ok(Company::from_entity(result))
    }

    /// List plants, optionally for one company. Scoped callers only see
    /// their own company's plants.
    pub async fn list_plants(
        &self,
        ctx: &AuthContext,
        empresa_id: Option<Uuid>,
    ) -> AppResult<Vec<Plant>> {
        let mut query = PlantEntity::find();
        match ctx.company_filter() {
            Some(Some(own)) => {
                if empresa_id.is_some_and(|requested| requested != own) {
                    return Ok(Vec::new());
                }
                query = query.filter(plant::Column::EmpresaId.eq(own));
            }
            Some(None) => return Ok(Vec::new()),
            None => {
                if let Some(empresa_id) = empresa_id {
                    query = query.filter(plant::Column::EmpresaId.eq(empresa_id));
                }
            }
        }

        let rows = query
            .order_by_asc(plant::Column::Nome)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list plants: {}", e)))?;

        Ok(rows.into_iter().map(Plant::from_entity).collect())
    }

    pub async fn create_plant(
        &self,
        ctx: &AuthContext,
        request: CreatePlantRequest,
    ) -> AppResult<Plant> {
        ctx.require_record_manager()?;

        if let Some(empresa_id) = request.empresa_id {
            let exists = CompanyEntity::find_by_id(empresa_id)
                .one(self.connection())
                .await
                .map_err(|e| AppError::Database(format!("Failed to get company: {}", e)))?
                .is_some();
            if !exists {
                return Err(AppError::NotFound(format!("Company {}", empresa_id)));
            }
        }

        let now = Utc::now();
        let model = plant::ActiveModel {
            id: Set(Uuid::now_v7()),
            nome: Set(require_name(&request.name)?),
            empresa_id: Set(request.empresa_id),
            endereco: Set(non_blank(request.address)),
            responsavel_nome: Set(non_blank(request.contact_name)),
            responsavel_email: Set(non_blank(request.contact_email)),
            responsavel_telefone: Set(non_blank(request.contact_phone)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert plant: {}", e)))?;

        Ok(Plant::from_entity(result))
    }
}
