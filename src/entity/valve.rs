//! Valve (valvula) entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "valvulas")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tag: String,
    pub empresa_id: Option<Uuid>,
    pub planta_id: Option<Uuid>,
    pub fabricante: Option<String>,
    pub modelo: Option<String>,
    pub numero_serie: Option<String>,
    pub localizacao: Option<String>,
    pub tipo_valvula: Option<String>,
    pub diametro: Option<String>,
    pub fluido: Option<String>,
    pub material_corpo: Option<String>,
    pub material_internos: Option<String>,
    pub cdtp: Option<f64>,
    pub pressao_abertura: Option<f64>,
    pub contra_pressao: Option<f64>,
    pub temperatura_operacao: Option<f64>,
    /// ativa, inativa or manutencao
    pub status: String,
    pub periodicidade_meses: i32,
    pub proxima_inspecao: Option<Date>,
    pub observacoes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::EmpresaId",
        to = "super::company::Column::Id",
        on_delete = "SetNull"
    )]
    Company,
    #[sea_orm(has_many = "super::inspection::Entity")]
    Inspections,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::inspection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inspections.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
