//! Inspection (inspecao) entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "inspecoes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub valvula_id: Option<Uuid>,
    pub tecnico_id: Option<Uuid>,
    pub ordem_servico_id: Option<Uuid>,
    /// recebimento, periodica, extraordinaria or visual_externa
    pub tipo_inspecao: String,
    pub instrumentos_utilizados: Option<String>,
    pub observacoes: Option<String>,
    pub pressao_abertura_frio_cdtp: Option<f64>,
    pub fluido_teste: Option<String>,
    pub codigo_lacre: Option<String>,
    pub teste_integridade_juntas: bool,
    pub teste_estanqueidade: bool,
    pub estanqueidade_bpm: Option<f64>,
    pub selo_vr: bool,
    pub data_inicio: Option<DateTimeUtc>,
    pub data_conclusao: Option<DateTimeUtc>,
    pub resultado_aprovado: Option<bool>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::valve::Entity",
        from = "Column::ValvulaId",
        to = "super::valve::Column::Id",
        on_delete = "Cascade"
    )]
    Valve,
    #[sea_orm(has_many = "super::inspection_component::Entity")]
    Components,
    #[sea_orm(has_many = "super::inspection_photo::Entity")]
    Photos,
    #[sea_orm(has_many = "super::required_action::Entity")]
    Actions,
}

impl Related<super::valve::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Valve.def()
    }
}

impl Related<super::inspection_component::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Components.def()
    }
}

impl Related<super::inspection_photo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Photos.def()
    }
}

impl Related<super::required_action::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Actions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
