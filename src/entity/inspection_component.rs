//! Component inspection record entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "inspecao_componentes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub inspecao_id: Option<Uuid>,
    pub componente: String,
    /// bom, regular, ruim or na
    pub condicao: Option<String>,
    pub codigo_condicao: Option<String>,
    pub observacao: Option<String>,
    pub novo_codigo_material: Option<String>,
    pub nova_corrida: Option<String>,
    pub age: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::inspection::Entity",
        from = "Column::InspecaoId",
        to = "super::inspection::Column::Id",
        on_delete = "Cascade"
    )]
    Inspection,
}

impl Related<super::inspection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inspection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
