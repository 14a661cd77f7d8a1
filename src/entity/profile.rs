//! Profile entity for SeaORM.
//!
//! Rows are created by the identity provider; the server reads them for
//! inspector names in reports.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub nome: String,
    pub email: String,
    /// admin, tecnico, escritorio or cliente
    pub role: String,
    pub empresa_id: Option<Uuid>,
    pub telefone: Option<String>,
    pub ativo: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
