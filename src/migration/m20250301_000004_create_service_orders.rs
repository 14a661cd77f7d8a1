//! Migration: Create service orders table.
//!
//! Service orders are issued by the office; inspections may reference one.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE ordens_servico (
                    id UUID PRIMARY KEY,
                    numero_os VARCHAR(50) NOT NULL,
                    tipo_servico VARCHAR(100) NOT NULL,
                    valvula_id UUID REFERENCES valvulas(id) ON DELETE CASCADE,
                    tecnico_id UUID REFERENCES profiles(id) ON DELETE SET NULL,
                    status VARCHAR(30) NOT NULL DEFAULT 'pendente'
                        CHECK (status IN ('pendente', 'em_andamento', 'aguardando_aprovacao', 'aprovado', 'rejeitado')),
                    data_inicio TIMESTAMPTZ,
                    data_conclusao TIMESTAMPTZ,
                    observacoes_tecnico TEXT,
                    observacoes_escritorio TEXT,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE UNIQUE INDEX idx_ordens_servico_numero ON ordens_servico(numero_os);
                CREATE INDEX idx_ordens_servico_valvula_id ON ordens_servico(valvula_id);

                CREATE TRIGGER update_ordens_servico_updated_at
                    BEFORE UPDATE ON ordens_servico
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DROP TRIGGER IF EXISTS update_ordens_servico_updated_at ON ordens_servico;
                DROP TABLE IF EXISTS ordens_servico CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
