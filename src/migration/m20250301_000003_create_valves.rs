//! Migration: Create valves table.

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
                CREATE TABLE valvulas (
                    id UUID PRIMARY KEY,
                    tag VARCHAR(100) NOT NULL,
                    empresa_id UUID REFERENCES empresas(id) ON DELETE SET NULL,
                    planta_id UUID REFERENCES plantas(id) ON DELETE SET NULL,

                    -- Identification
                    fabricante VARCHAR(100) DEFAULT 'LESER',
                    modelo VARCHAR(100),
                    numero_serie VARCHAR(100),
                    localizacao VARCHAR(200),
                    tipo_valvula VARCHAR(100),
                    diametro VARCHAR(50),
                    fluido VARCHAR(100),
                    material_corpo VARCHAR(100),
                    material_internos VARCHAR(100),

                    -- Pressures in bar-g
                    cdtp DOUBLE PRECISION CHECK (cdtp IS NULL OR cdtp >= 0),
                    pressao_abertura DOUBLE PRECISION,
                    contra_pressao DOUBLE PRECISION,
                    temperatura_operacao DOUBLE PRECISION,

                    status VARCHAR(20) NOT NULL DEFAULT 'ativa'
                        CHECK (status IN ('ativa', 'inativa', 'manutencao')),
                    periodicidade_meses INTEGER NOT NULL DEFAULT 12
                        CHECK (periodicidade_meses > 0),
                    proxima_inspecao DATE,
                    observacoes TEXT,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_valvulas_tag ON valvulas(tag);
                CREATE INDEX idx_valvulas_empresa_id ON valvulas(empresa_id);
                CREATE INDEX idx_valvulas_proxima_inspecao ON valvulas(proxima_inspecao)
                    WHERE proxima_inspecao IS NOT NULL;

                CREATE TRIGGER update_valvulas_updated_at
                    BEFORE UPDATE ON valvulas
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
                DROP TRIGGER IF EXISTS update_valvulas_updated_at ON valvulas;
                DROP TABLE IF EXISTS valvulas CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
