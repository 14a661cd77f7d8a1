//! Migration: Create inspections and their child tables.
//!
//! Components, photos and required actions are deleted together with
//! their inspection.

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
                CREATE TABLE inspecoes (
                    id UUID PRIMARY KEY, -- UUIDv7 for time-ordered sorting
                    valvula_id UUID REFERENCES valvulas(id) ON DELETE CASCADE,
                    tecnico_id UUID REFERENCES profiles(id) ON DELETE SET NULL,
                    ordem_servico_id UUID REFERENCES ordens_servico(id) ON DELETE SET NULL,
                    tipo_inspecao VARCHAR(30) NOT NULL DEFAULT 'periodica'
                        CHECK (tipo_inspecao IN ('recebimento', 'periodica', 'extraordinaria', 'visual_externa')),
                    instrumentos_utilizados TEXT,
                    observacoes TEXT,

                    -- Bench test data
                    pressao_abertura_frio_cdtp DOUBLE PRECISION
                        CHECK (pressao_abertura_frio_cdtp IS NULL OR pressao_abertura_frio_cdtp >= 0),
                    fluido_teste VARCHAR(20)
                        CHECK (fluido_teste IS NULL OR fluido_teste IN ('liquido', 'gasoso')),
                    codigo_lacre VARCHAR(100),
                    teste_integridade_juntas BOOLEAN NOT NULL DEFAULT FALSE,
                    teste_estanqueidade BOOLEAN NOT NULL DEFAULT FALSE,
                    estanqueidade_bpm DOUBLE PRECISION,
                    selo_vr BOOLEAN NOT NULL DEFAULT FALSE,

                    data_inicio TIMESTAMPTZ,
                    data_conclusao TIMESTAMPTZ,
                    resultado_aprovado BOOLEAN,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_inspecoes_valvula_id ON inspecoes(valvula_id);
                CREATE INDEX idx_inspecoes_data_inicio ON inspecoes(data_inicio DESC);

                CREATE TRIGGER update_inspecoes_updated_at
                    BEFORE UPDATE ON inspecoes
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();

                CREATE TABLE inspecao_componentes (
                    id UUID PRIMARY KEY,
                    inspecao_id UUID REFERENCES inspecoes(id) ON DELETE CASCADE,
                    componente VARCHAR(100) NOT NULL,
                    condicao VARCHAR(20)
                        CHECK (condicao IS NULL OR condicao IN ('bom', 'regular', 'ruim', 'na')),
                    codigo_condicao VARCHAR(100),
                    observacao TEXT,
                    novo_codigo_material VARCHAR(100),
                    nova_corrida VARCHAR(100),
                    age VARCHAR(50),
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_inspecao_componentes_inspecao_id ON inspecao_componentes(inspecao_id);

                CREATE TABLE inspecao_fotos (
                    id UUID PRIMARY KEY,
                    inspecao_id UUID REFERENCES inspecoes(id) ON DELETE CASCADE,
                    etapa VARCHAR(30) NOT NULL,
                    nome_arquivo VARCHAR(255) NOT NULL,
                    url_foto TEXT NOT NULL,
                    descricao TEXT,
                    ordem INTEGER,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_inspecao_fotos_inspecao_id ON inspecao_fotos(inspecao_id);

                CREATE TABLE acoes_requeridas (
                    id UUID PRIMARY KEY,
                    inspecao_id UUID REFERENCES inspecoes(id) ON DELETE CASCADE,
                    acao VARCHAR(100) NOT NULL,
                    executada BOOLEAN NOT NULL DEFAULT FALSE,
                    observacao TEXT,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_acoes_requeridas_inspecao_id ON acoes_requeridas(inspecao_id);
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
                DROP TABLE IF EXISTS acoes_requeridas CASCADE;
                DROP TABLE IF EXISTS inspecao_fotos CASCADE;
                DROP TABLE IF EXISTS inspecao_componentes CASCADE;
                DROP TRIGGER IF EXISTS update_inspecoes_updated_at ON inspecoes;
                DROP TABLE IF EXISTS inspecoes CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
