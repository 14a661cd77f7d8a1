//! Migration: Create companies and plants tables.
//!
//! Also installs the shared `updated_at` trigger function.

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
                -- Shared trigger function for updated_at
                CREATE OR REPLACE FUNCTION update_updated_at_column()
                RETURNS TRIGGER AS $$
                BEGIN
                    NEW.updated_at = NOW();
                    RETURN NEW;
                END;
                $$ LANGUAGE plpgsql;

                CREATE TABLE empresas (
                    id UUID PRIMARY KEY,
                    nome VARCHAR(200) NOT NULL,
                    cnpj VARCHAR(20),
                    email VARCHAR(200),
                    telefone VARCHAR(40),
                    endereco TEXT,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE UNIQUE INDEX idx_empresas_cnpj ON empresas(cnpj)
                    WHERE cnpj IS NOT NULL;

                CREATE TRIGGER update_empresas_updated_at
                    BEFORE UPDATE ON empresas
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();

                CREATE TABLE plantas (
                    id UUID PRIMARY KEY,
                    nome VARCHAR(200) NOT NULL,
                    empresa_id UUID REFERENCES empresas(id) ON DELETE SET NULL,
                    endereco TEXT,
                    responsavel_nome VARCHAR(200),
                    responsavel_email VARCHAR(200),
                    responsavel_telefone VARCHAR(40),
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_plantas_empresa_id ON plantas(empresa_id);

                CREATE TRIGGER update_plantas_updated_at
                    BEFORE UPDATE ON plantas
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
                DROP TRIGGER IF EXISTS update_plantas_updated_at ON plantas;
                DROP TABLE IF EXISTS plantas CASCADE;
                DROP TRIGGER IF EXISTS update_empresas_updated_at ON empresas;
                DROP TABLE IF EXISTS empresas CASCADE;
                DROP FUNCTION IF EXISTS update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }
}
