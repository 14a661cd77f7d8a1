//! Migration: Create profiles table.
//!
//! Profiles mirror the identity provider's users and carry the role used
//! for authorization.

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
                CREATE TABLE profiles (
                    id UUID PRIMARY KEY,
                    nome VARCHAR(200) NOT NULL,
                    email VARCHAR(200) NOT NULL,
                    role VARCHAR(20) NOT NULL DEFAULT 'tecnico'
                        CHECK (role IN ('admin', 'tecnico', 'escritorio', 'cliente')),
                    empresa_id UUID REFERENCES empresas(id) ON DELETE SET NULL,
                    telefone VARCHAR(40),
                    ativo BOOLEAN NOT NULL DEFAULT TRUE,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE UNIQUE INDEX idx_profiles_email ON profiles(LOWER(email));

                CREATE TRIGGER update_profiles_updated_at
                    BEFORE UPDATE ON profiles
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
                DROP TRIGGER IF EXISTS update_profiles_updated_at ON profiles;
                DROP TABLE IF EXISTS profiles CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
