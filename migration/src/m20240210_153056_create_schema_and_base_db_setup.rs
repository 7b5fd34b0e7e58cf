use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create the platform's schema
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS consultation_platform;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO consultation_platform, public;")
            .await?;

        // The application connects as `consultation`; give it everything in the schema
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    GRANT ALL PRIVILEGES ON DATABASE consultation TO consultation;
                    GRANT ALL ON SCHEMA consultation_platform TO consultation;

                    ALTER DEFAULT PRIVILEGES IN SCHEMA consultation_platform GRANT ALL ON TABLES TO consultation;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA consultation_platform GRANT ALL ON SEQUENCES TO consultation;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA consultation_platform GRANT ALL ON FUNCTIONS TO consultation;
                END $$;
            "#)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    ALTER DEFAULT PRIVILEGES IN SCHEMA consultation_platform REVOKE ALL ON FUNCTIONS FROM consultation;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA consultation_platform REVOKE ALL ON SEQUENCES FROM consultation;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA consultation_platform REVOKE ALL ON TABLES FROM consultation;
                    REVOKE ALL ON SCHEMA consultation_platform FROM consultation;
                    REVOKE ALL PRIVILEGES ON DATABASE consultation FROM consultation;
                END $$;
            "#)
            .await?;

        // CASCADE removes every table and type in the schema
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS consultation_platform CASCADE;")
            .await?;

        Ok(())
    }
}
