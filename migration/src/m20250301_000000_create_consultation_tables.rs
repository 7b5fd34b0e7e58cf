use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            "CREATE TYPE consultation_platform.role AS ENUM (
                'student',
                'teacher',
                'admin'
            )",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TYPE consultation_platform.booking_status AS ENUM (
                'pending',
                'confirmed',
                'cancelled',
                'completed'
            )",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TABLE consultation_platform.users (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                id_number VARCHAR(64) UNIQUE,
                email VARCHAR(255) NOT NULL UNIQUE,
                first_name VARCHAR(255) NOT NULL,
                last_name VARCHAR(255) NOT NULL,
                role consultation_platform.role NOT NULL DEFAULT 'student',
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .await?;

        // `schedule` stays text: rows carry whatever layout the booking client sent
        db.execute_unprepared(
            "CREATE TABLE consultation_platform.bookings (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                status consultation_platform.booking_status NOT NULL DEFAULT 'pending',
                schedule VARCHAR(64),
                venue VARCHAR(255),
                summary TEXT,
                teacher_ref VARCHAR(255) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .await?;

        db.execute_unprepared(
            "CREATE INDEX bookings_status_idx ON consultation_platform.bookings (status)",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TABLE consultation_platform.booking_students (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                booking_id UUID NOT NULL
                    REFERENCES consultation_platform.bookings (id) ON DELETE CASCADE,
                student_ref VARCHAR(255) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                UNIQUE (booking_id, student_ref)
            )",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TABLE consultation_platform.consultation_sessions (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                booking_id UUID NOT NULL
                    REFERENCES consultation_platform.bookings (id) ON DELETE CASCADE,
                transcript TEXT,
                duration VARCHAR(32),
                quality_score DOUBLE PRECISION
                    CHECK (quality_score IS NULL OR (quality_score >= 0 AND quality_score <= 1)),
                quality_metrics JSONB,
                summary TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TABLE consultation_platform.notifications (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                user_id UUID NOT NULL
                    REFERENCES consultation_platform.users (id) ON DELETE CASCADE,
                booking_id UUID
                    REFERENCES consultation_platform.bookings (id) ON DELETE SET NULL,
                action VARCHAR(64) NOT NULL,
                payload JSONB NOT NULL,
                read BOOLEAN NOT NULL DEFAULT false,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .await?;

        db.execute_unprepared(
            "CREATE INDEX notifications_user_id_read_idx
                ON consultation_platform.notifications (user_id, read)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        for table in [
            "notifications",
            "consultation_sessions",
            "booking_students",
            "bookings",
            "users",
        ] {
            db.execute_unprepared(&format!(
                "DROP TABLE IF EXISTS consultation_platform.{table}"
            ))
            .await?;
        }

        db.execute_unprepared("DROP TYPE IF EXISTS consultation_platform.booking_status")
            .await?;
        db.execute_unprepared("DROP TYPE IF EXISTS consultation_platform.role")
            .await?;

        Ok(())
    }
}
