//! SeaORM Entity for bookings table.
//! A requested or scheduled consultation between one teacher and one or more students.

use crate::booking_status::BookingStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "consultation_platform", table_name = "bookings")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    pub status: BookingStatus,

    /// Scheduled start as entered by the client. Historical rows hold several
    /// formats (RFC 3339, `Z`-suffixed ISO, minute precision without offset, ...).
    pub schedule: Option<String>,

    pub venue: Option<String>,

    /// Short description of what the consultation is about
    #[sea_orm(column_type = "Text")]
    pub summary: Option<String>,

    /// Teacher reference: a user id, an id number, or a `users/<id>` path
    pub teacher_ref: String,

    #[serde(skip_deserializing)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::booking_students::Entity")]
    BookingStudents,

    #[sea_orm(has_many = "super::consultation_sessions::Entity")]
    ConsultationSessions,
}

impl Related<super::booking_students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookingStudents.def()
    }
}

impl Related<super::consultation_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ConsultationSessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
