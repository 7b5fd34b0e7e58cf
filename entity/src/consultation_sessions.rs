//! SeaORM Entity for consultation_sessions table.
//! The realized record of a held consultation: transcript, duration and quality score.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "consultation_platform", table_name = "consultation_sessions")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    pub booking_id: Id,

    /// Full transcript text
    #[sea_orm(column_type = "Text")]
    pub transcript: Option<String>,

    /// Recording length as captured, either seconds or `H:MM:SS` / `MM:SS`
    pub duration: Option<String>,

    /// Sentiment-derived quality score in [0, 1]
    pub quality_score: Option<f64>,

    /// Scoring breakdown, stored as an opaque JSON document
    pub quality_metrics: Option<Json>,

    /// AI-generated summary of the consultation
    #[sea_orm(column_type = "Text")]
    pub summary: Option<String>,

    #[serde(skip_deserializing)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bookings::Entity",
        from = "Column::BookingId",
        to = "super::bookings::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Bookings,
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
