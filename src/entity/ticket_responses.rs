//! 工单回复实体

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ticket_responses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub ticket_id: i32,
    pub responder_id: Option<i32>,
    #[sea_orm(column_type = "Text")]
    pub response: String,

    pub created_at: Option<i32>,
    pub updated_at: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::support_tickets::Entity",
        from = "Column::TicketId",
        to = "super::support_tickets::Column::Id"
    )]
    SupportTickets,
    #[sea_orm(
        belongs_to = "super::profiles::Entity",
        from = "Column::ResponderId",
        to = "super::profiles::Column::Id"
    )]
    Profiles,
}

impl Related<super::support_tickets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SupportTickets.def()
    }
}

impl Related<super::profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profiles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
