//! 管理员档案实体
//!
//! 桌面端为单操作员应用，档案仅用于备注与工单回复的署名。

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text", nullable)]
    pub display_name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub email: Option<String>,

    pub created_at: Option<i32>,
    pub updated_at: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::admin_notes::Entity")]
    AdminNotes,
    #[sea_orm(has_many = "super::ticket_responses::Entity")]
    TicketResponses,
}

impl Related<super::admin_notes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdminNotes.def()
    }
}

impl Related<super::ticket_responses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TicketResponses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
