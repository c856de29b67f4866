//! 缴费记录实体
//!
//! member_id 和 collector_id 均可为空：会员或收款员被删除后，
//! 账目记录仍然保留。

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub member_id: Option<i32>,
    pub collector_id: Option<i32>,

    pub amount: f64,
    #[sea_orm(column_type = "Text")]
    pub payment_type: String,
    /// ISO 日期（YYYY-MM-DD）
    #[sea_orm(column_type = "Text")]
    pub payment_date: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub status: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,

    pub created_at: Option<i32>,
    pub updated_at: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::members::Entity",
        from = "Column::MemberId",
        to = "super::members::Column::Id"
    )]
    Members,
    #[sea_orm(
        belongs_to = "super::collectors::Entity",
        from = "Column::CollectorId",
        to = "super::collectors::Column::Id"
    )]
    Collectors,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::collectors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Collectors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
