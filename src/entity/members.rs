//! 会员实体
//!
//! members 表是核心表，collector_id 指向负责该会员的收款员，
//! 删除收款员时由外键置空（会员变为未分配）。

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    // === 基础信息 ===
    #[sea_orm(column_type = "Text")]
    pub full_name: String,
    #[sea_orm(column_type = "Text")]
    pub member_number: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub email: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub phone: Option<String>,

    // === 地址 ===
    #[sea_orm(column_type = "Text", nullable)]
    pub address: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub town: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub postcode: Option<String>,

    // === 个人资料 ===
    #[sea_orm(column_type = "Text", nullable)]
    pub date_of_birth: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub gender: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub marital_status: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub membership_type: Option<String>,

    // === 状态 ===
    #[sea_orm(column_type = "Text", nullable)]
    pub status: Option<String>,
    /// 1 = 资料已核实
    pub verified: Option<i32>,
    pub collector_id: Option<i32>,

    // === 时间戳 ===
    pub created_at: Option<i32>,
    pub updated_at: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::collectors::Entity",
        from = "Column::CollectorId",
        to = "super::collectors::Column::Id"
    )]
    Collectors,
    #[sea_orm(has_many = "super::family_members::Entity")]
    FamilyMembers,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
    #[sea_orm(has_many = "super::admin_notes::Entity")]
    AdminNotes,
    #[sea_orm(has_many = "super::registrations::Entity")]
    Registrations,
    #[sea_orm(has_many = "super::support_tickets::Entity")]
    SupportTickets,
}

impl Related<super::collectors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Collectors.def()
    }
}

impl Related<super::family_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FamilyMembers.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::admin_notes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdminNotes.def()
    }
}

impl Related<super::registrations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Registrations.def()
    }
}

impl Related<super::support_tickets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SupportTickets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
