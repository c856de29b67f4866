//! 数据实体模块
//!
//! 包含所有 SeaORM 实体定义，一个模块对应一张表。

pub mod prelude;

pub mod admin_notes;
pub mod collectors;
pub mod expenses;
pub mod family_members;
pub mod members;
pub mod payments;
pub mod profiles;
pub mod registrations;
pub mod settings;
pub mod support_tickets;
pub mod ticket_responses;
