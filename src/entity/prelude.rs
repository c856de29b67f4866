//! 预导入模块
//!
//! 提供常用实体类型的快捷导入。

pub use super::admin_notes::Entity as AdminNotes;
pub use super::collectors::Entity as Collectors;
pub use super::expenses::Entity as Expenses;
pub use super::family_members::Entity as FamilyMembers;
pub use super::members::Entity as Members;
pub use super::payments::Entity as Payments;
pub use super::profiles::Entity as Profiles;
pub use super::registrations::Entity as Registrations;
pub use super::settings::Entity as Settings;
pub use super::support_tickets::Entity as SupportTickets;
pub use super::ticket_responses::Entity as TicketResponses;
